// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use metapack_core::metafile::{Command, PackStats};
use metapack_data::ByteStream;

/// Encodes commands into the session's byte stream and keeps the counters.
#[derive(Debug)]
pub(crate) struct Emitter {
    stream: ByteStream,
    word_size: usize,
    pub(crate) stats: PackStats,
}

impl Emitter {
    pub(crate) fn new(word_size: u32) -> Self {
        Self {
            stream: ByteStream::new(),
            word_size: word_size.max(1) as usize,
            stats: PackStats::default(),
        }
    }

    pub(crate) fn emit(&mut self, command: Command) {
        log::trace!("emit {command:?}");
        match &command {
            c if c.is_state_change() => self.stats.state_changes_emitted += 1,
            c if c.is_draw() => self.stats.draw_calls += 1,
            Command::EnableArrays(_) => self.stats.array_binds += 1,
            _ => {}
        }
        let written = self.stream.write_command(&command, self.word_size);
        self.stats.bytes_written += written as u64;
    }

    pub(crate) fn len(&self) -> usize {
        self.stream.len()
    }

    /// Takes the recorded bytes and counters, leaving the emitter ready for a new session.
    pub(crate) fn finish(&mut self) -> (Vec<u8>, PackStats) {
        (self.stream.take_bytes(), std::mem::take(&mut self.stats))
    }

    pub(crate) fn reset(&mut self) {
        self.stream.take_bytes();
        self.stats = PackStats::default();
    }
}
