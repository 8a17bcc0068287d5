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

//! `env_logger` bootstrap shared by binaries and tools.

use env_logger::{Builder, Env};

/// Default filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info";

/// Installs the global logger, honoring `RUST_LOG` and falling back to `info`.
///
/// Fails if a global logger is already installed.
pub fn init() -> anyhow::Result<()> {
    builder().try_init()?;
    log::debug!("Logger initialized (default filter '{DEFAULT_FILTER}').");
    Ok(())
}

/// Like [`init`], but silently keeps an already installed logger.
///
/// Returns `true` if this call installed the logger. Handy in tests.
pub fn try_init() -> bool {
    builder().is_test(cfg!(test)).try_init().is_ok()
}

fn builder() -> Builder {
    let mut builder = Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER));
    builder.format_timestamp_millis();
    builder
}
