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

//! A macro to define bitflags in a structured way.
#[macro_export]
#[doc(hidden)]
macro_rules! metapack_bitflags {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident: $ty:ty {
            $(
                $(#[$flag_attr:meta])*
                const $flag_name:ident = $flag_value:expr;
            )*
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis struct $name {
            bits: $ty,
        }

        impl $name {
            /// An empty set of flags.
            pub const EMPTY: Self = Self { bits: 0 };

            /// Every defined flag.
            pub const ALL: Self = Self { bits: 0 $(| $flag_value)* };

            /// Creates a flag set from raw bits, or `None` if any bit is undefined.
            pub const fn from_bits(bits: $ty) -> Option<Self> {
                if bits & !Self::ALL.bits == 0 {
                    Some(Self { bits })
                } else {
                    None
                }
            }

            /// Creates a flag set from raw bits, dropping undefined bits.
            pub const fn from_bits_truncate(bits: $ty) -> Self {
                Self { bits: bits & Self::ALL.bits }
            }

            /// Returns the raw value of the bitflag set.
            pub const fn bits(&self) -> $ty {
                self.bits
            }

            /// Returns `true` if no flag is set.
            pub const fn is_empty(&self) -> bool {
                self.bits == 0
            }

            /// Returns `true` if all flags in `other` are contained within `self`.
            pub const fn contains(&self, other: Self) -> bool {
                (self.bits & other.bits) == other.bits
            }

            /// Returns `true` if any flag in `other` is contained within `self`.
            pub const fn intersects(&self, other: Self) -> bool {
                (self.bits & other.bits) != 0
            }

            /// Inserts the flags in `other` into `self`.
            pub fn insert(&mut self, other: Self) {
                self.bits |= other.bits;
            }

            /// Removes the flags in `other` from `self`.
            pub fn remove(&mut self, other: Self) {
                self.bits &= !other.bits;
            }

            /// Inserts or removes `other` depending on `value`.
            pub fn set(&mut self, other: Self, value: bool) {
                if value {
                    self.insert(other);
                } else {
                    self.remove(other);
                }
            }

            /// Returns a new `Self` with `other` flags inserted.
            #[must_use]
            pub const fn with(mut self, other: Self) -> Self {
                self.bits |= other.bits;
                self
            }

            /// Returns a new `Self` with `other` flags removed.
            #[must_use]
            pub const fn without(mut self, other: Self) -> Self {
                self.bits &= !other.bits;
                self
            }

            /// Iterates over every defined single flag contained in `self`.
            pub fn iter(self) -> impl Iterator<Item = Self> {
                [$(Self::$flag_name),*]
                    .into_iter()
                    .filter(move |flag| !flag.is_empty() && self.contains(*flag))
            }

            $(
                $(#[$flag_attr])*
                pub const $flag_name: Self = Self { bits: $flag_value };
            )*
        }

        impl core::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, other: Self) -> Self {
                Self { bits: self.bits | other.bits }
            }
        }

        impl core::ops::BitAnd for $name {
            type Output = Self;
            fn bitand(self, other: Self) -> Self {
                Self { bits: self.bits & other.bits }
            }
        }

        impl core::ops::BitXor for $name {
            type Output = Self;
            fn bitxor(self, other: Self) -> Self {
                Self { bits: self.bits ^ other.bits }
            }
        }

        impl core::ops::Not for $name {
            type Output = Self;
            fn not(self) -> Self {
                Self { bits: !self.bits & Self::ALL.bits }
            }
        }

        impl core::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, other: Self) {
                self.bits |= other.bits;
            }
        }

        impl core::ops::BitAndAssign for $name {
            fn bitand_assign(&mut self, other: Self) {
                self.bits &= other.bits;
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                let mut bits = self.bits;
                let mut first_flag = true;

                write!(f, "{} {{ ", stringify!($name))?;

                $(
                    if ($flag_value != 0) && (bits & $flag_value) == $flag_value {
                        if !first_flag {
                            write!(f, " | ")?;
                        }
                        write!(f, "{}", stringify!($flag_name))?;
                        bits &= !$flag_value;
                        first_flag = false;
                    }
                )*

                if bits != 0 {
                    if !first_flag {
                        write!(f, " | ")?;
                    }
                    write!(f, "UNKNOWN({:#x})", bits)?;
                    first_flag = false;
                }

                if self.bits == 0 && first_flag {
                    write!(f, "EMPTY")?;
                }

                write!(f, " }}")
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::metapack_bitflags;

    metapack_bitflags! {
        /// TestFlags for macro verification
        pub struct TestFlags: u32 {
            const FLAG_A = 1 << 0;
            const FLAG_B = 1 << 1;
            const FLAG_C = 1 << 2;
        }
    }

    #[test]
    fn test_all_and_from_bits() {
        assert_eq!(TestFlags::ALL.bits(), 0b111);
        assert_eq!(TestFlags::from_bits(0b101), Some(TestFlags::FLAG_A | TestFlags::FLAG_C));
        assert_eq!(TestFlags::from_bits(0b1000), None);
        assert_eq!(TestFlags::from_bits_truncate(0b1001), TestFlags::FLAG_A);
    }

    #[test]
    fn test_set_and_not() {
        let mut flags = TestFlags::EMPTY;
        flags.set(TestFlags::FLAG_B, true);
        assert!(flags.contains(TestFlags::FLAG_B));
        assert_eq!(!flags, TestFlags::FLAG_A | TestFlags::FLAG_C);
        flags.set(TestFlags::FLAG_B, false);
        assert!(flags.is_empty());
    }

    #[test]
    fn test_iter_yields_single_flags() {
        let flags = TestFlags::FLAG_A | TestFlags::FLAG_C;
        let collected: Vec<_> = flags.iter().collect();
        assert_eq!(collected, vec![TestFlags::FLAG_A, TestFlags::FLAG_C]);
    }

    #[test]
    fn test_debug_format() {
        assert_eq!(format!("{:?}", TestFlags::EMPTY), "TestFlags { EMPTY }");
        assert_eq!(
            format!("{:?}", TestFlags::FLAG_A | TestFlags::FLAG_B),
            "TestFlags { FLAG_A | FLAG_B }"
        );
    }
}
