//! Typed coordinates
//!
//! Every backing file is treated as circular: arithmetic helpers take the
//! owning sequence's length and wrap past the end back to the start (and
//! below zero back from the end). The four offset spaces are distinct types
//! with no implicit conversion between them, so a byte offset can never be
//! passed where a token offset is expected.

use std::fmt;
use std::ops::{Add, AddAssign, Rem, Sub};

macro_rules! offset_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(pub u64);

        impl $name {
            pub const ZERO: Self = Self(0);

            #[inline]
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            #[inline]
            pub const fn get(self) -> u64 {
                self.0
            }

            #[inline]
            pub fn as_usize(self) -> usize {
                self.0 as usize
            }

            /// This position taken modulo `len`. `len` must be non-zero.
            #[inline]
            pub fn wrap(self, len: Self) -> Self {
                Self(self.0 % len.0)
            }

            /// `(self + delta) mod len`
            #[inline]
            pub fn wrapping_add(self, delta: u64, len: Self) -> Self {
                let len = len.0 as u128;
                Self(((self.0 as u128 % len + delta as u128 % len) % len) as u64)
            }

            /// `(self - delta) mod len`, wrapping from the end for negative results
            #[inline]
            pub fn wrapping_sub(self, delta: u64, len: Self) -> Self {
                let len = len.0 as u128;
                Self(((self.0 as u128 % len + len - delta as u128 % len) % len) as u64)
            }

            /// Positions `self..end` in ascending order
            pub fn range_to(self, end: Self) -> impl Iterator<Item = Self> + Clone {
                (self.0..end.0).map(Self)
            }
        }

        impl Add for $name {
            type Output = Self;
            #[inline]
            fn add(self, rhs: Self) -> Self {
                Self(self.0 + rhs.0)
            }
        }

        impl Add<u64> for $name {
            type Output = Self;
            #[inline]
            fn add(self, rhs: u64) -> Self {
                Self(self.0 + rhs)
            }
        }

        impl AddAssign<u64> for $name {
            #[inline]
            fn add_assign(&mut self, rhs: u64) {
                self.0 += rhs;
            }
        }

        impl Sub for $name {
            type Output = Self;
            #[inline]
            fn sub(self, rhs: Self) -> Self {
                Self(self.0 - rhs.0)
            }
        }

        impl Sub<u64> for $name {
            type Output = Self;
            #[inline]
            fn sub(self, rhs: u64) -> Self {
                Self(self.0 - rhs)
            }
        }

        impl Rem for $name {
            type Output = Self;
            #[inline]
            fn rem(self, rhs: Self) -> Self {
                Self(self.0 % rhs.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

offset_type!(
    /// Offset of a byte within a data file
    ByteOffset
);
offset_type!(
    /// Offset of a decoded character within a token file's text
    CharOffset
);
offset_type!(
    /// Offset of a token within a token file
    TokenOffset
);
offset_type!(
    /// Offset of an element within a fixed-width array file
    ElementOffset
);
