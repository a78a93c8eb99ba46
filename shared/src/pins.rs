//! Pin sets as bitmasks. Bit `i` is pin `i` of the rack, head pin first.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const PIN_COUNT: usize = 10;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PinMask(u16);

impl PinMask {
    pub const EMPTY: PinMask = PinMask(0);
    pub const ALL: PinMask = PinMask((1 << PIN_COUNT) - 1);

    /// Build from raw bits; bits above the rack are dropped.
    pub fn from_bits(bits: u16) -> Self {
        PinMask(bits & Self::ALL.0)
    }

    pub fn bits(self) -> u16 {
        self.0
    }

    pub fn single(index: usize) -> Self {
        debug_assert!(index < PIN_COUNT);
        PinMask::from_bits(1 << index)
    }

    pub fn contains(self, index: usize) -> bool {
        index < PIN_COUNT && self.0 & (1 << index) != 0
    }

    pub fn insert(&mut self, index: usize) {
        if index < PIN_COUNT {
            self.0 |= 1 << index;
        }
    }

    pub fn remove(&mut self, index: usize) {
        if index < PIN_COUNT {
            self.0 &= !(1 << index);
        }
    }

    /// Number of pins in the set.
    pub fn count(self) -> u8 {
        self.0.count_ones() as u8
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Pins in `self` that are not in `other`.
    pub fn and_not(self, other: PinMask) -> PinMask {
        PinMask(self.0 & !other.0)
    }

    pub fn iter(self) -> impl Iterator<Item = usize> {
        (0..PIN_COUNT).filter(move |&i| self.contains(i))
    }
}

impl fmt::Debug for PinMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PinMask({:010b})", self.0)
    }
}
