#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Fixed-width bitsets keyed by variable index.
//!
//! Every clause, the trail and the batched assignment calls describe sets of
//! variables as a [`Bitset`] whose width is the number of variables in the
//! formula. Bit `i` stands for DIMACS variable `i + 1`.
//!
//! The storage is a [`BitVec`] of 32-bit blocks. Out-of-range indices and
//! operations mixing bitsets of different widths are contract violations and
//! panic.

use bit_vec::BitVec;
use core::ops::{BitAnd, BitOr, BitXor, Not, Sub};
use std::fmt;

const BLOCK_BITS: usize = u32::BITS as usize;

/// A set of variable indices in `[0, width)`.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Bitset(BitVec);

impl Bitset {
    /// An empty set over `width` variables.
    #[must_use]
    pub fn new(width: usize) -> Self {
        Self(BitVec::from_elem(width, false))
    }

    /// The set of every variable in `[0, width)`.
    #[must_use]
    pub fn full(width: usize) -> Self {
        Self(BitVec::from_elem(width, true))
    }

    /// A set containing exactly `index`.
    #[must_use]
    pub fn singleton(width: usize, index: usize) -> Self {
        let mut set = Self::new(width);
        set.set(index);
        set
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.0.len()
    }

    /// Whether `index` is in the set.
    ///
    /// # Panics
    ///
    /// If `index` is not below [`Self::width`].
    #[must_use]
    pub fn test(&self, index: usize) -> bool {
        self.0
            .get(index)
            .unwrap_or_else(|| panic!("bit {index} out of range for width {}", self.width()))
    }

    pub fn set(&mut self, index: usize) {
        self.0.set(index, true);
    }

    pub fn clear(&mut self, index: usize) {
        self.0.set(index, false);
    }

    /// `self |= other`.
    pub fn set_bits(&mut self, other: &Self) {
        self.0.or(&other.0);
    }

    /// `self &= !other`.
    pub fn clear_bits(&mut self, other: &Self) {
        self.0.difference(&other.0);
    }

    /// `self &= other`.
    pub fn retain_bits(&mut self, other: &Self) {
        self.0.and(&other.0);
    }

    /// `self ^= other`.
    pub fn toggle_bits(&mut self, other: &Self) {
        self.0.xor(&other.0);
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.blocks().all(|block| block == 0)
    }

    /// Whether exactly one bit is set.
    #[must_use]
    pub fn is_single(&self) -> bool {
        let mut blocks = self.0.blocks().skip_while(|&block| block == 0);
        match blocks.next() {
            Some(block) => block & (block - 1) == 0 && blocks.all(|rest| rest == 0),
            None => false,
        }
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.0.blocks().map(|block| block.count_ones() as usize).sum()
    }

    /// The least index still in the set.
    #[must_use]
    pub fn lowest_set_bit(&self) -> Option<usize> {
        self.0
            .blocks()
            .enumerate()
            .find(|&(_, block)| block != 0)
            .map(|(i, block)| i * BLOCK_BITS + block.trailing_zeros() as usize)
            .filter(|&index| index < self.width())
    }

    /// Whether every bit of `self` is also in `other`.
    #[must_use]
    pub fn is_subset(&self, other: &Self) -> bool {
        debug_assert_eq!(self.width(), other.width());
        self.0
            .blocks()
            .zip(other.0.blocks())
            .all(|(mine, theirs)| mine & !theirs == 0)
    }

    /// Whether `self` and `other` share at least one bit.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        debug_assert_eq!(self.width(), other.width());
        self.0
            .blocks()
            .zip(other.0.blocks())
            .any(|(mine, theirs)| mine & theirs != 0)
    }

    /// Indices in the set, lowest first.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.blocks().enumerate().flat_map(|(i, mut block)| {
            std::iter::from_fn(move || {
                if block == 0 {
                    return None;
                }
                let bit = block.trailing_zeros() as usize;
                block &= block - 1;
                Some(i * BLOCK_BITS + bit)
            })
        })
    }
}

impl fmt::Debug for Bitset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter_ones()).finish()
    }
}

impl BitAnd for &Bitset {
    type Output = Bitset;

    fn bitand(self, rhs: Self) -> Bitset {
        let mut out = self.clone();
        out.retain_bits(rhs);
        out
    }
}

impl BitOr for &Bitset {
    type Output = Bitset;

    fn bitor(self, rhs: Self) -> Bitset {
        let mut out = self.clone();
        out.set_bits(rhs);
        out
    }
}

impl BitXor for &Bitset {
    type Output = Bitset;

    fn bitxor(self, rhs: Self) -> Bitset {
        let mut out = self.clone();
        out.toggle_bits(rhs);
        out
    }
}

impl Sub for &Bitset {
    type Output = Bitset;

    fn sub(self, rhs: Self) -> Bitset {
        let mut out = self.clone();
        out.clear_bits(rhs);
        out
    }
}

impl Not for &Bitset {
    type Output = Bitset;

    fn not(self) -> Bitset {
        &Bitset::full(self.width()) - self
    }
}
