//! Packed hash codes.
//!
//! A [`HashCode`] is a `width`-bit unsigned integer stored as little-endian
//! `u64` words. Widths up to 256 bits stay inline; wider codes spill to the
//! heap. Hyperplane `i` of a family contributes the code's bit at position
//! `width - 1 - i`, so plane 0 owns the most significant bit.

use smallvec::SmallVec;

/// Fixed-width unsigned hash code.
///
/// Invariant: bit positions at or above `width` are always zero, so equality
/// and reduction see only the meaningful bits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HashCode {
    words: SmallVec<[u64; 4]>,
    width: usize,
}

impl HashCode {
    /// All-zero code of the given width.
    #[must_use]
    pub fn zero(width: usize) -> Self {
        let num_words = width.div_ceil(64).max(1);
        HashCode {
            words: smallvec::smallvec![0; num_words],
            width,
        }
    }

    /// Code width in bits.
    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Bit value at `position`, where position 0 is the least significant.
    #[inline]
    #[must_use]
    pub fn bit(&self, position: usize) -> bool {
        debug_assert!(position < self.width);
        self.words[position / 64] >> (position % 64) & 1 == 1
    }

    /// Set the bit at `position` (LSB = 0).
    #[inline]
    pub(crate) fn set_bit(&mut self, position: usize) {
        debug_assert!(position < self.width);
        self.words[position / 64] |= 1u64 << (position % 64);
    }

    /// Toggle the bit owned by hyperplane `plane` (MSB-first layout).
    #[inline]
    pub(crate) fn flip_plane(&mut self, plane: usize) {
        debug_assert!(plane < self.width);
        let position = self.width - 1 - plane;
        self.words[position / 64] ^= 1u64 << (position % 64);
    }

    /// The code reduced modulo `modulus`, treating the words as one wide
    /// unsigned integer. Used both for bucket-slot selection and for the
    /// reduced evaluation surface.
    #[must_use]
    pub fn reduced(&self, modulus: u64) -> u64 {
        debug_assert!(modulus > 0);
        let m = u128::from(modulus);
        let mut rem: u128 = 0;
        for word in self.words.iter().rev() {
            rem = ((rem << 64) | u128::from(*word)) % m;
        }
        rem as u64
    }

    /// Bucket slot for a table with `num_buckets` slots.
    #[inline]
    #[must_use]
    pub fn slot(&self, num_buckets: usize) -> usize {
        self.reduced(num_buckets as u64) as usize
    }

    /// The low 64 bits of the code.
    #[inline]
    #[must_use]
    pub fn low_u64(&self) -> u64 {
        self.words[0]
    }
}

/// Number of agreeing bit positions among the low `bits` of two codes.
///
/// This is the Hamming similarity callers use to validate the empirical
/// collision-probability curve of a hash family against cosine similarity.
#[must_use]
pub fn bit_agreement(a: &HashCode, b: &HashCode, bits: usize) -> usize {
    let num_words = bits.div_ceil(64);
    let mut agree = 0usize;
    for w in 0..num_words {
        let wa = a.words.get(w).copied().unwrap_or(0);
        let wb = b.words.get(w).copied().unwrap_or(0);
        let same = !(wa ^ wb);
        let in_word = (bits - w * 64).min(64);
        let mask = if in_word == 64 {
            u64::MAX
        } else {
            (1u64 << in_word) - 1
        };
        agree += (same & mask).count_ones() as usize;
    }
    agree
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code_from_u64(value: u64, width: usize) -> HashCode {
        let mut c = HashCode::zero(width);
        for p in 0..width.min(64) {
            if value >> p & 1 == 1 {
                c.set_bit(p);
            }
        }
        c
    }

    #[test]
    fn zero_code_has_no_set_bits() {
        let c = HashCode::zero(130);
        assert_eq!(c.width(), 130);
        assert!((0..130).all(|p| !c.bit(p)));
    }

    #[test]
    fn plane_zero_owns_the_most_significant_bit() {
        let mut c = HashCode::zero(8);
        c.flip_plane(0);
        assert!(c.bit(7));
        assert_eq!(c.low_u64(), 0b1000_0000);
        c.flip_plane(7);
        assert!(c.bit(0));
        assert_eq!(c.low_u64(), 0b1000_0001);
    }

    #[test]
    fn flip_plane_is_an_involution() {
        let mut c = code_from_u64(0b1010_1100, 8);
        let before = c.clone();
        c.flip_plane(3);
        assert_ne!(c, before);
        c.flip_plane(3);
        assert_eq!(c, before);
    }

    #[test]
    fn reduction_matches_u64_arithmetic_for_narrow_codes() {
        let c = code_from_u64(12345, 16);
        assert_eq!(c.reduced(16), 12345 % 16);
        assert_eq!(c.slot(1000), 12345 % 1000);
    }

    #[test]
    fn reduction_handles_multi_word_codes() {
        // Value 2^64 + 5; 2^64 mod 7 = 2, so the total mod 7 is (2 + 5) mod 7.
        let mut c = HashCode::zero(128);
        c.set_bit(64);
        c.set_bit(0);
        c.set_bit(2);
        assert_eq!(c.reduced(7), (2u64 + 5) % 7);
    }

    #[test]
    fn bit_agreement_counts_matching_positions() {
        let a = code_from_u64(0b1100, 4);
        let b = code_from_u64(0b1010, 4);
        // positions: 0 (0==0), 1 (0!=1), 2 (1!=0), 3 (1==1) -> 2 agree
        assert_eq!(bit_agreement(&a, &b, 4), 2);
        assert_eq!(bit_agreement(&a, &a, 4), 4);
    }

    #[test]
    fn bit_agreement_spans_word_boundaries() {
        let mut a = HashCode::zero(100);
        let b = HashCode::zero(100);
        a.set_bit(99);
        assert_eq!(bit_agreement(&a, &b, 100), 99);
    }
}
