//! Cache address decomposition.
//!
//! This module splits raw byte addresses into the fields a set-associative cache uses. It provides:
//! 1. **Field Extraction:** Tag (high bits), index (middle bits) and offset (low bits).
//! 2. **Reassembly:** The inverse operation, used by address translators and tests.
//! 3. **Width Calculation:** The number of address bits a memory device needs.
//!
//! Decomposition is pure and is recomputed on every access; nothing here caches results, since
//! the widths change whenever the cache is reconfigured.

use std::fmt;

/// A raw address broken into its cache fields.
///
/// Layout, from most to least significant bit: `tag | index | offset`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheAddress {
    /// High-order bits identifying which block occupies a way.
    pub tag: u32,
    /// Middle bits selecting the cache line (set).
    pub index: u32,
    /// Low-order bits selecting a byte within the block.
    pub offset: u32,
}

/// Returns a mask with the lowest `bits` bits set.
///
/// Widths of 32 or more saturate to a full 32-bit mask.
#[inline]
pub fn low_mask(bits: u16) -> u32 {
    if bits >= 32 {
        u32::MAX
    } else {
        (1u32 << bits) - 1
    }
}

/// Returns the number of address bits needed to reach `max_address`.
///
/// For a device of `size` bytes whose last address is `size - 1`, this equals
/// `ceil(log2(size))`.
#[inline]
pub fn address_bits(max_address: u32) -> u16 {
    (u32::BITS - max_address.leading_zeros()) as u16
}

#[inline]
fn shift_right(value: u64, amount: u32) -> u64 {
    value.checked_shr(amount).unwrap_or(0)
}

#[inline]
fn shift_left(value: u64, amount: u32) -> u64 {
    value.checked_shl(amount).unwrap_or(0)
}

impl CacheAddress {
    /// Splits `address` using the given field widths.
    ///
    /// # Arguments
    ///
    /// * `address` - The raw byte address.
    /// * `tag_bits` - Width of the tag field.
    /// * `index_bits` - Width of the index field.
    /// * `data_bits` - Width of the offset field.
    ///
    /// # Returns
    ///
    /// The decomposed address. Bits above `tag_bits + index_bits + data_bits` are discarded.
    ///
    /// # Examples
    ///
    /// ```
    /// use cachesim_core::common::CacheAddress;
    ///
    /// let ca = CacheAddress::decompose(0xABCD, 8, 4, 4);
    /// assert_eq!(ca.tag, 0xAB);
    /// assert_eq!(ca.index, 0xC);
    /// assert_eq!(ca.offset, 0xD);
    /// ```
    pub fn decompose(address: u32, tag_bits: u16, index_bits: u16, data_bits: u16) -> Self {
        let raw = u64::from(address);
        let index_shift = u32::from(data_bits);
        let tag_shift = u32::from(data_bits) + u32::from(index_bits);

        Self {
            offset: address & low_mask(data_bits),
            index: shift_right(raw, index_shift) as u32 & low_mask(index_bits),
            tag: shift_right(raw, tag_shift) as u32 & low_mask(tag_bits),
        }
    }

    /// Reassembles the raw address this breakdown was taken from.
    ///
    /// # Arguments
    ///
    /// * `index_bits` - Width of the index field.
    /// * `data_bits` - Width of the offset field.
    pub fn compose(&self, index_bits: u16, data_bits: u16) -> u32 {
        let tag_shift = u32::from(data_bits) + u32::from(index_bits);
        let raw = shift_left(u64::from(self.tag), tag_shift)
            | shift_left(u64::from(self.index), u32::from(data_bits))
            | u64::from(self.offset);
        raw as u32
    }
}

impl fmt::Display for CacheAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{} I{} O{}", self.tag, self.index, self.offset)
    }
}
