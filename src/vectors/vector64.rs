use core::hash::Hasher;
use core::marker::PhantomData;

use crate::vectors::element::{self, reinterpret_views};
use crate::vectors::error::VectorError;
use crate::vectors::vector128::{Vector128, VECTOR128_BYTES};

/// Number of storage bytes in a [`Vector64`].
pub const VECTOR64_BYTES: usize = 8;

/// A 64-bit vector of `T` lanes over raw storage.
///
/// The storage is always eight bytes no matter which `T` the type is
/// instantiated with; the lane count derives from the element size. An
/// unsupported element type is reported by every operation rather than
/// prevented at construction, so the type itself stays instantiable.
#[repr(C, align(8))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vector64<T> {
    bytes: [u8; VECTOR64_BYTES],
    _element: PhantomData<T>,
}

impl<T: Copy + 'static> Vector64<T> {
    /// Returns the vector whose storage is all-zero bits.
    #[inline(always)]
    pub fn zero() -> Self {
        Self::from_bytes([0; VECTOR64_BYTES])
    }

    /// Wraps raw storage bytes as-is.
    #[inline(always)]
    pub const fn from_bytes(bytes: [u8; VECTOR64_BYTES]) -> Self {
        Self {
            bytes,
            _element: PhantomData,
        }
    }

    /// Returns the raw storage bytes.
    #[inline(always)]
    pub const fn to_bytes(self) -> [u8; VECTOR64_BYTES] {
        self.bytes
    }

    /// Lane count for `T`, derived from the storage and element sizes.
    #[inline(always)]
    pub fn count() -> Result<usize, VectorError> {
        let kind = element::element_kind::<T>()?;
        Ok(VECTOR64_BYTES / kind.size())
    }

    /// Builds a vector from exactly one full set of lane values.
    pub fn from_slice(values: &[T]) -> Result<Self, VectorError> {
        let kind = element::element_kind::<T>()?;
        let count = VECTOR64_BYTES / kind.size();
        if values.len() != count {
            return Err(VectorError::IndexOutOfRange {
                index: values.len(),
                count,
            });
        }
        let mut vector = Self::zero();
        // The kind gate pins size_of::<T>() to kind.size(), so count lanes
        // fill the storage exactly.
        unsafe {
            core::ptr::copy_nonoverlapping(
                values.as_ptr() as *const u8,
                vector.bytes.as_mut_ptr(),
                VECTOR64_BYTES,
            );
        }
        Ok(vector)
    }

    /// Reads the lane at `index`.
    #[inline(always)]
    pub fn get_element(&self, index: usize) -> Result<T, VectorError> {
        let kind = element::element_kind::<T>()?;
        let count = VECTOR64_BYTES / kind.size();
        if index >= count {
            return Err(VectorError::IndexOutOfRange { index, count });
        }
        Ok(unsafe {
            core::ptr::read_unaligned(self.bytes.as_ptr().add(index * kind.size()) as *const T)
        })
    }

    /// Reads lane zero, the cheapest extraction.
    #[inline(always)]
    pub fn to_scalar(&self) -> Result<T, VectorError> {
        self.get_element(0)
    }

    /// Returns a copy with the lane at `index` replaced by `value`.
    #[inline(always)]
    pub fn with_element(&self, index: usize, value: T) -> Result<Self, VectorError> {
        let kind = element::element_kind::<T>()?;
        let count = VECTOR64_BYTES / kind.size();
        if index >= count {
            return Err(VectorError::IndexOutOfRange { index, count });
        }
        let mut updated = *self;
        unsafe {
            core::ptr::write_unaligned(
                updated.bytes.as_mut_ptr().add(index * kind.size()) as *mut T,
                value,
            );
        }
        Ok(updated)
    }

    /// Compares lanes for equality, stopping at the first mismatch.
    ///
    /// Floating lanes use IEEE comparison, so a NaN lane never matches.
    /// Integer lanes collapse to a single 64-bit comparison because bit
    /// equality and value equality coincide for them.
    #[inline(always)]
    pub fn equals(&self, other: &Self) -> Result<bool, VectorError> {
        let kind = element::element_kind::<T>()?;
        if !kind.is_float() {
            return Ok(u64::from_ne_bytes(self.bytes) == u64::from_ne_bytes(other.bytes));
        }
        Ok(element::lanes_equal(kind, &self.bytes, &other.bytes))
    }

    /// Reinterprets the storage as lanes of `U` without copying or converting.
    #[inline(always)]
    pub fn reinterpret<U: Copy + 'static>(&self) -> Result<Vector64<U>, VectorError> {
        element::element_kind::<T>()?;
        element::element_kind::<U>()?;
        Ok(Vector64::from_bytes(self.bytes))
    }

    reinterpret_views!(Vector64);

    /// Widens into the low half of a [`Vector128`], zeroing the upper half.
    #[inline(always)]
    pub fn widen(&self) -> Result<Vector128<T>, VectorError> {
        element::element_kind::<T>()?;
        let mut bytes = [0u8; VECTOR128_BYTES];
        bytes[..VECTOR64_BYTES].copy_from_slice(&self.bytes);
        Ok(Vector128::from_bytes(bytes))
    }

    /// Widens into the low half of a [`Vector128`] without giving the upper
    /// half a defined value.
    ///
    /// The upper lanes carry arbitrary leftover bits; callers must overwrite
    /// them before reading. Producers that fill the upper half immediately
    /// can skip the zeroing store this way.
    #[inline(always)]
    pub fn widen_with_unspecified_upper(&self) -> Result<Vector128<T>, VectorError> {
        element::element_kind::<T>()?;
        let mut bytes = [0u8; VECTOR128_BYTES];
        bytes[..VECTOR64_BYTES].copy_from_slice(&self.bytes);
        // The upper half repeats the low bits instead of receiving a
        // defined zero value.
        bytes[VECTOR64_BYTES..].copy_from_slice(&self.bytes);
        Ok(Vector128::from_bytes(bytes))
    }

    /// Feeds every lane into `state` in index order.
    pub fn hash_elements<H: Hasher>(&self, state: &mut H) -> Result<(), VectorError> {
        let kind = element::element_kind::<T>()?;
        element::hash_lanes(kind, &self.bytes, state);
        Ok(())
    }

    /// Renders the lanes as `<e0, e1, …>`.
    pub fn format(&self) -> Result<String, VectorError> {
        self.format_with_separator(",")
    }

    /// Renders the lanes with the supplied list separator between them,
    /// each followed by a single space.
    pub fn format_with_separator(&self, separator: &str) -> Result<String, VectorError> {
        let kind = element::element_kind::<T>()?;
        Ok(element::format_lanes(kind, &self.bytes, separator))
    }
}

impl<T: Copy + 'static> std::fmt::Display for Vector64<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered = self.format().map_err(|_| std::fmt::Error)?;
        f.write_str(&rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    #[test]
    fn test_zero_is_all_zero_bits_for_every_kind() {
        assert_eq!(Vector64::<u8>::zero().to_bytes(), [0; 8]);
        assert_eq!(Vector64::<f64>::zero().to_bytes(), [0; 8]);
        assert_eq!(Vector64::<bool>::zero().to_bytes(), [0; 8]);
    }

    #[test]
    fn test_count_derives_from_element_size() {
        assert_eq!(Vector64::<i8>::count().unwrap(), 8);
        assert_eq!(Vector64::<u16>::count().unwrap(), 4);
        assert_eq!(Vector64::<f32>::count().unwrap(), 2);
        assert_eq!(Vector64::<i64>::count().unwrap(), 1);
    }

    #[test]
    fn test_from_slice_then_get_round_trips() {
        let v = Vector64::from_slice(&[3i16, -1, 0, 512]).unwrap();
        assert_eq!(v.get_element(0).unwrap(), 3);
        assert_eq!(v.get_element(1).unwrap(), -1);
        assert_eq!(v.get_element(2).unwrap(), 0);
        assert_eq!(v.get_element(3).unwrap(), 512);
        assert_eq!(v.to_scalar().unwrap(), 3);
    }

    #[test]
    fn test_from_slice_rejects_wrong_lane_count() {
        assert_eq!(
            Vector64::<i16>::from_slice(&[1, 2, 3]),
            Err(VectorError::IndexOutOfRange { index: 3, count: 4 })
        );
    }

    #[test]
    fn test_with_element_overwrites_only_the_target_lane() {
        let v = Vector64::from_slice(&[1u32, 2]).unwrap();
        let updated = v.with_element(1, 99).unwrap();
        assert_eq!(updated.get_element(0).unwrap(), 1);
        assert_eq!(updated.get_element(1).unwrap(), 99);
        // The receiver is untouched.
        assert_eq!(v.get_element(1).unwrap(), 2);
    }

    #[test]
    fn test_type_gate_wins_over_bounds_check() {
        let v = Vector64::<bool>::zero();
        assert_eq!(
            v.get_element(999),
            Err(VectorError::UnsupportedElementType { type_name: "bool" })
        );
        assert_eq!(
            v.with_element(999, true),
            Err(VectorError::UnsupportedElementType { type_name: "bool" })
        );
        assert!(matches!(
            Vector64::<char>::count(),
            Err(VectorError::UnsupportedElementType { .. })
        ));
    }

    #[test]
    fn test_integer_equality_matches_lane_values() {
        let a = Vector64::from_slice(&[1u8, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let b = Vector64::from_slice(&[1u8, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let c = a.with_element(7, 0).unwrap();
        assert!(a.equals(&b).unwrap());
        assert!(b.equals(&a).unwrap());
        assert!(!a.equals(&c).unwrap());
    }

    #[test]
    fn test_float_equality_is_ieee() {
        let nan = Vector64::from_slice(&[f32::NAN, 1.0]).unwrap();
        assert!(!nan.equals(&nan).unwrap());

        let negative_zero = Vector64::from_slice(&[-0.0f32, 1.0]).unwrap();
        let positive_zero = Vector64::from_slice(&[0.0f32, 1.0]).unwrap();
        assert!(negative_zero.equals(&positive_zero).unwrap());
    }

    #[test]
    fn test_reinterpret_preserves_bits() {
        let v = Vector64::from_slice(&[0x0102_0304u32, 0x0506_0708]).unwrap();
        let bytes = v.as_u8().unwrap();
        assert_eq!(bytes.to_bytes(), v.to_bytes());
        let round_tripped = bytes.as_u32().unwrap();
        assert_eq!(round_tripped.get_element(0).unwrap(), 0x0102_0304);
        assert!(matches!(
            v.reinterpret::<char>(),
            Err(VectorError::UnsupportedElementType { .. })
        ));
    }

    #[test]
    fn test_widen_zeroes_the_upper_half() {
        let v = Vector64::from_slice(&[7u32, 8]).unwrap();
        let wide = v.widen().unwrap();
        assert_eq!(wide.get_element(0).unwrap(), 7);
        assert_eq!(wide.get_element(1).unwrap(), 8);
        assert_eq!(wide.get_element(2).unwrap(), 0);
        assert_eq!(wide.get_element(3).unwrap(), 0);
    }

    #[test]
    fn test_unspecified_widen_keeps_the_low_half() {
        let v = Vector64::from_slice(&[7u32, 8]).unwrap();
        let wide = v.widen_with_unspecified_upper().unwrap();
        assert_eq!(wide.get_element(0).unwrap(), 7);
        assert_eq!(wide.get_element(1).unwrap(), 8);
        // Overwriting the upper half makes the result fully defined.
        let patched = wide.with_upper_half(Vector64::zero()).unwrap();
        assert!(patched.equals(&v.widen().unwrap()).unwrap());
    }

    #[test]
    fn test_hash_is_order_sensitive() {
        let a = Vector64::from_slice(&[1i32, 2]).unwrap();
        let b = Vector64::from_slice(&[2i32, 1]).unwrap();

        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();
        a.hash_elements(&mut ha).unwrap();
        b.hash_elements(&mut hb).unwrap();
        assert_ne!(ha.finish(), hb.finish());

        let mut ha2 = DefaultHasher::new();
        a.hash_elements(&mut ha2).unwrap();
        assert_eq!(ha.finish(), ha2.finish());
    }

    #[test]
    fn test_format_renders_lanes_in_order() {
        let v = Vector64::from_slice(&[1i32, -2]).unwrap();
        assert_eq!(v.format().unwrap(), "<1, -2>");
        assert_eq!(v.format_with_separator(";").unwrap(), "<1; -2>");
        assert_eq!(v.to_string(), "<1, -2>");
        assert!(matches!(
            Vector64::<bool>::zero().format(),
            Err(VectorError::UnsupportedElementType { .. })
        ));
    }
}
