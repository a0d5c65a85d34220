#[cfg(target_arch = "aarch64")]
use core::arch::aarch64::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

use core::hash::Hasher;
use core::marker::PhantomData;

use crate::vectors::detect;
use crate::vectors::element::{self, reinterpret_views, ElementKind};
use crate::vectors::error::VectorError;
use crate::vectors::vector256::{Vector256, VECTOR256_BYTES};
use crate::vectors::vector64::{Vector64, VECTOR64_BYTES};

/// Number of storage bytes in a [`Vector128`].
pub const VECTOR128_BYTES: usize = 16;

/// A 128-bit vector of `T` lanes over raw storage.
///
/// This is the primary vector unit: sixteen bytes of storage, halves
/// addressable as [`Vector64`], and the full elementwise operation surface.
/// Operations check the element type before touching storage and the packed
/// compare path is taken only when the running machine supports it.
#[repr(C, align(16))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vector128<T> {
    bytes: [u8; VECTOR128_BYTES],
    _element: PhantomData<T>,
}

impl<T: Copy + 'static> Vector128<T> {
    /// Returns the vector whose storage is all-zero bits.
    #[inline(always)]
    pub fn zero() -> Self {
        Self::from_bytes([0; VECTOR128_BYTES])
    }

    /// Wraps raw storage bytes as-is.
    #[inline(always)]
    pub const fn from_bytes(bytes: [u8; VECTOR128_BYTES]) -> Self {
        Self {
            bytes,
            _element: PhantomData,
        }
    }

    /// Returns the raw storage bytes.
    #[inline(always)]
    pub const fn to_bytes(self) -> [u8; VECTOR128_BYTES] {
        self.bytes
    }

    /// Lane count for `T`, derived from the storage and element sizes.
    #[inline(always)]
    pub fn count() -> Result<usize, VectorError> {
        let kind = element::element_kind::<T>()?;
        Ok(VECTOR128_BYTES / kind.size())
    }

    /// Builds a vector from exactly one full set of lane values.
    pub fn from_slice(values: &[T]) -> Result<Self, VectorError> {
        let kind = element::element_kind::<T>()?;
        let count = VECTOR128_BYTES / kind.size();
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
                VECTOR128_BYTES,
            );
        }
        Ok(vector)
    }

    /// Concatenates two half-width vectors, low half first.
    #[inline(always)]
    pub fn from_halves(lower: Vector64<T>, upper: Vector64<T>) -> Result<Self, VectorError> {
        element::element_kind::<T>()?;
        let mut bytes = [0u8; VECTOR128_BYTES];
        bytes[..VECTOR64_BYTES].copy_from_slice(&lower.to_bytes());
        bytes[VECTOR64_BYTES..].copy_from_slice(&upper.to_bytes());
        Ok(Self::from_bytes(bytes))
    }

    /// Reads the lane at `index`.
    #[inline(always)]
    pub fn get_element(&self, index: usize) -> Result<T, VectorError> {
        let kind = element::element_kind::<T>()?;
        let count = VECTOR128_BYTES / kind.size();
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
        let count = VECTOR128_BYTES / kind.size();
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

    /// Compares lanes for equality.
    ///
    /// Floating lanes use IEEE comparison, so a NaN lane never matches. The
    /// packed compare runs when the capability query confirms support;
    /// integer kinds take the packed integer compare, floating kinds the
    /// packed float compare. Otherwise a lane-by-lane loop stops at the
    /// first mismatch.
    pub fn equals(&self, other: &Self) -> Result<bool, VectorError> {
        let kind = element::element_kind::<T>()?;
        if detect::packed_compare_128() {
            return Ok(unsafe { eq_packed_128(kind, &self.bytes, &other.bytes) });
        }
        Ok(element::lanes_equal(kind, &self.bytes, &other.bytes))
    }

    /// Reinterprets the storage as lanes of `U` without copying or converting.
    #[inline(always)]
    pub fn reinterpret<U: Copy + 'static>(&self) -> Result<Vector128<U>, VectorError> {
        element::element_kind::<T>()?;
        element::element_kind::<U>()?;
        Ok(Vector128::from_bytes(self.bytes))
    }

    reinterpret_views!(Vector128);

    /// Returns the low eight bytes as a [`Vector64`].
    #[inline(always)]
    pub fn lower_half(&self) -> Result<Vector64<T>, VectorError> {
        element::element_kind::<T>()?;
        let mut bytes = [0u8; VECTOR64_BYTES];
        bytes.copy_from_slice(&self.bytes[..VECTOR64_BYTES]);
        Ok(Vector64::from_bytes(bytes))
    }

    /// Returns the high eight bytes as a [`Vector64`].
    #[inline(always)]
    pub fn upper_half(&self) -> Result<Vector64<T>, VectorError> {
        element::element_kind::<T>()?;
        let mut bytes = [0u8; VECTOR64_BYTES];
        bytes.copy_from_slice(&self.bytes[VECTOR64_BYTES..]);
        Ok(Vector64::from_bytes(bytes))
    }

    /// Returns a copy with the low half replaced and the high half kept.
    #[inline(always)]
    pub fn with_lower_half(&self, half: Vector64<T>) -> Result<Self, VectorError> {
        element::element_kind::<T>()?;
        let mut updated = *self;
        updated.bytes[..VECTOR64_BYTES].copy_from_slice(&half.to_bytes());
        Ok(updated)
    }

    /// Returns a copy with the high half replaced and the low half kept.
    #[inline(always)]
    pub fn with_upper_half(&self, half: Vector64<T>) -> Result<Self, VectorError> {
        element::element_kind::<T>()?;
        let mut updated = *self;
        updated.bytes[VECTOR64_BYTES..].copy_from_slice(&half.to_bytes());
        Ok(updated)
    }

    /// Widens into the low half of a [`Vector256`], zeroing the upper half.
    #[inline(always)]
    pub fn widen(&self) -> Result<Vector256<T>, VectorError> {
        element::element_kind::<T>()?;
        let mut bytes = [0u8; VECTOR256_BYTES];
        bytes[..VECTOR128_BYTES].copy_from_slice(&self.bytes);
        Ok(Vector256::from_bytes(bytes))
    }

    /// Widens into the low half of a [`Vector256`] without giving the upper
    /// half a defined value.
    ///
    /// The upper lanes carry arbitrary leftover bits; callers must overwrite
    /// them before reading.
    #[inline(always)]
    pub fn widen_with_unspecified_upper(&self) -> Result<Vector256<T>, VectorError> {
        element::element_kind::<T>()?;
        let mut bytes = [0u8; VECTOR256_BYTES];
        bytes[..VECTOR128_BYTES].copy_from_slice(&self.bytes);
        // The upper half repeats the low bits instead of receiving a
        // defined zero value.
        bytes[VECTOR128_BYTES..].copy_from_slice(&self.bytes);
        Ok(Vector256::from_bytes(bytes))
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

impl<T: Copy + 'static> std::fmt::Display for Vector128<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered = self.format().map_err(|_| std::fmt::Error)?;
        f.write_str(&rendered)
    }
}

/// Packed 128-bit equality on x86_64.
///
/// Integer kinds compare bytewise, which matches value equality for them.
/// Floating kinds must go through the float compare so NaN and signed-zero
/// lanes keep IEEE behavior.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
pub(crate) unsafe fn eq_packed_128(
    kind: ElementKind,
    a: &[u8; VECTOR128_BYTES],
    b: &[u8; VECTOR128_BYTES],
) -> bool {
    let va = _mm_loadu_si128(a.as_ptr() as *const __m128i);
    let vb = _mm_loadu_si128(b.as_ptr() as *const __m128i);
    match kind {
        ElementKind::F32 => {
            _mm_movemask_ps(_mm_cmpeq_ps(_mm_castsi128_ps(va), _mm_castsi128_ps(vb))) == 0xF
        }
        ElementKind::F64 => {
            _mm_movemask_pd(_mm_cmpeq_pd(_mm_castsi128_pd(va), _mm_castsi128_pd(vb))) == 0x3
        }
        _ => _mm_movemask_epi8(_mm_cmpeq_epi8(va, vb)) == 0xFFFF,
    }
}

/// Packed 128-bit equality on aarch64.
#[cfg(target_arch = "aarch64")]
#[inline(always)]
pub(crate) unsafe fn eq_packed_128(
    kind: ElementKind,
    a: &[u8; VECTOR128_BYTES],
    b: &[u8; VECTOR128_BYTES],
) -> bool {
    match kind {
        ElementKind::F32 => {
            let va = vld1q_f32(a.as_ptr() as *const f32);
            let vb = vld1q_f32(b.as_ptr() as *const f32);
            vminvq_u32(vceqq_f32(va, vb)) == u32::MAX
        }
        ElementKind::F64 => {
            let va = vld1q_f64(a.as_ptr() as *const f64);
            let vb = vld1q_f64(b.as_ptr() as *const f64);
            let eq = vceqq_f64(va, vb);
            vgetq_lane_u64::<0>(eq) == u64::MAX && vgetq_lane_u64::<1>(eq) == u64::MAX
        }
        _ => {
            let va = vld1q_u8(a.as_ptr());
            let vb = vld1q_u8(b.as_ptr());
            vminvq_u8(vceqq_u8(va, vb)) == u8::MAX
        }
    }
}

/// Fallback for targets with no packed compare; the capability query keeps
/// this from being reached at runtime.
#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
#[inline(always)]
pub(crate) unsafe fn eq_packed_128(
    kind: ElementKind,
    a: &[u8; VECTOR128_BYTES],
    b: &[u8; VECTOR128_BYTES],
) -> bool {
    element::lanes_equal(kind, a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::hash_map::DefaultHasher;

    #[test]
    fn test_count_derives_from_element_size() {
        assert_eq!(Vector128::<u8>::count().unwrap(), 16);
        assert_eq!(Vector128::<i16>::count().unwrap(), 8);
        assert_eq!(Vector128::<i32>::count().unwrap(), 4);
        assert_eq!(Vector128::<f64>::count().unwrap(), 2);
    }

    #[test]
    fn test_reinterpret_reads_integer_bits_as_floats() {
        let ints = Vector128::from_slice(&[1i32, 2, 3, 4]).unwrap();
        assert_eq!(ints.get_element(0).unwrap(), 1);

        let floats = ints.as_f32().unwrap();
        for i in 0..4 {
            let expected = f32::from_bits((i as u32) + 1);
            assert_eq!(floats.get_element(i).unwrap().to_bits(), expected.to_bits());
        }
        assert_eq!(
            floats.to_scalar().unwrap().to_bits(),
            f32::from_bits(1).to_bits()
        );
    }

    #[test]
    fn test_reinterpret_round_trip_is_lossless() {
        let v = Vector128::from_slice(&[1.5f32, -2.25, f32::NAN, 0.0]).unwrap();
        let round_tripped = v.as_u16().unwrap().as_f32().unwrap();
        assert_eq!(round_tripped.to_bytes(), v.to_bytes());
    }

    #[test]
    fn test_with_upper_half_overwrites_the_high_lanes() {
        let v = Vector128::from_slice(&[1i32, 2, 3, 4]).unwrap();
        let half = Vector64::from_slice(&[9i32, 9]).unwrap();
        let updated = v.with_upper_half(half).unwrap();
        let expected = Vector128::from_slice(&[1i32, 2, 9, 9]).unwrap();
        assert!(updated.equals(&expected).unwrap());
        // The receiver keeps its original lanes.
        assert_eq!(v.get_element(2).unwrap(), 3);
    }

    #[test]
    fn test_halves_concatenate_back_to_the_whole() {
        let v = Vector128::from_slice(&[10u16, 20, 30, 40, 50, 60, 70, 80]).unwrap();
        let rebuilt =
            Vector128::from_halves(v.lower_half().unwrap(), v.upper_half().unwrap()).unwrap();
        assert_eq!(rebuilt.to_bytes(), v.to_bytes());

        let mut concatenated = [0u8; VECTOR128_BYTES];
        concatenated[..8].copy_from_slice(&v.lower_half().unwrap().to_bytes());
        concatenated[8..].copy_from_slice(&v.upper_half().unwrap().to_bytes());
        assert_eq!(concatenated, v.to_bytes());
    }

    #[test]
    fn test_equality_paths_agree_on_nan_lanes() {
        let with_nan = Vector128::from_slice(&[f32::NAN, 1.0, 2.0, 3.0]).unwrap();
        let plain = Vector128::from_slice(&[0.5f32, 1.0, 2.0, 3.0]).unwrap();

        assert!(!with_nan.equals(&with_nan).unwrap());
        assert!(plain.equals(&plain).unwrap());
        assert!(!plain.equals(&with_nan).unwrap());

        // Whatever path ran above, the scalar loop must say the same thing.
        assert!(!element::lanes_equal(
            ElementKind::F32,
            &with_nan.to_bytes(),
            &with_nan.to_bytes()
        ));

        // The same NaN bits under an integer view are equal lanes.
        let int_view = with_nan.as_u32().unwrap();
        assert!(int_view.equals(&int_view).unwrap());
    }

    #[test]
    fn test_equality_over_f64_lanes() {
        let a = Vector128::from_slice(&[1.0f64, -0.0]).unwrap();
        let b = Vector128::from_slice(&[1.0f64, 0.0]).unwrap();
        // -0.0 == 0.0 under IEEE comparison even though the bits differ.
        assert!(a.equals(&b).unwrap());
        assert!(!a.as_u64().unwrap().equals(&b.as_u64().unwrap()).unwrap());
    }

    #[test]
    fn test_type_gate_wins_over_bounds_check() {
        let v = Vector128::<bool>::zero();
        assert!(matches!(
            v.get_element(0),
            Err(VectorError::UnsupportedElementType { .. })
        ));
        assert!(matches!(
            v.get_element(usize::MAX),
            Err(VectorError::UnsupportedElementType { .. })
        ));
        assert!(matches!(
            v.equals(&v),
            Err(VectorError::UnsupportedElementType { .. })
        ));
        assert!(matches!(
            v.lower_half(),
            Err(VectorError::UnsupportedElementType { .. })
        ));
    }

    #[test]
    fn test_bounds_check_reports_the_lane_count() {
        let v = Vector128::<i32>::zero();
        assert_eq!(
            v.get_element(4),
            Err(VectorError::IndexOutOfRange { index: 4, count: 4 })
        );
        assert_eq!(
            v.with_element(17, 0),
            Err(VectorError::IndexOutOfRange {
                index: 17,
                count: 4
            })
        );
    }

    #[test]
    fn test_format_matches_the_documented_rendering() {
        let v = Vector128::from_slice(&[1i32, 2, 3, 4]).unwrap();
        assert_eq!(v.format().unwrap(), "<1, 2, 3, 4>");
        assert_eq!(format!("{v}"), "<1, 2, 3, 4>");
        assert_eq!(v.format_with_separator(";").unwrap(), "<1; 2; 3; 4>");
    }

    #[test]
    fn test_hash_distinguishes_permuted_lanes() {
        let a = Vector128::from_slice(&[1i32, 2, 3, 4]).unwrap();
        let b = Vector128::from_slice(&[4i32, 3, 2, 1]).unwrap();

        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();
        a.hash_elements(&mut ha).unwrap();
        b.hash_elements(&mut hb).unwrap();
        assert_ne!(ha.finish(), hb.finish());
    }

    #[test]
    fn test_hash_of_equal_float_vectors_matches() {
        let a = Vector128::from_slice(&[1.0f64, 2.0]).unwrap();
        let b = Vector128::from_slice(&[1.0f64, 2.0]).unwrap();

        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();
        a.hash_elements(&mut ha).unwrap();
        b.hash_elements(&mut hb).unwrap();
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn test_widen_zeroes_the_upper_half() {
        let v = Vector128::from_slice(&[1u64, 2]).unwrap();
        let wide = v.widen().unwrap();
        assert_eq!(wide.get_element(0).unwrap(), 1);
        assert_eq!(wide.get_element(1).unwrap(), 2);
        assert_eq!(wide.get_element(2).unwrap(), 0);
        assert_eq!(wide.get_element(3).unwrap(), 0);
    }

    proptest! {
        #[test]
        fn prop_with_then_get_returns_the_written_lane(
            lanes in proptest::array::uniform4(any::<i32>()),
            index in 0usize..4,
            value in any::<i32>(),
        ) {
            let v = Vector128::from_slice(&lanes).unwrap();
            let updated = v.with_element(index, value).unwrap();
            prop_assert_eq!(updated.get_element(index).unwrap(), value);
            for j in (0..4).filter(|&j| j != index) {
                prop_assert_eq!(updated.get_element(j).unwrap(), lanes[j]);
            }
        }

        #[test]
        fn prop_reinterpret_round_trip_preserves_storage(
            bytes in proptest::array::uniform16(any::<u8>()),
        ) {
            let v = Vector128::<u8>::from_bytes(bytes);
            let round_tripped = v.as_f32().unwrap().as_i64().unwrap().as_u8().unwrap();
            prop_assert_eq!(round_tripped.to_bytes(), v.to_bytes());
        }

        #[test]
        fn prop_packed_and_scalar_equality_agree(
            a in proptest::array::uniform16(any::<u8>()),
            b in proptest::array::uniform16(any::<u8>()),
        ) {
            // Arbitrary bytes exercise NaN payloads and signed zeros.
            let va = Vector128::<f32>::from_bytes(a);
            let vb = Vector128::<f32>::from_bytes(b);
            prop_assert_eq!(
                va.equals(&vb).unwrap(),
                element::lanes_equal(ElementKind::F32, &a, &b)
            );

            let ia = Vector128::<i16>::from_bytes(a);
            let ib = Vector128::<i16>::from_bytes(b);
            prop_assert_eq!(
                ia.equals(&ib).unwrap(),
                element::lanes_equal(ElementKind::I16, &a, &b)
            );
        }

        #[test]
        fn prop_halves_round_trip(
            bytes in proptest::array::uniform16(any::<u8>()),
        ) {
            let v = Vector128::<u32>::from_bytes(bytes);
            let rebuilt = Vector128::from_halves(
                v.lower_half().unwrap(),
                v.upper_half().unwrap(),
            )
            .unwrap();
            prop_assert_eq!(rebuilt.to_bytes(), v.to_bytes());
        }
    }
}
