#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

use core::hash::Hasher;
use core::marker::PhantomData;

use crate::vectors::detect;
use crate::vectors::element::{self, reinterpret_views};
use crate::vectors::error::VectorError;
use crate::vectors::vector128::{self, Vector128, VECTOR128_BYTES};

/// Number of storage bytes in a [`Vector256`].
pub const VECTOR256_BYTES: usize = 32;

/// A 256-bit vector of `T` lanes over raw storage.
///
/// Mirrors the [`Vector128`] surface at double width; halves are addressable
/// as [`Vector128`]. Equality runs full-width when the machine has 256-bit
/// packed compares, over the two halves when it only has 128-bit ones, and
/// lane by lane otherwise.
#[repr(C, align(32))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vector256<T> {
    bytes: [u8; VECTOR256_BYTES],
    _element: PhantomData<T>,
}

impl<T: Copy + 'static> Vector256<T> {
    /// Returns the vector whose storage is all-zero bits.
    #[inline(always)]
    pub fn zero() -> Self {
        Self::from_bytes([0; VECTOR256_BYTES])
    }

    /// Wraps raw storage bytes as-is.
    #[inline(always)]
    pub const fn from_bytes(bytes: [u8; VECTOR256_BYTES]) -> Self {
        Self {
            bytes,
            _element: PhantomData,
        }
    }

    /// Returns the raw storage bytes.
    #[inline(always)]
    pub const fn to_bytes(self) -> [u8; VECTOR256_BYTES] {
        self.bytes
    }

    /// Lane count for `T`, derived from the storage and element sizes.
    #[inline(always)]
    pub fn count() -> Result<usize, VectorError> {
        let kind = element::element_kind::<T>()?;
        Ok(VECTOR256_BYTES / kind.size())
    }

    /// Builds a vector from exactly one full set of lane values.
    pub fn from_slice(values: &[T]) -> Result<Self, VectorError> {
        let kind = element::element_kind::<T>()?;
        let count = VECTOR256_BYTES / kind.size();
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
                VECTOR256_BYTES,
            );
        }
        Ok(vector)
    }

    /// Concatenates two half-width vectors, low half first.
    #[inline(always)]
    pub fn from_halves(lower: Vector128<T>, upper: Vector128<T>) -> Result<Self, VectorError> {
        element::element_kind::<T>()?;
        let mut bytes = [0u8; VECTOR256_BYTES];
        bytes[..VECTOR128_BYTES].copy_from_slice(&lower.to_bytes());
        bytes[VECTOR128_BYTES..].copy_from_slice(&upper.to_bytes());
        Ok(Self::from_bytes(bytes))
    }

    /// Reads the lane at `index`.
    #[inline(always)]
    pub fn get_element(&self, index: usize) -> Result<T, VectorError> {
        let kind = element::element_kind::<T>()?;
        let count = VECTOR256_BYTES / kind.size();
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
        let count = VECTOR256_BYTES / kind.size();
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
    /// Floating lanes use IEEE comparison, so a NaN lane never matches.
    /// The widest packed compare the machine supports runs first; two
    /// half-width compares cover machines with only 128-bit vectors, and a
    /// lane-by-lane loop covers everything else.
    pub fn equals(&self, other: &Self) -> Result<bool, VectorError> {
        let kind = element::element_kind::<T>()?;
        #[cfg(target_arch = "x86_64")]
        {
            if kind.is_float() {
                if detect::packed_compare_256_float() {
                    return Ok(unsafe { eq_packed_256_float(kind, &self.bytes, &other.bytes) });
                }
            } else if detect::packed_compare_256_int() {
                return Ok(unsafe { eq_packed_256_int(&self.bytes, &other.bytes) });
            }
        }
        if detect::packed_compare_128() {
            let (a_lo, a_hi) = split_halves(&self.bytes);
            let (b_lo, b_hi) = split_halves(&other.bytes);
            return Ok(unsafe {
                vector128::eq_packed_128(kind, a_lo, b_lo)
                    && vector128::eq_packed_128(kind, a_hi, b_hi)
            });
        }
        Ok(element::lanes_equal(kind, &self.bytes, &other.bytes))
    }

    /// Reinterprets the storage as lanes of `U` without copying or converting.
    #[inline(always)]
    pub fn reinterpret<U: Copy + 'static>(&self) -> Result<Vector256<U>, VectorError> {
        element::element_kind::<T>()?;
        element::element_kind::<U>()?;
        Ok(Vector256::from_bytes(self.bytes))
    }

    reinterpret_views!(Vector256);

    /// Returns the low sixteen bytes as a [`Vector128`].
    #[inline(always)]
    pub fn lower_half(&self) -> Result<Vector128<T>, VectorError> {
        element::element_kind::<T>()?;
        let mut bytes = [0u8; VECTOR128_BYTES];
        bytes.copy_from_slice(&self.bytes[..VECTOR128_BYTES]);
        Ok(Vector128::from_bytes(bytes))
    }

    /// Returns the high sixteen bytes as a [`Vector128`].
    #[inline(always)]
    pub fn upper_half(&self) -> Result<Vector128<T>, VectorError> {
        element::element_kind::<T>()?;
        let mut bytes = [0u8; VECTOR128_BYTES];
        bytes.copy_from_slice(&self.bytes[VECTOR128_BYTES..]);
        Ok(Vector128::from_bytes(bytes))
    }

    /// Returns a copy with the low half replaced and the high half kept.
    #[inline(always)]
    pub fn with_lower_half(&self, half: Vector128<T>) -> Result<Self, VectorError> {
        element::element_kind::<T>()?;
        let mut updated = *self;
        updated.bytes[..VECTOR128_BYTES].copy_from_slice(&half.to_bytes());
        Ok(updated)
    }

    /// Returns a copy with the high half replaced and the low half kept.
    #[inline(always)]
    pub fn with_upper_half(&self, half: Vector128<T>) -> Result<Self, VectorError> {
        element::element_kind::<T>()?;
        let mut updated = *self;
        updated.bytes[VECTOR128_BYTES..].copy_from_slice(&half.to_bytes());
        Ok(updated)
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

impl<T: Copy + 'static> std::fmt::Display for Vector256<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered = self.format().map_err(|_| std::fmt::Error)?;
        f.write_str(&rendered)
    }
}

/// Borrows the two 16-byte halves of a 32-byte block.
#[inline(always)]
fn split_halves(bytes: &[u8; VECTOR256_BYTES]) -> (&[u8; VECTOR128_BYTES], &[u8; VECTOR128_BYTES]) {
    // Both references stay inside the 32-byte array.
    unsafe {
        (
            &*(bytes.as_ptr() as *const [u8; VECTOR128_BYTES]),
            &*(bytes.as_ptr().add(VECTOR128_BYTES) as *const [u8; VECTOR128_BYTES]),
        )
    }
}

/// Full-width packed integer equality; bytewise compare matches value
/// equality for every integer kind.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
#[inline]
unsafe fn eq_packed_256_int(a: &[u8; VECTOR256_BYTES], b: &[u8; VECTOR256_BYTES]) -> bool {
    let va = _mm256_loadu_si256(a.as_ptr() as *const __m256i);
    let vb = _mm256_loadu_si256(b.as_ptr() as *const __m256i);
    _mm256_movemask_epi8(_mm256_cmpeq_epi8(va, vb)) == -1
}

/// Full-width packed float equality with IEEE ordered-compare semantics.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx")]
#[inline]
unsafe fn eq_packed_256_float(
    kind: element::ElementKind,
    a: &[u8; VECTOR256_BYTES],
    b: &[u8; VECTOR256_BYTES],
) -> bool {
    match kind {
        element::ElementKind::F64 => {
            let va = _mm256_loadu_pd(a.as_ptr() as *const f64);
            let vb = _mm256_loadu_pd(b.as_ptr() as *const f64);
            _mm256_movemask_pd(_mm256_cmp_pd::<_CMP_EQ_OQ>(va, vb)) == 0xF
        }
        _ => {
            let va = _mm256_loadu_ps(a.as_ptr() as *const f32);
            let vb = _mm256_loadu_ps(b.as_ptr() as *const f32);
            _mm256_movemask_ps(_mm256_cmp_ps::<_CMP_EQ_OQ>(va, vb)) == 0xFF
        }
    }
}
