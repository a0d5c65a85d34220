use core::any::TypeId;
use core::hash::{Hash, Hasher};

use crate::vectors::error::VectorError;

/// Tag identifying which of the supported element types a vector holds.
///
/// The set is closed: fixed-width signed and unsigned integers of one, two,
/// four, and eight bytes, plus IEEE single and double floats. Everything
/// else fails the gate in [`element_kind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl ElementKind {
    /// Resolves the kind for `T`, or `None` when `T` is outside the supported set.
    ///
    /// Monomorphization turns the whole chain into a constant per
    /// instantiation, so callers resolve the kind once on entry and dispatch
    /// on the tag from then on.
    #[inline(always)]
    pub fn of<T: 'static>() -> Option<Self> {
        let id = TypeId::of::<T>();
        if id == TypeId::of::<i8>() {
            Some(Self::I8)
        } else if id == TypeId::of::<i16>() {
            Some(Self::I16)
        } else if id == TypeId::of::<i32>() {
            Some(Self::I32)
        } else if id == TypeId::of::<i64>() {
            Some(Self::I64)
        } else if id == TypeId::of::<u8>() {
            Some(Self::U8)
        } else if id == TypeId::of::<u16>() {
            Some(Self::U16)
        } else if id == TypeId::of::<u32>() {
            Some(Self::U32)
        } else if id == TypeId::of::<u64>() {
            Some(Self::U64)
        } else if id == TypeId::of::<f32>() {
            Some(Self::F32)
        } else if id == TypeId::of::<f64>() {
            Some(Self::F64)
        } else {
            None
        }
    }

    /// Element size in bytes.
    #[inline(always)]
    pub const fn size(self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::I64 | Self::U64 | Self::F64 => 8,
        }
    }

    /// True for the IEEE floating kinds.
    #[inline(always)]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }
}

/// Resolves the element kind for `T` or reports the unsupported type.
#[inline(always)]
pub(crate) fn element_kind<T: 'static>() -> Result<ElementKind, VectorError> {
    ElementKind::of::<T>().ok_or(VectorError::UnsupportedElementType {
        type_name: core::any::type_name::<T>(),
    })
}

/// Decodes storage into an iterator of native lane values of type `$t`.
macro_rules! lane_iter {
    ($bytes:expr, $t:ty) => {
        $bytes
            .chunks_exact(core::mem::size_of::<$t>())
            .map(|chunk| {
                let mut raw = [0u8; core::mem::size_of::<$t>()];
                raw.copy_from_slice(chunk);
                <$t>::from_ne_bytes(raw)
            })
    };
}

/// Lane-by-lane equality over raw storage, stopping at the first mismatch.
///
/// Floating kinds compare by value so a NaN lane never matches anything,
/// itself included. Integer kinds compare bytewise per lane, which is the
/// same comparison the native value would make.
pub(crate) fn lanes_equal(kind: ElementKind, a: &[u8], b: &[u8]) -> bool {
    match kind {
        ElementKind::F32 => lane_iter!(a, f32)
            .zip(lane_iter!(b, f32))
            .all(|(x, y)| x == y),
        ElementKind::F64 => lane_iter!(a, f64)
            .zip(lane_iter!(b, f64))
            .all(|(x, y)| x == y),
        _ => a
            .chunks_exact(kind.size())
            .zip(b.chunks_exact(kind.size()))
            .all(|(x, y)| x == y),
    }
}

/// Feeds every lane into `state` in index order.
///
/// Floating lanes hash their bit patterns, which keeps the hash structural
/// and total even for NaN payloads.
pub(crate) fn hash_lanes<H: Hasher>(kind: ElementKind, bytes: &[u8], state: &mut H) {
    match kind {
        ElementKind::I8 => {
            for lane in lane_iter!(bytes, i8) {
                lane.hash(state);
            }
        }
        ElementKind::I16 => {
            for lane in lane_iter!(bytes, i16) {
                lane.hash(state);
            }
        }
        ElementKind::I32 => {
            for lane in lane_iter!(bytes, i32) {
                lane.hash(state);
            }
        }
        ElementKind::I64 => {
            for lane in lane_iter!(bytes, i64) {
                lane.hash(state);
            }
        }
        ElementKind::U8 => {
            for lane in lane_iter!(bytes, u8) {
                lane.hash(state);
            }
        }
        ElementKind::U16 => {
            for lane in lane_iter!(bytes, u16) {
                lane.hash(state);
            }
        }
        ElementKind::U32 => {
            for lane in lane_iter!(bytes, u32) {
                lane.hash(state);
            }
        }
        ElementKind::U64 => {
            for lane in lane_iter!(bytes, u64) {
                lane.hash(state);
            }
        }
        ElementKind::F32 => {
            for lane in lane_iter!(bytes, f32) {
                lane.to_bits().hash(state);
            }
        }
        ElementKind::F64 => {
            for lane in lane_iter!(bytes, f64) {
                lane.to_bits().hash(state);
            }
        }
    }
}

macro_rules! push_lanes {
    ($out:expr, $bytes:expr, $sep:expr, $t:ty) => {{
        for (i, lane) in lane_iter!($bytes, $t).enumerate() {
            if i > 0 {
                $out.push_str($sep);
                $out.push(' ');
            }
            $out.push_str(&lane.to_string());
        }
    }};
}

/// Renders storage as `<e0, e1, …>`.
///
/// `separator` sits between lanes with a single trailing space, so the
/// default `","` yields `<1, 2, 3, 4>`.
pub(crate) fn format_lanes(kind: ElementKind, bytes: &[u8], separator: &str) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 4);
    out.push('<');
    match kind {
        ElementKind::I8 => push_lanes!(out, bytes, separator, i8),
        ElementKind::I16 => push_lanes!(out, bytes, separator, i16),
        ElementKind::I32 => push_lanes!(out, bytes, separator, i32),
        ElementKind::I64 => push_lanes!(out, bytes, separator, i64),
        ElementKind::U8 => push_lanes!(out, bytes, separator, u8),
        ElementKind::U16 => push_lanes!(out, bytes, separator, u16),
        ElementKind::U32 => push_lanes!(out, bytes, separator, u32),
        ElementKind::U64 => push_lanes!(out, bytes, separator, u64),
        ElementKind::F32 => push_lanes!(out, bytes, separator, f32),
        ElementKind::F64 => push_lanes!(out, bytes, separator, f64),
    }
    out.push('>');
    out
}

/// Expands the named reinterpretation views for one vector width.
///
/// Every view is a plain wrapper over `reinterpret`, so the bit contract
/// lives in exactly one place.
macro_rules! reinterpret_views {
    ($vector:ident) => {
        /// Views the same bits as signed 8-bit lanes.
        #[inline(always)]
        pub fn as_i8(&self) -> Result<$vector<i8>, VectorError> {
            self.reinterpret::<i8>()
        }

        /// Views the same bits as signed 16-bit lanes.
        #[inline(always)]
        pub fn as_i16(&self) -> Result<$vector<i16>, VectorError> {
            self.reinterpret::<i16>()
        }

        /// Views the same bits as signed 32-bit lanes.
        #[inline(always)]
        pub fn as_i32(&self) -> Result<$vector<i32>, VectorError> {
            self.reinterpret::<i32>()
        }

        /// Views the same bits as signed 64-bit lanes.
        #[inline(always)]
        pub fn as_i64(&self) -> Result<$vector<i64>, VectorError> {
            self.reinterpret::<i64>()
        }

        /// Views the same bits as unsigned 8-bit lanes.
        #[inline(always)]
        pub fn as_u8(&self) -> Result<$vector<u8>, VectorError> {
            self.reinterpret::<u8>()
        }

        /// Views the same bits as unsigned 16-bit lanes.
        #[inline(always)]
        pub fn as_u16(&self) -> Result<$vector<u16>, VectorError> {
            self.reinterpret::<u16>()
        }

        /// Views the same bits as unsigned 32-bit lanes.
        #[inline(always)]
        pub fn as_u32(&self) -> Result<$vector<u32>, VectorError> {
            self.reinterpret::<u32>()
        }

        /// Views the same bits as unsigned 64-bit lanes.
        #[inline(always)]
        pub fn as_u64(&self) -> Result<$vector<u64>, VectorError> {
            self.reinterpret::<u64>()
        }

        /// Views the same bits as 32-bit float lanes.
        #[inline(always)]
        pub fn as_f32(&self) -> Result<$vector<f32>, VectorError> {
            self.reinterpret::<f32>()
        }

        /// Views the same bits as 64-bit float lanes.
        #[inline(always)]
        pub fn as_f64(&self) -> Result<$vector<f64>, VectorError> {
            self.reinterpret::<f64>()
        }
    };
}

pub(crate) use reinterpret_views;
