//! Runtime capability queries for the accelerated operation paths.
//!
//! Each query wraps the standard library's feature detection macros. The
//! macros resolve against the running machine and their answer never changes
//! for the process lifetime, so callers read them at the call site without
//! any extra caching.

/// True when a 128-bit packed compare is available on the active target.
#[inline(always)]
pub fn packed_compare_128() -> bool {
    #[cfg(target_arch = "x86_64")]
    {
        is_x86_feature_detected!("sse2")
    }
    #[cfg(target_arch = "aarch64")]
    {
        std::arch::is_aarch64_feature_detected!("neon")
    }
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        false
    }
}

/// True when a full-width 256-bit packed integer compare is available.
///
/// aarch64 reports false here; 256-bit work there goes through two 128-bit
/// halves instead.
#[inline(always)]
pub fn packed_compare_256_int() -> bool {
    #[cfg(target_arch = "x86_64")]
    {
        is_x86_feature_detected!("avx2")
    }
    #[cfg(not(target_arch = "x86_64"))]
    {
        false
    }
}

/// True when a full-width 256-bit packed float compare is available.
#[inline(always)]
pub fn packed_compare_256_float() -> bool {
    #[cfg(target_arch = "x86_64")]
    {
        is_x86_feature_detected!("avx")
    }
    #[cfg(not(target_arch = "x86_64"))]
    {
        false
    }
}
