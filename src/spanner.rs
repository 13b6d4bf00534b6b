//! Vectorized character-class matcher over fixed 16-byte windows.
//!
//! [`CharClassSpanner`] is the scanning primitive [`crate::parser::RowParser`]
//! drives: given a pointer known to have at least 16 readable bytes behind
//! it, return the offset of the first byte matching any of up to four
//! target bytes, or 16 if none match.

/// Matches up to four target bytes within a 16-byte window.
///
/// Zero is never treated as a target even if supplied, since the parser
/// configuration uses `0` to mean "no such character" (an unset escape
/// character). The constructor clears zero slots by replacing them with
/// the first non-zero target.
#[derive(Clone, Copy, Debug)]
pub struct CharClassSpanner {
    targets: [u8; 4],
}

impl CharClassSpanner {
    /// Builds a spanner for up to four target bytes. Duplicates and
    /// zero-padding are permitted.
    pub fn new(mut targets: [u8; 4]) -> Self {
        let fallback = targets.iter().copied().find(|&b| b != 0).unwrap_or(0);
        for t in targets.iter_mut() {
            if *t == 0 {
                *t = fallback;
            }
        }
        Self { targets }
    }

    /// Scans 16 bytes starting at `ptr` and returns the offset of the
    /// first matching byte, or 16 if none of the targets appear.
    ///
    /// # Safety
    ///
    /// The caller must guarantee that `ptr[0..16]` is readable. The bytes
    /// need not be meaningful data (this is exactly the tail-padding
    /// scenario `InputCursor` exists to provide).
    #[inline(always)]
    pub unsafe fn scan(&self, ptr: *const u8) -> usize {
        #[cfg(target_arch = "x86_64")]
        {
            scan_sse2(self.targets, ptr)
        }
        #[cfg(all(target_arch = "aarch64", target_feature = "neon"))]
        {
            scan_neon(self.targets, ptr)
        }
        #[cfg(not(any(
            target_arch = "x86_64",
            all(target_arch = "aarch64", target_feature = "neon")
        )))]
        {
            scan_scalar(self.targets, ptr)
        }
    }
}

#[cfg(target_arch = "x86_64")]
#[inline(always)]
unsafe fn scan_sse2(targets: [u8; 4], ptr: *const u8) -> usize {
    use core::arch::x86_64::{
        _mm_cmpeq_epi8, _mm_loadu_si128, _mm_movemask_epi8, _mm_or_si128, _mm_set1_epi8,
    };

    let chunk = _mm_loadu_si128(ptr as *const _);
    let mut matched = _mm_set1_epi8(0);
    for &t in &targets {
        let needle = _mm_set1_epi8(t as i8);
        matched = _mm_or_si128(matched, _mm_cmpeq_epi8(chunk, needle));
    }
    let mask = _mm_movemask_epi8(matched) as u32;
    if mask == 0 {
        16
    } else {
        mask.trailing_zeros() as usize
    }
}

#[cfg(all(target_arch = "aarch64", target_feature = "neon"))]
#[inline(always)]
unsafe fn scan_neon(targets: [u8; 4], ptr: *const u8) -> usize {
    use core::arch::aarch64::{vceqq_u8, vdupq_n_u8, vld1q_u8, vorrq_u8, vst1q_u8};

    let chunk = vld1q_u8(ptr);
    let mut matched = vdupq_n_u8(0);
    for &t in &targets {
        let needle = vdupq_n_u8(t);
        matched = vorrq_u8(matched, vceqq_u8(chunk, needle));
    }
    let mut lanes = [0u8; 16];
    vst1q_u8(lanes.as_mut_ptr(), matched);
    lanes.iter().position(|&b| b != 0).unwrap_or(16)
}

/// Scalar fallback: four-at-a-time scan against the (already zero-cleared)
/// target set. Used on architectures without a vectorized path above.
#[cfg(not(any(
    target_arch = "x86_64",
    all(target_arch = "aarch64", target_feature = "neon")
)))]
#[inline(always)]
unsafe fn scan_scalar(targets: [u8; 4], ptr: *const u8) -> usize {
    for i in 0..16 {
        let b = *ptr.add(i);
        if b == targets[0] || b == targets[1] || b == targets[2] || b == targets[3] {
            return i;
        }
    }
    16
}
