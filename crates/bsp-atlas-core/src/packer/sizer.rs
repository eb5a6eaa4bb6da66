use crate::sprite::Extent;

/// Side of the square canvas for a set of items.
///
/// `ceil(sqrt(total area))`, but never less than the largest single width or height, so
/// the biggest item always fits on an empty page. Returns 0 for an empty set. The area
/// total saturates, so the side is capped at `u32::MAX`.
pub fn estimate_canvas_size<S: Extent>(items: &[S]) -> u32 {
    let mut area_sum = 0u64;
    let mut max_len = 0u32;
    for item in items {
        let (w, h) = (item.width(), item.height());
        area_sum = area_sum.saturating_add(w as u64 * h as u64);
        max_len = max_len.max(w.max(h));
    }
    let side = ceil_sqrt(area_sum).min(u32::MAX as u64) as u32;
    side.max(max_len)
}

/// Smallest `s` with `s * s >= n`.
pub(crate) fn ceil_sqrt(n: u64) -> u64 {
    if n == 0 {
        return 0;
    }
    let mut s = (n as f64).sqrt() as u64;
    while s.saturating_mul(s) < n {
        s += 1;
    }
    while s > 0 && (s - 1).saturating_mul(s - 1) >= n {
        s -= 1;
    }
    s
}
