//! Useful functions.

/// Return the median of `xs`. For an even number of values, it is the floor of the mean of the two middle values.
/// `xs` is sorted in place. Return None if `xs` is empty.
pub fn floor_median(xs: &mut [u64]) -> Option<u64> {
    if xs.is_empty() {
        return None;
    }
    xs.sort_unstable();
    let len = xs.len();
    match len % 2 {
        1 => Some(xs[len / 2]),
        _ => {
            let (low, high) = (xs[len / 2 - 1], xs[len / 2]);
            // (low + high) / 2 without overflow.
            Some(low / 2 + high / 2 + (low % 2 + high % 2) / 2)
        }
    }
}

/// The length of the intersection of two half-open intervals.
pub fn intersection((s1, e1): (u64, u64), (s2, e2): (u64, u64)) -> u64 {
    e1.min(e2).saturating_sub(s1.max(s2))
}

/// min(intersection/len1, intersection/len2). Zero if either interval has zero length.
pub fn reciprocal_overlap(x: (u64, u64), y: (u64, u64)) -> f64 {
    let (len_x, len_y) = (x.1 - x.0, y.1 - y.0);
    if len_x == 0 || len_y == 0 {
        return 0f64;
    }
    let inter = intersection(x, y) as f64;
    (inter / len_x as f64).min(inter / len_y as f64)
}

/// The distance between two intervals. Zero if they intersect.
pub fn gap(x: (u64, u64), y: (u64, u64)) -> u64 {
    if 0 < intersection(x, y) {
        0
    } else {
        x.0.saturating_sub(y.1).max(y.0.saturating_sub(x.1))
    }
}
