//! Primitive evaluations of a sampled signal at arbitrary timestamps.
//!
//! All functions take the source axis `xp` (non-decreasing microsecond
//! ticks) with its values `fp`, and return one value per target timestamp.
//! Lookups use binary search on `xp`; targets need not be sorted.
//!
//! An empty source yields `NaN` for every target.

/// Index of the first source sample strictly after `target`.
fn upper_bound(xp: &[i64], target: i64) -> usize {
    xp.partition_point(|&t| t <= target)
}

/// Index of the first source sample at or after `target`.
fn lower_bound(xp: &[i64], target: i64) -> usize {
    xp.partition_point(|&t| t < target)
}

/// Piecewise-linear interpolation.
///
/// Targets before the first sample take the first value, targets after the
/// last sample take the last value. Where the source repeats a timestamp,
/// the last sample at that timestamp wins.
pub fn linear(targets: &[i64], xp: &[i64], fp: &[f64]) -> Vec<f64> {
    debug_assert_eq!(xp.len(), fp.len());
    if xp.is_empty() {
        return vec![f64::NAN; targets.len()];
    }

    let last = xp.len() - 1;
    targets
        .iter()
        .map(|&target| {
            let hi = upper_bound(xp, target);
            if hi == 0 {
                return fp[0];
            }
            if hi > last {
                return fp[last];
            }
            let lo = hi - 1;
            if xp[lo] == target {
                return fp[lo];
            }
            // xp[lo] < target < xp[hi]
            let frac = (target - xp[lo]) as f64 / (xp[hi] - xp[lo]) as f64;
            fp[lo] + (fp[hi] - fp[lo]) * frac
        })
        .collect()
}

/// Previous-value hold: the most recent source value at or before each
/// target. Targets before the first sample take the first value.
pub fn hold(targets: &[i64], xp: &[i64], fp: &[f64]) -> Vec<f64> {
    debug_assert_eq!(xp.len(), fp.len());
    if xp.is_empty() {
        return vec![f64::NAN; targets.len()];
    }

    targets
        .iter()
        .map(|&target| match upper_bound(xp, target) {
            0 => fp[0],
            idx => fp[idx - 1],
        })
        .collect()
}

/// Block mean over the right-open buckets `[targets[i], targets[i + 1])`.
///
/// The first bucket also absorbs samples before `targets[0]`; the last
/// bucket is open-ended. An empty bucket repeats the last source value seen
/// before it, or the first source value when nothing precedes it.
/// `targets` must be non-decreasing.
pub fn bucket_mean(targets: &[i64], xp: &[i64], fp: &[f64]) -> Vec<f64> {
    debug_assert_eq!(xp.len(), fp.len());
    if xp.is_empty() {
        return vec![f64::NAN; targets.len()];
    }

    let n = targets.len();
    let mut out = Vec::with_capacity(n);
    let mut start = 0usize;
    for i in 0..n {
        let end = if i + 1 == n {
            xp.len()
        } else {
            lower_bound(xp, targets[i + 1]).max(start)
        };

        if end > start {
            let bucket = &fp[start..end];
            out.push(bucket.iter().sum::<f64>() / bucket.len() as f64);
        } else if start > 0 {
            out.push(fp[start - 1]);
        } else {
            out.push(fp[0]);
        }
        start = end;
    }
    out
}
