//! Numeric primitives shared by every aggregator.
//!
//! All functions accept empty input and report it as `None` (or `0.0` where a
//! neutral value exists) instead of panicking or producing NaN.

// ---------------------------------------------------------------------------
// Basic statistics
// ---------------------------------------------------------------------------

pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(sum(values) / values.len() as f64)
}

/// Median; the two central elements are averaged for even lengths.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// `(min, max)` in one pass.
pub fn extent(values: &[f64]) -> Option<(f64, f64)> {
    let (&first, rest) = values.split_first()?;
    Some(
        rest.iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}

/// Element of an ascending slice at index `floor(fraction * n)`, clamped to the last element.
pub fn value_at_fraction(sorted: &[f64], fraction: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let idx = (sorted.len() as f64 * fraction).floor() as usize;
    Some(sorted[idx.min(sorted.len() - 1)])
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Pearson correlation of two aligned series.
///
/// Zero variance in either series gives `0.0`, as does empty or mismatched
/// input. The result is clamped to `[-1, 1]`.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() {
        log::warn!(
            "pearson called with misaligned series ({} vs {})",
            x.len(),
            y.len()
        );
        return 0.0;
    }
    if x.is_empty() {
        return 0.0;
    }

    let n = x.len() as f64;
    let (mut sx, mut sy, mut sxy, mut sx2, mut sy2) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for (&a, &b) in x.iter().zip(y) {
        sx += a;
        sy += b;
        sxy += a * b;
        sx2 += a * a;
        sy2 += b * b;
    }

    let numerator = n * sxy - sx * sy;
    let var_x = n * sx2 - sx * sx;
    let var_y = n * sy2 - sy * sy;
    // Cancellation can leave a tiny negative "variance" for constant input.
    if var_x <= 0.0 || var_y <= 0.0 {
        return 0.0;
    }
    let denominator = (var_x * var_y).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    (numerator / denominator).clamp(-1.0, 1.0)
}

/// Split `(x, y)` pairs into two aligned series.
pub fn unzip_pairs(pairs: &[(f64, f64)]) -> (Vec<f64>, Vec<f64>) {
    pairs.iter().copied().unzip()
}
