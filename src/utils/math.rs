//! Shared numeric helpers for score post-processing.

/// Round to 3 decimal places, the precision used for reported scores.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Map a probability in [0, 1] to a signed score in [-1, 1].
///
/// Out-of-range and NaN probabilities are clamped to the nearest valid value
/// (NaN maps to 0.5, i.e. a zero score).
pub fn probability_to_signed(probability: f64) -> f64 {
    let p = if probability.is_nan() {
        0.5
    } else {
        probability.clamp(0.0, 1.0)
    };
    (p - 0.5) * 2.0
}
