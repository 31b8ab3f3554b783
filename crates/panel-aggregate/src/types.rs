use serde::Serialize;

/// Percentage with the zero-denominator guard: `0.0` when `denominator`
/// is zero, never NaN or infinite.
pub fn percentage(numerator: i64, denominator: i64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64 * 100.0
    }
}

/// Diagnostic for a row excluded from month grouping because its date
/// parsed in neither accepted form. Surfaced as data so callers can
/// inspect the skip set instead of relying on log side effects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    /// Index of the row in the input slice.
    pub index: usize,
    pub company_code: i64,
    pub raw_date: String,
}
