//! Defensive numeric handling for form-edited fields.
//!
//! Every numeric input path in the engine is total: unparseable text
//! coerces to 0 and a zero denominator yields a zero ratio, so `NaN`
//! and `Infinity` never reach a computed total.

/// Parse a user-entered numeric field, coercing anything unparseable to 0.
///
/// Currency formatting characters (`$`, `,`, surrounding whitespace) are
/// stripped before parsing. Non-finite results also coerce to 0.
pub fn parse_or_zero(raw: &str) -> f64 {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// `numerator / denominator × 100`, defined as 0 when the denominator
/// is 0.
pub fn pct_of(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator * 100.0
    }
}

/// Is a percentage field inside the valid [0, 100] band?
pub fn valid_pct(value: f64) -> bool {
    (0.0..=100.0).contains(&value)
}
