//! Best-effort numeric coercion for stored values.
//!
//! Historical records were imported from spreadsheets, so columns that are
//! numeric in spirit regularly hold blanks, placeholders like `"n/a"`, or
//! other free text. These helpers are total: anything that does not parse
//! cleanly becomes `None` and the caller carries on.
//!
//! Floats follow a plain decimal grammar (optional sign, digits, at most one
//! decimal point, at least one digit; no exponent, no `inf`/`nan`). The
//! store's numeric range filter applies the same rule in SQL, so a value is
//! either numeric on both paths or on neither.

/// Whitespace stripped before parsing. Matches the character set the SQL
/// range filter passes to `TRIM`.
const TRIMMED: [char; 5] = [' ', '\t', '\n', '\x0C', '\r'];

fn trimmed(raw: &str) -> Option<&str> {
    let trimmed = raw.trim_matches(TRIMMED);
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Returns `true` if `s` is a plain decimal: an optional `+`/`-`, then
/// digits with at most one `.`, and at least one digit overall.
#[must_use]
pub fn is_plain_decimal(s: &str) -> bool {
    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    unsigned.bytes().any(|b| b.is_ascii_digit())
        && unsigned.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        && unsigned.bytes().filter(|&b| b == b'.').count() <= 1
}

/// Parses a raw stored value as a base-10 integer.
///
/// Returns `None` for `None`, empty (or whitespace-only) text, and anything
/// that fails to parse.
#[must_use]
pub fn coerce_int(raw: Option<&str>) -> Option<i64> {
    trimmed(raw?)?.parse().ok()
}

/// Parses a raw stored value as a floating-point number.
///
/// Same contract as [`coerce_int`], restricted to [`is_plain_decimal`]
/// text, so exponents, `NaN` and infinities are all rejected.
#[must_use]
pub fn coerce_float(raw: Option<&str>) -> Option<f64> {
    let trimmed = trimmed(raw?)?;
    if !is_plain_decimal(trimmed) {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}
