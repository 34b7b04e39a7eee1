// crates/gifer-ui/src/helpers/format.rs
//
// Text <-> number conversion for the parameter fields.
//
// Time formatting lives in gifer_core::helpers::time; this module only deals
// with what the user sees and types in the numeric text boxes.

use std::num::ParseFloatError;

/// Render a field value with at most two decimals and no trailing zeros.
///
/// ```ignore
/// assert_eq!(format_number(640.0), "640");
/// assert_eq!(format_number(853.3333), "853.33");
/// ```
pub fn format_number(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".into() } else { s.to_string() }
}

/// The model value as field text, empty for `None`.
pub fn format_optional(v: Option<f64>) -> String {
    v.map(format_number).unwrap_or_default()
}

/// Parse what the user typed. Blank means "unset".
pub fn parse_field(text: &str) -> Result<Option<f64>, ParseFloatError> {
    let t = text.trim();
    if t.is_empty() {
        return Ok(None);
    }
    t.parse::<f64>().map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_numbers_have_no_decimals() {
        assert_eq!(format_number(640.0), "640");
        assert_eq!(format_number(0.0), "0");
    }

    #[test]
    fn fractions_keep_two_places_at_most() {
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(853.3333), "853.33");
        assert_eq!(format_number(9.999), "10");
    }

    #[test]
    fn optional_none_is_blank() {
        assert_eq!(format_optional(None), "");
        assert_eq!(format_optional(Some(1.25)), "1.25");
    }

    #[test]
    fn blank_parses_to_none() {
        assert_eq!(parse_field("  "), Ok(None));
        assert_eq!(parse_field(" 12.5 "), Ok(Some(12.5)));
        assert!(parse_field("abc").is_err());
    }
}
