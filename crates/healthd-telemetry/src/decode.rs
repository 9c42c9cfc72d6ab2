//! Scalar decoders for attribute text
//!
//! Unit conversions are not applied here; samplers scale values at the call
//! site with [`microvolts_to_millivolts`] and [`tenths_to_celsius`].

use crate::error::ParseError;

/// Parse the leading integer of `text`.
///
/// Leading whitespace and one optional sign are accepted, and anything after
/// the digit run is ignored, so `"85\n"` and `"85 %"` both decode to 85.
pub fn decode_int(text: &str) -> Result<i32, ParseError> {
    let rest = text.trim_start();
    let (negative, digits) = match rest.as_bytes().first() {
        Some(b'-') => (true, &rest[1..]),
        Some(b'+') => (false, &rest[1..]),
        _ => (false, rest),
    };

    let run = digits.bytes().take_while(u8::is_ascii_digit).count();
    if run == 0 {
        return Err(ParseError::NotANumber(text.to_string()));
    }

    let mut value: i64 = 0;
    for digit in digits[..run].bytes() {
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(i64::from(digit - b'0')))
            .filter(|v| *v <= i64::from(i32::MAX) + 1)
            .ok_or_else(|| ParseError::OutOfRange(text.to_string()))?;
    }

    let value = if negative { -value } else { value };
    i32::try_from(value).map_err(|_| ParseError::OutOfRange(text.to_string()))
}

/// Online-style flag: true unless the trimmed text is exactly `"0"`
pub fn decode_bool_nonzero(text: &str) -> bool {
    text.trim() != "0"
}

/// Closed mapping from attribute labels to variants
pub type LabelTable<T> = [(&'static str, T)];

/// Map a categorical label onto a variant.
///
/// Exactly one trailing character (the newline the kernel appends) is dropped
/// before an exact, case-sensitive lookup. Unmatched labels yield `default`.
/// Callers must hand in non-empty text: `"X"` is compared as `""`.
pub fn decode_enum<T: Copy>(text: &str, table: &LabelTable<T>, default: T) -> T {
    let mut chars = text.chars();
    chars.next_back();
    let label = chars.as_str();

    table
        .iter()
        .find(|(candidate, _)| *candidate == label)
        .map(|(_, variant)| *variant)
        .unwrap_or(default)
}

/// Free-text attribute with its line terminator removed
pub fn decode_text(text: &str) -> String {
    text.trim_end_matches(['\n', '\r']).to_string()
}

/// µV to mV, truncating toward zero
pub fn microvolts_to_millivolts(microvolts: i32) -> i32 {
    microvolts / 1000
}

/// 0.1 °C to °C, truncating toward zero
pub fn tenths_to_celsius(tenths: i32) -> i32 {
    tenths / 10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Color {
        Red,
        Blue,
        Unknown,
    }

    const COLORS: &LabelTable<Color> = &[("Red", Color::Red), ("Blue", Color::Blue)];

    #[test]
    fn test_decode_int_plain() {
        assert_eq!(decode_int("85"), Ok(85));
        assert_eq!(decode_int("85\n"), Ok(85));
        assert_eq!(decode_int("  -1500000\n"), Ok(-1500000));
        assert_eq!(decode_int("+42"), Ok(42));
    }

    #[test]
    fn test_decode_int_trailing_garbage() {
        assert_eq!(decode_int("250 tenths"), Ok(250));
        assert_eq!(decode_int("12abc"), Ok(12));
    }

    #[test]
    fn test_decode_int_rejects_non_numeric() {
        assert_eq!(decode_int(""), Err(ParseError::NotANumber(String::new())));
        assert!(matches!(decode_int("abc"), Err(ParseError::NotANumber(_))));
        assert!(matches!(decode_int("-"), Err(ParseError::NotANumber(_))));
        assert!(matches!(decode_int("- 5"), Err(ParseError::NotANumber(_))));
    }

    #[test]
    fn test_decode_int_bounds() {
        assert_eq!(decode_int("2147483647"), Ok(i32::MAX));
        assert_eq!(decode_int("-2147483648"), Ok(i32::MIN));
        assert!(matches!(
            decode_int("2147483648"),
            Err(ParseError::OutOfRange(_))
        ));
        assert!(matches!(
            decode_int("99999999999999999999999"),
            Err(ParseError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_decode_bool_nonzero() {
        assert!(!decode_bool_nonzero("0"));
        assert!(!decode_bool_nonzero("0\n"));
        assert!(decode_bool_nonzero("1"));
        assert!(decode_bool_nonzero("1\n"));
        assert!(decode_bool_nonzero(""));
    }

    #[test]
    fn test_decode_enum_strips_one_character() {
        assert_eq!(decode_enum("Red\n", COLORS, Color::Unknown), Color::Red);
        assert_eq!(decode_enum("Blue\n", COLORS, Color::Unknown), Color::Blue);
        // Without a newline the last letter is lost
        assert_eq!(decode_enum("Red", COLORS, Color::Unknown), Color::Unknown);
        assert_eq!(decode_enum("Red\n\n", COLORS, Color::Unknown), Color::Unknown);
    }

    #[test]
    fn test_decode_enum_fallback() {
        assert_eq!(decode_enum("", COLORS, Color::Unknown), Color::Unknown);
        assert_eq!(decode_enum("\n", COLORS, Color::Unknown), Color::Unknown);
        assert_eq!(decode_enum("red\n", COLORS, Color::Unknown), Color::Unknown);
    }

    #[test]
    fn test_decode_text() {
        assert_eq!(decode_text("Li-ion\n"), "Li-ion");
        assert_eq!(decode_text("Li-poly"), "Li-poly");
    }

    #[test]
    fn test_unit_conversions() {
        assert_eq!(microvolts_to_millivolts(3_700_000), 3700);
        assert_eq!(microvolts_to_millivolts(3_700_999), 3700);
        assert_eq!(tenths_to_celsius(255), 25);
        assert_eq!(tenths_to_celsius(-55), -5);
    }
}
