use serde::{Deserialize, Serialize};

/// A raw cell value as delivered by the loader.
///
/// Loaders keep cells as text; the numeric interpretation happens at
/// analysis time through [`as_number`](Self::as_number), so identifiers such
/// as `"01001"` keep their leading zeros when used as join keys.
#[derive(
    Debug,
    Default,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
#[serde(untagged)]
pub enum RawValue {
    #[display("{_0}")]
    Number(f64),
    #[display("{_0}")]
    Text(String),
    #[default]
    #[display("")]
    Missing,
}

impl RawValue {
    /// Reads the value as a finite number.
    ///
    /// Text is parsed leniently: leading whitespace is skipped and the longest
    /// numeric prefix is used (`"12.5 km"` reads as `12.5`). Text without a
    /// numeric prefix, missing cells and non-finite numbers read as `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use aed_data::value::RawValue;
    ///
    /// assert_eq!(RawValue::from("  42").as_number(), Some(42.0));
    /// assert_eq!(RawValue::from("3.5e2 people").as_number(), Some(350.0));
    /// assert_eq!(RawValue::from("Texas").as_number(), None);
    /// assert_eq!(RawValue::Missing.as_number(), None);
    /// ```
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value).filter(|v| v.is_finite()),
            Self::Text(text) => parse_leading_number(text),
            Self::Missing => None,
        }
    }

    /// Normalizes the value into a join key.
    ///
    /// Keys are compared as strings, never as numbers: text is trimmed and
    /// kept verbatim, numbers use their shortest display form (`6.0` becomes
    /// `"6"`). Missing cells, blank text and non-finite numbers have no key.
    ///
    /// # Examples
    ///
    /// ```
    /// use aed_data::value::RawValue;
    ///
    /// assert_eq!(RawValue::from(" 06 ").as_key().as_deref(), Some("06"));
    /// assert_eq!(RawValue::Number(6.0).as_key().as_deref(), Some("6"));
    /// assert_eq!(RawValue::from("").as_key(), None);
    /// ```
    #[must_use]
    pub fn as_key(&self) -> Option<String> {
        match self {
            Self::Number(value) if value.is_finite() => Some(value.to_string()),
            Self::Text(text) => {
                let text = text.trim();
                (!text.is_empty()).then(|| text.to_owned())
            }
            Self::Number(_) | Self::Missing => None,
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T> From<Option<T>> for RawValue
where
    T: Into<RawValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Missing, Into::into)
    }
}

/// Parses the longest numeric prefix of `text`.
///
/// Accepts an optional sign, digits with an optional fraction, and an
/// optional exponent that is only consumed when followed by digits.
#[must_use]
pub fn parse_leading_number(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    text[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_numbers() {
        assert_eq!(parse_leading_number("0"), Some(0.0));
        assert_eq!(parse_leading_number("-17"), Some(-17.0));
        assert_eq!(parse_leading_number("+2.25"), Some(2.25));
        assert_eq!(parse_leading_number(".5"), Some(0.5));
        assert_eq!(parse_leading_number("1e3"), Some(1000.0));
        assert_eq!(parse_leading_number("1E-2"), Some(0.01));
    }

    #[test]
    fn test_parse_prefix() {
        assert_eq!(parse_leading_number("12abc"), Some(12.0));
        assert_eq!(parse_leading_number("5."), Some(5.0));
        assert_eq!(parse_leading_number("7e"), Some(7.0));
        assert_eq!(parse_leading_number("7e+"), Some(7.0));
        assert_eq!(parse_leading_number("1,234"), Some(1.0));
        assert_eq!(parse_leading_number("\t 9 "), Some(9.0));
    }

    #[test]
    fn test_parse_rejects() {
        assert_eq!(parse_leading_number(""), None);
        assert_eq!(parse_leading_number("   "), None);
        assert_eq!(parse_leading_number("-"), None);
        assert_eq!(parse_leading_number("."), None);
        assert_eq!(parse_leading_number("abc"), None);
        assert_eq!(parse_leading_number("NaN"), None);
        assert_eq!(parse_leading_number("inf"), None);
        assert_eq!(parse_leading_number("1e999"), None);
    }

    #[test]
    fn test_number_keys_have_no_fraction() {
        assert_eq!(RawValue::Number(25025.0).as_key().as_deref(), Some("25025"));
        assert_eq!(RawValue::Number(1.5).as_key().as_deref(), Some("1.5"));
        assert_eq!(RawValue::Number(f64::NAN).as_key(), None);
    }

    #[test]
    fn test_leading_zeros_are_kept() {
        let key = RawValue::from("01").as_key().unwrap();
        assert_eq!(key, "01");
        assert_ne!(key, RawValue::Number(1.0).as_key().unwrap());
    }

    #[test]
    fn test_display() {
        assert_eq!(RawValue::Number(2.5).to_string(), "2.5");
        assert_eq!(RawValue::from("x").to_string(), "x");
        assert_eq!(RawValue::Missing.to_string(), "");
    }

    #[test]
    fn test_deserialize_untagged() {
        let values: Vec<RawValue> = serde_json::from_str(r#"[1.5, "a", null]"#).unwrap();
        assert_eq!(
            values,
            vec![RawValue::Number(1.5), RawValue::from("a"), RawValue::Missing]
        );
    }
}
