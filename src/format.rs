//! Display formatting for durations and view counts.

use serde_json::Number;
use thiserror::Error;

/// Raised when a duration cannot be shown: negative, fractional or not a
/// number at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid video duration: {input}")]
pub struct InvalidDurationError {
    input: String,
}

impl InvalidDurationError {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }
}

/// Renders durations as `H:MM:SS` or `M:SS` for short clips.
pub fn format_duration(total_seconds: i64) -> Result<String, InvalidDurationError> {
    if total_seconds < 0 {
        return Err(InvalidDurationError::new(total_seconds.to_string()));
    }

    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        Ok(format!("{hours}:{minutes:02}:{seconds:02}"))
    } else {
        Ok(format!("{minutes}:{seconds:02}"))
    }
}

/// Inserts `,` every three digits from the right in each run of ASCII digits.
pub fn group_thousands(text: &str) -> String {
    let mut grouped = String::with_capacity(text.len() + text.len() / 3);
    let mut rest = text;

    while let Some(start) = rest.find(|c: char| c.is_ascii_digit()) {
        grouped.push_str(&rest[..start]);
        let run = &rest[start..];
        let end = run.find(|c: char| !c.is_ascii_digit()).unwrap_or(run.len());
        let digits = &run[..end];
        for (i, digit) in digits.char_indices() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }
        rest = &run[end..];
    }

    grouped.push_str(rest);
    grouped
}

/// Decimal text of a JSON count. Integral floats such as `1234.0` lose the
/// fraction; counts beyond `i64` keep all their digits.
pub fn count_digits(count: &Number) -> String {
    if count.is_f64()
        && let Some(value) = count.as_f64()
        && value.is_finite()
        && value.fract() == 0.0
    {
        return format!("{value:.0}");
    }
    count.to_string()
}

/// Textual view count fallbacks. The two upstreams pre-format differently,
/// so they are cleaned differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewCountText<'a> {
    /// Proxy `viewCountText`, e.g. `"1,234 views"`: the suffix is dropped and
    /// the digits are kept exactly as sent.
    Suffixed(&'a str),
    /// Local `view_count`, already comma-grouped: commas are stripped and the
    /// digits regrouped.
    Grouped(&'a str),
}

const VIEWS_SUFFIX: &str = " views";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewCountDisplay {
    pub display: String,
    pub hidden: bool,
}

impl ViewCountDisplay {
    fn shown(display: String) -> Self {
        let hidden = display.is_empty();
        Self { display, hidden }
    }

    fn hidden() -> Self {
        Self {
            display: String::new(),
            hidden: true,
        }
    }
}

/// Picks the numeric count when known, otherwise the textual fallback,
/// otherwise hides the views entirely.
pub fn format_view_count(
    numeric: Option<&Number>,
    text: Option<ViewCountText<'_>>,
) -> ViewCountDisplay {
    if let Some(count) = numeric {
        return ViewCountDisplay::shown(group_thousands(&count_digits(count)));
    }

    match text {
        Some(ViewCountText::Suffixed(text)) => {
            ViewCountDisplay::shown(text.replacen(VIEWS_SUFFIX, "", 1))
        }
        Some(ViewCountText::Grouped(text)) => {
            ViewCountDisplay::shown(group_thousands(&text.replace(',', "")))
        }
        None => ViewCountDisplay::hidden(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shown(display: &str) -> ViewCountDisplay {
        ViewCountDisplay {
            display: display.to_owned(),
            hidden: false,
        }
    }

    #[test]
    fn format_duration_known_values() {
        assert_eq!(format_duration(0).unwrap(), "0:00");
        assert_eq!(format_duration(45).unwrap(), "0:45");
        assert_eq!(format_duration(125).unwrap(), "2:05");
        assert_eq!(format_duration(600).unwrap(), "10:00");
        assert_eq!(format_duration(3600).unwrap(), "1:00:00");
        assert_eq!(format_duration(3661).unwrap(), "1:01:01");
        assert_eq!(format_duration(7325).unwrap(), "2:02:05");
        assert_eq!(format_duration(36_000 * 3).unwrap(), "30:00:00");
    }

    #[test]
    fn format_duration_rejects_negative() {
        let err = format_duration(-1).unwrap_err();
        assert_eq!(err.input(), "-1");
    }

    #[test]
    fn format_duration_parts_rebuild_input() {
        for total in (0..20_000).chain([86_399, 86_400, 1_000_000]) {
            let text = format_duration(total).unwrap();
            let parts: Vec<&str> = text.split(':').collect();
            assert!(parts.len() == 2 || parts.len() == 3, "{text}");
            assert_eq!(parts.last().unwrap().len(), 2, "{text}");
            if parts.len() == 3 {
                assert_eq!(parts[1].len(), 2, "{text}");
            } else {
                assert!(parts[0].len() <= 2, "{text}");
            }
            let rebuilt = parts
                .iter()
                .fold(0_i64, |acc, part| acc * 60 + part.parse::<i64>().unwrap());
            assert_eq!(rebuilt, total);
        }
    }

    #[test]
    fn group_thousands_handles_boundaries() {
        assert_eq!(group_thousands("0"), "0");
        assert_eq!(group_thousands("999"), "999");
        assert_eq!(group_thousands("1000"), "1,000");
        assert_eq!(group_thousands("123456"), "123,456");
        assert_eq!(group_thousands("-1234567"), "-1,234,567");
        assert_eq!(group_thousands(""), "");
    }

    #[test]
    fn view_count_prefers_numeric() {
        assert_eq!(
            format_view_count(Some(&Number::from(1_234_567)), None),
            shown("1,234,567")
        );
        assert_eq!(
            format_view_count(
                Some(&Number::from(1000)),
                Some(ViewCountText::Suffixed("5 views"))
            ),
            shown("1,000")
        );
        assert_eq!(format_view_count(Some(&Number::from(0)), None), shown("0"));
    }

    #[test]
    fn view_count_accepts_any_integral_number() {
        let float = Number::from_f64(1234.0).unwrap();
        assert_eq!(format_view_count(Some(&float), None), shown("1,234"));
        let huge = Number::from(10_000_000_000_000_000_000_u64);
        assert_eq!(
            format_view_count(Some(&huge), None),
            shown("10,000,000,000,000,000,000")
        );
        assert_eq!(count_digits(&Number::from(-42)), "-42");
    }

    #[test]
    fn view_count_text_fallbacks() {
        assert_eq!(
            format_view_count(None, Some(ViewCountText::Suffixed("1,234 views"))),
            shown("1,234")
        );
        // Proxy text is passed through without regrouping.
        assert_eq!(
            format_view_count(None, Some(ViewCountText::Suffixed("1234 views"))),
            shown("1234")
        );
        assert_eq!(
            format_view_count(None, Some(ViewCountText::Grouped("12,34,567"))),
            shown("1,234,567")
        );
        assert_eq!(
            format_view_count(None, Some(ViewCountText::Grouped("1000"))),
            shown("1,000")
        );
    }

    #[test]
    fn view_count_hidden_without_data() {
        let hidden = format_view_count(None, None);
        assert_eq!(hidden.display, "");
        assert!(hidden.hidden);

        let empty = format_view_count(None, Some(ViewCountText::Suffixed(" views")));
        assert!(empty.hidden);
        assert!(empty.display.is_empty());
    }
}
