//! Publish-time localization.
//!
//! The listing never renders publish times itself. It hands the raw upstream
//! text plus the caller's labels to a [`PublishTimeLocalizer`] and stores
//! whatever comes back. [`TemplateLocalizer`] is the stock implementation.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use thiserror::Error;

/// Display strings for each time unit, keyed the way locale files name them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct TimeUnitLabels {
    pub year: String,
    pub years: String,
    pub month: String,
    pub months: String,
    pub week: String,
    pub weeks: String,
    pub day: String,
    pub days: String,
    pub hour: String,
    pub hours: String,
    pub minute: String,
    pub minutes: String,
    pub second: String,
    pub seconds: String,
}

impl Default for TimeUnitLabels {
    fn default() -> Self {
        Self {
            year: "year".into(),
            years: "years".into(),
            month: "month".into(),
            months: "months".into(),
            week: "week".into(),
            weeks: "weeks".into(),
            day: "day".into(),
            days: "days".into(),
            hour: "hour".into(),
            hours: "hours".into(),
            minute: "minute".into(),
            minutes: "minutes".into(),
            second: "second".into(),
            seconds: "seconds".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeUnit {
    Year,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
}

impl TimeUnit {
    /// Matches on the first two letters, which is enough to tell the English
    /// unit names apart (`se`, `mi`, `ho`, ...).
    fn from_word(word: &str) -> Option<Self> {
        let prefix: String = word.chars().take(2).collect::<String>().to_lowercase();
        match prefix.as_str() {
            "se" => Some(TimeUnit::Second),
            "mi" => Some(TimeUnit::Minute),
            "ho" => Some(TimeUnit::Hour),
            "da" => Some(TimeUnit::Day),
            "we" => Some(TimeUnit::Week),
            "mo" => Some(TimeUnit::Month),
            "ye" => Some(TimeUnit::Year),
            _ => None,
        }
    }
}

impl TimeUnitLabels {
    fn label(&self, unit: TimeUnit, singular: bool) -> &str {
        match (unit, singular) {
            (TimeUnit::Year, true) => &self.year,
            (TimeUnit::Year, false) => &self.years,
            (TimeUnit::Month, true) => &self.month,
            (TimeUnit::Month, false) => &self.months,
            (TimeUnit::Week, true) => &self.week,
            (TimeUnit::Week, false) => &self.weeks,
            (TimeUnit::Day, true) => &self.day,
            (TimeUnit::Day, false) => &self.days,
            (TimeUnit::Hour, true) => &self.hour,
            (TimeUnit::Hour, false) => &self.hours,
            (TimeUnit::Minute, true) => &self.minute,
            (TimeUnit::Minute, false) => &self.minutes,
            (TimeUnit::Second, true) => &self.second,
            (TimeUnit::Second, false) => &self.seconds,
        }
    }
}

/// Everything a localizer needs besides the raw text: the sentence template
/// (`$` is the amount, `%` the unit), unit labels and the live/upcoming labels.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PublicationStrings {
    pub template: String,
    pub units: TimeUnitLabels,
    pub live: String,
    pub upcoming: String,
}

impl Default for PublicationStrings {
    fn default() -> Self {
        Self {
            template: "$ % ago".into(),
            units: TimeUnitLabels::default(),
            live: "watching".into(),
            upcoming: "Premieres on".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishTimeRequest {
    pub publish_text: String,
    pub template: String,
    pub units: TimeUnitLabels,
    pub live_label: String,
    pub upcoming_label: String,
    pub is_live: bool,
    pub is_upcoming: bool,
}

impl PublishTimeRequest {
    pub fn new(
        publish_text: impl Into<String>,
        is_live: bool,
        is_upcoming: bool,
        strings: &PublicationStrings,
    ) -> Self {
        Self {
            publish_text: publish_text.into(),
            template: strings.template.clone(),
            units: strings.units.clone(),
            live_label: strings.live.clone(),
            upcoming_label: strings.upcoming.clone(),
            is_live,
            is_upcoming,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not localize publish time {publish_text:?}: {reason}")]
pub struct PublishTimeResolutionError {
    pub publish_text: String,
    pub reason: String,
}

impl PublishTimeResolutionError {
    pub fn new(publish_text: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            publish_text: publish_text.into(),
            reason: reason.into(),
        }
    }
}

/// Turns raw publish text into the string shown under a list entry.
#[async_trait]
pub trait PublishTimeLocalizer: Send + Sync {
    async fn localize(
        &self,
        request: PublishTimeRequest,
    ) -> Result<String, PublishTimeResolutionError>;
}

/// Builds the request for one record and asks the localizer for the text.
pub async fn resolve_publish_time(
    localizer: &dyn PublishTimeLocalizer,
    publish_text: &str,
    is_live: bool,
    is_upcoming: bool,
    strings: &PublicationStrings,
) -> Result<String, PublishTimeResolutionError> {
    localizer
        .localize(PublishTimeRequest::new(
            publish_text,
            is_live,
            is_upcoming,
            strings,
        ))
        .await
}

/// Renders relative phrases (`"3 days ago"`) and absolute dates through the
/// request's template. Unknown phrasing is returned untouched.
#[derive(Debug, Clone, Default)]
pub struct TemplateLocalizer {
    now: Option<DateTime<Utc>>,
}

impl TemplateLocalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins the reference time used for absolute dates.
    pub fn with_now(now: DateTime<Utc>) -> Self {
        Self { now: Some(now) }
    }

    fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }

    fn render(&self, request: &PublishTimeRequest) -> Result<String, PublishTimeResolutionError> {
        if request.is_live {
            return Ok(format!("0 {}", request.live_label));
        }
        if request.is_upcoming {
            return Ok(format!(
                "{}: {}",
                request.upcoming_label, request.publish_text
            ));
        }

        let text = request.publish_text.trim();
        if text.is_empty() {
            return Err(PublishTimeResolutionError::new(
                &request.publish_text,
                "empty publish text",
            ));
        }

        if let Some((amount, unit)) = parse_relative(text) {
            return Ok(fill_template(request, &amount, unit));
        }

        if let Some(published) = parse_absolute(text) {
            let (amount, unit) = largest_unit(self.now(), published);
            return Ok(fill_template(request, &amount.to_string(), unit));
        }

        Ok(request.publish_text.clone())
    }
}

#[async_trait]
impl PublishTimeLocalizer for TemplateLocalizer {
    async fn localize(
        &self,
        request: PublishTimeRequest,
    ) -> Result<String, PublishTimeResolutionError> {
        self.render(&request)
    }
}

fn fill_template(request: &PublishTimeRequest, amount: &str, unit: TimeUnit) -> String {
    let label = request.units.label(unit, amount == "1");
    request
        .template
        .replacen('$', amount, 1)
        .replacen('%', label, 1)
}

/// Reads `"<n> <unit> ago"`, tolerating a leading `"Streamed"`.
fn parse_relative(text: &str) -> Option<(String, TimeUnit)> {
    let mut words = text.split_whitespace().peekable();
    if words
        .peek()
        .is_some_and(|word| word.eq_ignore_ascii_case("streamed"))
    {
        words.next();
    }

    let amount = words.next()?;
    if !amount.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let unit = TimeUnit::from_word(words.next()?)?;
    Some((amount.to_owned(), unit))
}

fn parse_absolute(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

fn largest_unit(now: DateTime<Utc>, published: DateTime<Utc>) -> (i64, TimeUnit) {
    let elapsed = now.signed_duration_since(published);
    let days = elapsed.num_days();

    if days >= 365 {
        (days / 365, TimeUnit::Year)
    } else if days >= 30 {
        (days / 30, TimeUnit::Month)
    } else if days >= 7 {
        (days / 7, TimeUnit::Week)
    } else if days >= 1 {
        (days, TimeUnit::Day)
    } else if elapsed.num_hours() >= 1 {
        (elapsed.num_hours(), TimeUnit::Hour)
    } else if elapsed.num_minutes() >= 1 {
        (elapsed.num_minutes(), TimeUnit::Minute)
    } else {
        (elapsed.num_seconds().max(0), TimeUnit::Second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request(text: &str) -> PublishTimeRequest {
        PublishTimeRequest::new(text, false, false, &PublicationStrings::default())
    }

    fn fixed_localizer() -> TemplateLocalizer {
        TemplateLocalizer::with_now(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap())
    }

    #[test]
    fn unit_labels_use_pascal_case_keys_and_lowercase_defaults() {
        let labels: TimeUnitLabels =
            toml::from_str("Days = \"Tage\"\nHour = \"Stunde\"\n").unwrap();
        assert_eq!(labels.days, "Tage");
        assert_eq!(labels.hour, "Stunde");
        assert_eq!(labels.day, "day");
        assert_eq!(labels.seconds, "seconds");
        assert_eq!(TimeUnitLabels::default().years, "years");
    }

    #[tokio::test]
    async fn relative_phrases_use_template() {
        let localizer = TemplateLocalizer::new();
        assert_eq!(
            localizer.localize(request("3 days ago")).await.unwrap(),
            "3 days ago"
        );
        assert_eq!(
            localizer.localize(request("1 hour ago")).await.unwrap(),
            "1 hour ago"
        );
        assert_eq!(
            localizer
                .localize(request("Streamed 2 weeks ago"))
                .await
                .unwrap(),
            "2 weeks ago"
        );
    }

    #[tokio::test]
    async fn custom_template_and_labels_are_applied() {
        let strings = PublicationStrings {
            template: "vor $ %".into(),
            units: TimeUnitLabels {
                month: "Monat".into(),
                months: "Monaten".into(),
                ..TimeUnitLabels::default()
            },
            ..PublicationStrings::default()
        };
        let localizer = TemplateLocalizer::new();
        let text = resolve_publish_time(&localizer, "5 months ago", false, false, &strings)
            .await
            .unwrap();
        assert_eq!(text, "vor 5 Monaten");
        let text = resolve_publish_time(&localizer, "1 month ago", false, false, &strings)
            .await
            .unwrap();
        assert_eq!(text, "vor 1 Monat");
    }

    #[tokio::test]
    async fn live_and_upcoming_short_circuit() {
        let strings = PublicationStrings::default();
        let localizer = TemplateLocalizer::new();
        let live = resolve_publish_time(&localizer, "1 hour ago", true, false, &strings)
            .await
            .unwrap();
        assert_eq!(live, "0 watching");
        let upcoming = resolve_publish_time(&localizer, "Jun 3", false, true, &strings)
            .await
            .unwrap();
        assert_eq!(upcoming, "Premieres on: Jun 3");
    }

    #[tokio::test]
    async fn absolute_dates_become_relative() {
        let localizer = fixed_localizer();
        assert_eq!(
            localizer.localize(request("2024-05-29")).await.unwrap(),
            "3 days ago"
        );
        assert_eq!(
            localizer
                .localize(request("2022-05-01T00:00:00Z"))
                .await
                .unwrap(),
            "2 years ago"
        );
        assert_eq!(
            localizer
                .localize(request("2024-06-01T11:00:00+00:00"))
                .await
                .unwrap(),
            "1 hour ago"
        );
    }

    #[tokio::test]
    async fn unknown_text_passes_through_and_blank_fails() {
        let localizer = TemplateLocalizer::new();
        assert_eq!(
            localizer.localize(request("Premiered recently")).await.unwrap(),
            "Premiered recently"
        );
        let err = localizer.localize(request("   ")).await.unwrap_err();
        assert_eq!(err.publish_text, "   ");
    }
}
