use chrono::{DateTime, Local, Locale, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Timestamp display options, a fixed subset of `Intl.DateTimeFormat`'s.
///
/// Unknown keys are rejected rather than ignored.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct DateFormat {
    pub weekday: Option<TextWidth>,
    pub year: Option<NumberWidth>,
    pub month: Option<MonthStyle>,
    pub day: Option<NumberWidth>,
    pub hour: Option<NumberWidth>,
    pub minute: Option<NumberWidth>,
    pub second: Option<NumberWidth>,
    pub hour12: bool,
    pub time_zone: TimeZone,
}

impl Default for DateFormat {
    fn default() -> Self {
        Self {
            weekday: None,
            year: None,
            month: Some(MonthStyle::Short),
            day: Some(NumberWidth::Numeric),
            hour: None,
            minute: None,
            second: None,
            hour12: false,
            time_zone: TimeZone::Local,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TextWidth {
    Short,
    Long,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberWidth {
    #[serde(rename = "numeric")]
    Numeric,
    #[serde(rename = "2-digit")]
    TwoDigit,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonthStyle {
    #[serde(rename = "numeric")]
    Numeric,
    #[serde(rename = "2-digit")]
    TwoDigit,
    #[serde(rename = "short")]
    Short,
    #[serde(rename = "long")]
    Long,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeZone {
    #[default]
    #[serde(rename = "local")]
    Local,
    #[serde(rename = "UTC", alias = "utc")]
    Utc,
}

impl NumberWidth {
    fn spec(self, numeric: &'static str, two_digit: &'static str) -> &'static str {
        match self {
            Self::Numeric => numeric,
            Self::TwoDigit => two_digit,
        }
    }
}

impl DateFormat {
    /// Parse options from a JSON object such as `{"month":"long","year":"numeric"}`.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the `strftime` pattern for these options.
    ///
    /// Textual months read `Tue, Jan 5, 2024`, numeric ones `1/5/2024`;
    /// the time, if any, follows after a comma.
    pub fn pattern(&self) -> String {
        let mut date = String::new();
        match self.month {
            Some(MonthStyle::Short | MonthStyle::Long) => {
                if let Some(weekday) = self.weekday {
                    date.push_str(match weekday {
                        TextWidth::Short => "%a, ",
                        TextWidth::Long => "%A, ",
                    });
                }
                date.push_str(if self.month == Some(MonthStyle::Long) { "%B" } else { "%b" });
                if let Some(day) = self.day {
                    date.push(' ');
                    date.push_str(day.spec("%-d", "%d"));
                }
                if let Some(year) = self.year {
                    date.push_str(", ");
                    date.push_str(year.spec("%Y", "%y"));
                }
            }
            month => {
                let mut parts = vec![];
                if let Some(month) = month {
                    parts.push(if month == MonthStyle::TwoDigit { "%m" } else { "%-m" });
                }
                if let Some(day) = self.day {
                    parts.push(day.spec("%-d", "%d"));
                }
                if let Some(year) = self.year {
                    parts.push(year.spec("%Y", "%y"));
                }
                if let Some(weekday) = self.weekday {
                    date.push_str(match weekday {
                        TextWidth::Short => "%a",
                        TextWidth::Long => "%A",
                    });
                    if !parts.is_empty() {
                        date.push_str(", ");
                    }
                }
                date.push_str(&parts.join("/"));
            }
        }

        let mut time = String::new();
        if let Some(hour) = self.hour {
            time.push_str(match (self.hour12, hour) {
                (true, NumberWidth::Numeric) => "%-I",
                (true, NumberWidth::TwoDigit) => "%I",
                (false, NumberWidth::Numeric) => "%-H",
                (false, NumberWidth::TwoDigit) => "%H",
            });
            if self.minute.is_some() {
                time.push_str(":%M");
                if self.second.is_some() {
                    time.push_str(":%S");
                }
            }
            if self.hour12 {
                time.push_str(" %p");
            }
        }

        match (date.is_empty(), time.is_empty()) {
            (_, true) => date,
            (true, false) => time,
            (false, false) => format!("{date}, {time}"),
        }
    }

    pub fn format(&self, timestamp: &DateTime<Utc>, locale: Locale) -> String {
        let pattern = self.pattern();
        match self.time_zone {
            TimeZone::Utc => timestamp.format_localized(&pattern, locale).to_string(),
            TimeZone::Local => timestamp
                .with_timezone(&Local)
                .format_localized(&pattern, locale)
                .to_string(),
        }
    }
}

/// Parse a locale name, accepting `en-US`, `en_US` and `en_US.UTF-8`.
pub fn parse_locale(name: &str) -> Result<Locale> {
    let trimmed = name
        .split(['.', '@'])
        .next()
        .unwrap_or_default()
        .replace('-', "_");
    Locale::try_from(trimmed.as_str()).map_err(|_| Error::UnknownLocale(name.to_string()))
}

/// Locale of the host environment, falling back to `en_US`.
pub fn host_locale() -> Locale {
    first_known_locale(
        ["LC_ALL", "LC_TIME", "LANG"]
            .iter()
            .filter_map(|key| std::env::var(key).ok()),
    )
    .unwrap_or(Locale::en_US)
}

/// First value naming a locale chrono knows. `C` and empty values are
/// passed over.
fn first_known_locale(values: impl IntoIterator<Item = String>) -> Option<Locale> {
    values
        .into_iter()
        .find_map(|value| parse_locale(&value).ok())
}
