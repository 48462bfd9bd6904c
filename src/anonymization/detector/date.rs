//! Calendar date detector

use super::PiiDetector;
use crate::anonymization::config::AnonymizationLevel;
use crate::anonymization::models::{DetectionMethod, PiiCategory, SourcePriority, Span};
use anyhow::Result;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})\.[ \t]*(\d{1,2})\.[ \t]*(\d{4})\b").unwrap());

/// Czech `D. M. YYYY` date that names a real calendar day
#[derive(Debug, Default)]
pub struct DateDetector;

impl DateDetector {
    pub fn new() -> Self {
        Self
    }
}

impl PiiDetector for DateDetector {
    fn name(&self) -> &'static str {
        "date"
    }

    fn min_level(&self) -> AnonymizationLevel {
        AnonymizationLevel::Standard
    }

    fn detect(&self, text: &str, _level: AnonymizationLevel) -> Result<Vec<Span>> {
        let mut spans = Vec::new();
        for caps in DATE.captures_iter(text) {
            let (Some(whole), Some(day), Some(month), Some(year)) =
                (caps.get(0), caps.get(1), caps.get(2), caps.get(3))
            else {
                continue;
            };
            let valid = match (
                year.as_str().parse::<i32>(),
                month.as_str().parse::<u32>(),
                day.as_str().parse::<u32>(),
            ) {
                (Ok(y), Ok(m), Ok(d)) => NaiveDate::from_ymd_opt(y, m, d).is_some(),
                _ => false,
            };
            if !valid {
                continue;
            }
            spans.extend(Span::from_document(
                text,
                PiiCategory::Date,
                whole.start(),
                whole.end(),
                SourcePriority::Pattern,
                DetectionMethod::Regex,
            ));
        }
        Ok(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("dne 15. 3. 1985", Some("15. 3. 1985") ; "spaced")]
    #[test_case("dne 1.1.2020", Some("1.1.2020") ; "compact")]
    #[test_case("dne 29. 2. 2024", Some("29. 2. 2024") ; "leap day")]
    #[test_case("dne 29. 2. 2023", None ; "not a leap year")]
    #[test_case("dne 32. 1. 2020", None ; "day out of range")]
    #[test_case("bod 3. 14. 2020", None ; "month out of range")]
    fn test_dates(text: &str, expected: Option<&str>) {
        let spans = DateDetector::new()
            .detect(text, AnonymizationLevel::Standard)
            .unwrap();
        assert_eq!(spans.first().map(|s| s.text.as_str()), expected);
    }
}
