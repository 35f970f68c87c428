// editable event configuration and the gate in front of submission

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use chrono::NaiveDate;
use regex::Regex;
use tracing::{debug, warn};

use crate::error::ValidationError;
use crate::models::{Configuration, VenueType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    EventTopic,
    EventDescription,
    EventCity,
    TentativeDate,
    ExpectedParticipants,
    Budget,
    VenueType,
    OpenaiApiKey,
    SerperApiKey,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::EventTopic,
        Field::EventDescription,
        Field::EventCity,
        Field::TentativeDate,
        Field::ExpectedParticipants,
        Field::Budget,
        Field::VenueType,
        Field::OpenaiApiKey,
        Field::SerperApiKey,
    ];

    // json key, also the form input name
    pub fn key(self) -> &'static str {
        match self {
            Field::EventTopic => "event_topic",
            Field::EventDescription => "event_description",
            Field::EventCity => "event_city",
            Field::TentativeDate => "tentative_date",
            Field::ExpectedParticipants => "expected_participants",
            Field::Budget => "budget",
            Field::VenueType => "venue_type",
            Field::OpenaiApiKey => "openai_api_key",
            Field::SerperApiKey => "serper_api_key",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::EventTopic => "Event Topic",
            Field::EventDescription => "Event Description",
            Field::EventCity => "Event City",
            Field::TentativeDate => "Tentative Date",
            Field::ExpectedParticipants => "Expected Participants",
            Field::Budget => "Budget",
            Field::VenueType => "Venue Type",
            Field::OpenaiApiKey => "OpenAI API Key",
            Field::SerperApiKey => "Serper API Key",
        }
    }

    pub fn is_credential(self) -> bool {
        matches!(self, Field::OpenaiApiKey | Field::SerperApiKey)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown configuration field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.key() == name)
            .ok_or_else(|| UnknownField(name.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    Invalid(Vec<Field>),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        match self {
            ValidationOutcome::Valid => Ok(()),
            ValidationOutcome::Invalid(fields) => Err(ValidationError { fields }),
        }
    }
}

// frozen copy taken at submit time, clones share one allocation
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot(Arc<Configuration>);

impl Deref for Snapshot {
    type Target = Configuration;

    fn deref(&self) -> &Configuration {
        &self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigurationStore {
    config: Configuration,
}

impl ConfigurationStore {
    pub fn new(config: Configuration) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    // numeric fields never fail, bad input becomes 0
    pub fn update_field(&mut self, field: Field, raw: &str) -> &Configuration {
        let config = &mut self.config;
        match field {
            Field::EventTopic => config.event_topic = raw.to_string(),
            Field::EventDescription => config.event_description = raw.to_string(),
            Field::EventCity => config.event_city = raw.to_string(),
            Field::TentativeDate => match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
                Ok(date) => config.tentative_date = date,
                Err(e) => warn!("Ignoring tentative date {:?}: {}", raw, e),
            },
            Field::ExpectedParticipants => {
                // float to int casts saturate, so this cannot overflow
                config.expected_participants = coerce_number(raw).trunc() as i64;
            }
            Field::Budget => config.budget = coerce_number(raw),
            Field::VenueType => config.venue_type = VenueType::from_label(raw),
            Field::OpenaiApiKey => config.credentials.openai_api_key = raw.to_string(),
            Field::SerperApiKey => config.credentials.serper_api_key = raw.to_string(),
        }

        if field.is_credential() {
            debug!("Updated {}", field);
        } else {
            debug!("Updated {} from {:?}", field, raw);
        }
        &self.config
    }

    pub fn validate(&self) -> ValidationOutcome {
        validate(&self.config)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot(Arc::new(self.config.clone()))
    }
}

// keys made only of whitespace count as missing
pub fn validate(config: &Configuration) -> ValidationOutcome {
    let mut invalid = Vec::new();

    if config.credentials.openai_api_key.trim().is_empty() {
        invalid.push(Field::OpenaiApiKey);
    }
    if config.credentials.serper_api_key.trim().is_empty() {
        invalid.push(Field::SerperApiKey);
    }
    if config.expected_participants < 1 {
        invalid.push(Field::ExpectedParticipants);
    }
    if !config.budget.is_finite() || config.budget < 0.0 {
        invalid.push(Field::Budget);
    }

    if invalid.is_empty() {
        ValidationOutcome::Valid
    } else {
        ValidationOutcome::Invalid(invalid)
    }
}

// leading-number parse: "12abc" -> 12, "abc" -> 0
pub fn coerce_number(raw: &str) -> f64 {
    static LEADING_NUMBER: OnceLock<Option<Regex>> = OnceLock::new();

    let pattern = LEADING_NUMBER
        .get_or_init(|| Regex::new(r"^\s*[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").ok());

    pattern
        .as_ref()
        .and_then(|regex| regex.find(raw))
        .and_then(|found| found.as_str().trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Credentials;

    fn store_with_keys() -> ConfigurationStore {
        let mut store = ConfigurationStore::default();
        store.update_field(Field::OpenaiApiKey, "sk-test");
        store.update_field(Field::SerperApiKey, "serper-test");
        store
    }

    #[test]
    fn field_names_round_trip() {
        for field in Field::ALL {
            assert_eq!(field.key().parse::<Field>().unwrap(), field);
        }
        assert!("ticket_price".parse::<Field>().is_err());
    }

    #[test]
    fn numeric_coercion_follows_leading_number() {
        assert_eq!(coerce_number("250"), 250.0);
        assert_eq!(coerce_number("  12.5kg"), 12.5);
        assert_eq!(coerce_number("-3"), -3.0);
        assert_eq!(coerce_number(".5"), 0.5);
        assert_eq!(coerce_number("1e3"), 1000.0);
        assert_eq!(coerce_number("abc"), 0.0);
        assert_eq!(coerce_number(""), 0.0);
    }

    #[test]
    fn update_field_coerces_numbers() {
        let mut store = ConfigurationStore::default();

        let config = store.update_field(Field::ExpectedParticipants, "75.9");
        assert_eq!(config.expected_participants, 75);

        let config = store.update_field(Field::Budget, "not a number");
        assert_eq!(config.budget, 0.0);
    }

    #[test]
    fn update_field_keeps_text_verbatim() {
        let mut store = ConfigurationStore::default();
        let config = store.update_field(Field::EventCity, "  Karachi ");
        assert_eq!(config.event_city, "  Karachi ");

        let config = store.update_field(Field::VenueType, "Restaurant");
        assert_eq!(config.venue_type, VenueType::Restaurant);
    }

    #[test]
    fn bad_date_leaves_previous_value() {
        let mut store = ConfigurationStore::default();
        let before = store.config().tentative_date;
        store.update_field(Field::TentativeDate, "next tuesday");
        assert_eq!(store.config().tentative_date, before);

        store.update_field(Field::TentativeDate, "2026-01-05");
        assert_eq!(
            store.config().tentative_date,
            NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
        );
    }

    #[test]
    fn defaults_need_credentials() {
        let store = ConfigurationStore::default();
        assert_eq!(
            store.validate(),
            ValidationOutcome::Invalid(vec![Field::OpenaiApiKey, Field::SerperApiKey])
        );
        assert!(store_with_keys().validate().is_valid());
    }

    #[test]
    fn blank_key_is_missing() {
        let mut store = store_with_keys();
        store.update_field(Field::SerperApiKey, "   ");
        assert_eq!(
            store.validate(),
            ValidationOutcome::Invalid(vec![Field::SerperApiKey])
        );
    }

    #[test]
    fn coerced_zero_participants_is_rejected() {
        let mut store = store_with_keys();
        store.update_field(Field::ExpectedParticipants, "lots");
        store.update_field(Field::Budget, "-10");
        let err = store.validate().into_result().unwrap_err();
        assert_eq!(err.fields, vec![Field::ExpectedParticipants, Field::Budget]);
    }

    #[test]
    fn snapshot_is_isolated_from_later_edits() {
        let mut store = store_with_keys();
        let snapshot = store.snapshot();

        store.update_field(Field::EventTopic, "Changed");
        store.update_field(Field::OpenaiApiKey, "");

        assert_eq!(snapshot.event_topic, "Tech Innovation Conference");
        assert_eq!(
            snapshot.credentials,
            Credentials::new("sk-test", "serper-test")
        );
    }
}
