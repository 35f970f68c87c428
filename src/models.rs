// data models for the event planning api

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// sample event the form starts with
const SAMPLE_TOPIC: &str = "Tech Innovation Conference";
const SAMPLE_DESCRIPTION: &str =
    "A gathering of tech innovators and industry leaders to explore future technologies.";
const SAMPLE_CITY: &str = "Lahore";
const SAMPLE_YEAR: i32 = 2025;
const SAMPLE_MONTH: u32 = 11; // November
const SAMPLE_DAY: u32 = 22;
const SAMPLE_PARTICIPANTS: i64 = 200;
const SAMPLE_BUDGET: f64 = 50_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum VenueType {
    #[default]
    ConferenceHall,
    HotelBallroom,
    ConventionCenter,
    OutdoorVenue,
    Restaurant,
    Other,
}

impl VenueType {
    pub const ALL: [VenueType; 6] = [
        VenueType::ConferenceHall,
        VenueType::HotelBallroom,
        VenueType::ConventionCenter,
        VenueType::OutdoorVenue,
        VenueType::Restaurant,
        VenueType::Other,
    ];

    // label as shown in the form and sent on the wire
    pub fn label(self) -> &'static str {
        match self {
            VenueType::ConferenceHall => "Conference Hall",
            VenueType::HotelBallroom => "Hotel Ballroom",
            VenueType::ConventionCenter => "Convention Center",
            VenueType::OutdoorVenue => "Outdoor Venue",
            VenueType::Restaurant => "Restaurant",
            VenueType::Other => "Other",
        }
    }

    // unknown labels land on Other
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|venue| venue.label().eq_ignore_ascii_case(label))
            .unwrap_or(VenueType::Other)
    }
}

impl fmt::Display for VenueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<VenueType> for String {
    fn from(venue: VenueType) -> Self {
        venue.label().to_string()
    }
}

impl From<String> for VenueType {
    fn from(label: String) -> Self {
        VenueType::from_label(&label)
    }
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub openai_api_key: String,
    pub serper_api_key: String,
}

impl Credentials {
    pub fn new(openai_api_key: impl Into<String>, serper_api_key: impl Into<String>) -> Self {
        Self {
            openai_api_key: openai_api_key.into(),
            serper_api_key: serper_api_key.into(),
        }
    }
}

// keys never show up in logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redact(key: &str) -> &'static str {
            if key.is_empty() {
                "<empty>"
            } else {
                "<redacted>"
            }
        }

        f.debug_struct("Credentials")
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("serper_api_key", &redact(&self.serper_api_key))
            .finish()
    }
}

// request payload for POST /run-event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub event_topic: String,
    pub event_description: String,
    pub event_city: String,
    pub tentative_date: NaiveDate,
    pub expected_participants: i64,
    pub budget: f64,
    pub venue_type: VenueType,
    #[serde(flatten)]
    pub credentials: Credentials,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            event_topic: SAMPLE_TOPIC.to_string(),
            event_description: SAMPLE_DESCRIPTION.to_string(),
            event_city: SAMPLE_CITY.to_string(),
            tentative_date: sample_event_date(),
            expected_participants: SAMPLE_PARTICIPANTS,
            budget: SAMPLE_BUDGET,
            venue_type: VenueType::default(),
            credentials: Credentials::default(),
        }
    }
}

fn sample_event_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(SAMPLE_YEAR, SAMPLE_MONTH, SAMPLE_DAY).unwrap_or_default()
}

// response of POST /run-event, only success and message are guaranteed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_details: Option<VenueDetails>,
    #[serde(
        default,
        deserialize_with = "non_empty_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub logistics_confirmation: Option<String>,
    #[serde(
        default,
        deserialize_with = "non_empty_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub marketing_report: Option<String>,
}

impl SubmissionResult {
    pub fn new(success: bool, message: impl Into<String>) -> Self {
        Self {
            success,
            message: message.into(),
            venue_details: None,
            logistics_confirmation: None,
            marketing_report: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VenueListing {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VenueDetails {
    // the service could not produce venue data
    Unavailable { error: String },
    Listing(VenueListing),
    // anything that is not a json object
    Malformed(Value),
}

impl VenueDetails {
    pub fn listing(&self) -> Option<&VenueListing> {
        match self {
            VenueDetails::Listing(listing) => Some(listing),
            _ => None,
        }
    }
}

impl From<Value> for VenueDetails {
    fn from(value: Value) -> Self {
        let fields = match value {
            Value::Object(fields) => fields,
            other => return VenueDetails::Malformed(other),
        };

        if let Some(error) = fields.get("error").and_then(loose_text) {
            return VenueDetails::Unavailable { error };
        }

        VenueDetails::Listing(VenueListing {
            name: fields.get("name").and_then(loose_text),
            address: fields.get("address").and_then(loose_text),
            capacity: fields.get("capacity").and_then(loose_count),
            booking_status: fields.get("booking_status").and_then(loose_text),
        })
    }
}

impl<'de> Deserialize<'de> for VenueDetails {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(VenueDetails::from)
    }
}

// strings pass through, scalars are stringified, empty and null are absent
fn loose_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

// "500" and 500 both count, "about 500" does not
fn loose_count(value: &Value) -> Option<u32> {
    match value {
        Value::Number(number) => number.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn non_empty_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) if !text.is_empty() => Some(text),
        _ => None,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn configuration_serializes_with_wire_keys() {
        let mut config = Configuration::default();
        config.credentials = Credentials::new("sk-test", "serper-test");

        let wire = serde_json::to_value(&config).unwrap();
        assert_eq!(
            wire,
            json!({
                "event_topic": "Tech Innovation Conference",
                "event_description": SAMPLE_DESCRIPTION,
                "event_city": "Lahore",
                "tentative_date": "2025-11-22",
                "expected_participants": 200,
                "budget": 50000.0,
                "venue_type": "Conference Hall",
                "openai_api_key": "sk-test",
                "serper_api_key": "serper-test"
            })
        );
    }

    #[test]
    fn configuration_survives_the_wire() {
        let config = Configuration {
            event_topic: "Rust Meetup".into(),
            event_description: "Talks & pizza".into(),
            event_city: "Berlin".into(),
            tentative_date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            expected_participants: 42,
            budget: 1234.5,
            venue_type: VenueType::OutdoorVenue,
            credentials: Credentials::new("a", "b"),
        };

        let body = serde_json::to_string(&config).unwrap();
        let parsed: Configuration = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn unknown_venue_label_is_other() {
        assert_eq!(VenueType::from_label("Rooftop"), VenueType::Other);
        assert_eq!(VenueType::from_label("hotel ballroom"), VenueType::HotelBallroom);
    }

    #[test]
    fn credentials_debug_hides_keys() {
        let debug = format!("{:?}", Credentials::new("sk-secret", ""));
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
        assert!(debug.contains("<empty>"));
    }

    #[test]
    fn minimal_result_has_no_optional_fields() {
        let result: SubmissionResult =
            serde_json::from_value(json!({ "success": true, "message": "Plan ready" })).unwrap();
        assert_eq!(result, SubmissionResult::new(true, "Plan ready"));
    }

    #[test]
    fn venue_error_marker_is_unavailable() {
        let result: SubmissionResult = serde_json::from_value(json!({
            "success": true,
            "message": "ok",
            "venue_details": { "error": "not found" }
        }))
        .unwrap();
        assert_eq!(
            result.venue_details,
            Some(VenueDetails::Unavailable {
                error: "not found".into()
            })
        );
    }

    #[test]
    fn venue_fields_are_lenient() {
        let details = VenueDetails::from(json!({
            "name": "Pearl Continental",
            "capacity": "450",
            "booking_status": null
        }));
        assert_eq!(
            details,
            VenueDetails::Listing(VenueListing {
                name: Some("Pearl Continental".into()),
                address: None,
                capacity: Some(450),
                booking_status: None,
            })
        );
    }

    #[test]
    fn non_object_venue_is_malformed() {
        let details = VenueDetails::from(json!(["hall", "ballroom"]));
        assert!(matches!(details, VenueDetails::Malformed(_)));
        assert!(details.listing().is_none());
    }

    #[test]
    fn empty_or_mistyped_text_sections_are_absent() {
        let result: SubmissionResult = serde_json::from_value(json!({
            "success": true,
            "message": "ok",
            "logistics_confirmation": "",
            "marketing_report": 17
        }))
        .unwrap();
        assert!(result.logistics_confirmation.is_none());
        assert!(result.marketing_report.is_none());
    }
}
