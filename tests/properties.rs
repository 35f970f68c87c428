// generated-input checks for validation gating, section projection and the wire format

use chrono::NaiveDate;
use eventplan::models::VenueListing;
use eventplan::orchestrator::Effect;
use eventplan::{
    interpret, transition, AppState, Configuration, Credentials, Event, Phase, Section,
    SubmissionResult, VenueDetails, VenueType,
};
use proptest::option;
use proptest::prelude::*;
use serde_json::Value;

fn text() -> impl Strategy<Value = String> {
    "\\PC{0,24}"
}

fn event_date() -> impl Strategy<Value = NaiveDate> {
    (1000i32..=9999, 1u32..=12, 1u32..=28)
        .prop_map(|(year, month, day)| NaiveDate::from_ymd_opt(year, month, day).unwrap())
}

fn venue_type() -> impl Strategy<Value = VenueType> {
    prop::sample::select(VenueType::ALL.to_vec())
}

fn configuration() -> impl Strategy<Value = Configuration> {
    (
        (text(), text(), text()),
        event_date(),
        any::<i64>(),
        -1.0e12..1.0e12f64,
        venue_type(),
        (text(), text()),
    )
        .prop_map(
            |((topic, description, city), date, participants, budget, venue, (openai, serper))| {
                Configuration {
                    event_topic: topic,
                    event_description: description,
                    event_city: city,
                    tentative_date: date,
                    expected_participants: participants,
                    budget,
                    venue_type: venue,
                    credentials: Credentials::new(openai, serper),
                }
            },
        )
}

// at least one of the two keys is empty
fn configuration_missing_a_key() -> impl Strategy<Value = Configuration> {
    (configuration(), 0u8..3).prop_map(|(mut config, blank)| {
        if blank != 1 {
            config.credentials.openai_api_key.clear();
        }
        if blank != 0 {
            config.credentials.serper_api_key.clear();
        }
        config
    })
}

fn settled_phase() -> impl Strategy<Value = Phase> {
    prop_oneof![
        Just(Phase::Idle),
        text().prop_map(Phase::Failed),
        text().prop_map(|message| Phase::Succeeded(SubmissionResult::new(true, message))),
    ]
}

fn venue_details() -> impl Strategy<Value = VenueDetails> {
    prop_oneof![
        text().prop_map(|error| VenueDetails::Unavailable { error }),
        (
            option::of(text()),
            option::of(text()),
            option::of(any::<u32>()),
            option::of(text()),
        )
            .prop_map(|(name, address, capacity, booking_status)| {
                VenueDetails::Listing(VenueListing {
                    name,
                    address,
                    capacity,
                    booking_status,
                })
            }),
        text().prop_map(|raw| VenueDetails::Malformed(Value::String(raw))),
    ]
}

fn submission_result(success: bool) -> impl Strategy<Value = SubmissionResult> {
    (
        text(),
        option::of(venue_details()),
        option::of(text()),
        option::of(text()),
    )
        .prop_map(move |(message, venue_details, logistics, marketing)| SubmissionResult {
            success,
            message,
            venue_details,
            logistics_confirmation: logistics,
            marketing_report: marketing,
        })
}

proptest! {
    #[test]
    fn missing_key_never_dispatches(
        config in configuration_missing_a_key(),
        before in settled_phase(),
    ) {
        let mut state = AppState::new(config);
        state.phase = before.clone();

        let (state, effects) = transition(state, Event::Submit);

        prop_assert_eq!(state.phase, before);
        prop_assert!(!effects.iter().any(|effect| matches!(effect, Effect::Dispatch { .. })), "missing key must not dispatch");
    }

    #[test]
    fn failed_result_is_only_the_error(result in submission_result(false)) {
        prop_assert_eq!(
            interpret(&result),
            vec![Section::Error { message: result.message.clone() }]
        );
    }

    #[test]
    fn bare_success_is_only_the_banner(message in text()) {
        let result = SubmissionResult::new(true, message.clone());
        prop_assert_eq!(interpret(&result), vec![Section::SuccessBanner { message }]);
    }

    #[test]
    fn configuration_round_trips_through_json(config in configuration()) {
        let body = serde_json::to_string(&config).unwrap();
        let parsed: Configuration = serde_json::from_str(&body).unwrap();
        prop_assert_eq!(parsed, config);
    }
}
