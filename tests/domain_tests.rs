//! Cross-module behavior tests for the pure domain layer: start values
//! feeding group labels, the signup calendar gating wave eligibility, and
//! the slot status transition graph as the lifecycle walks it.

use chrono::{DateTime, TimeZone, Utc};
use teesheet_core::admission::{
    self, check_reservation_permitted, classify_window, Window, UNRESTRICTED_WAVE,
};
use teesheet_core::error::RegistrationError;
use teesheet_core::grouping::get_group;
use teesheet_core::models::{ClubEvent, EventType, Hole, RegistrationSlot, RegistrationType, StartType};
use teesheet_core::schedule::get_start;
use teesheet_core::state_machine::{target_state, SlotEvent, SlotStatus};

fn weeknight_event() -> ClubEvent {
    ClubEvent {
        id: 42,
        name: "Weeknight Game".to_string(),
        event_type: EventType::Weeknight,
        registration_type: RegistrationType::Member,
        start_type: Some(StartType::TeeTimes),
        can_choose: true,
        start_time: Some("3:00 PM".to_string()),
        tee_time_splits: Some("8,9".to_string()),
        starter_time_interval: 0,
        team_size: 1,
        total_groups: Some(20),
        registration_maximum: None,
        priority_signup_start: Some(Utc.with_ymd_and_hms(2024, 6, 3, 8, 0, 0).unwrap()),
        signup_start: Some(Utc.with_ymd_and_hms(2024, 6, 3, 10, 0, 0).unwrap()),
        signup_end: Some(Utc.with_ymd_and_hms(2024, 6, 3, 18, 0, 0).unwrap()),
        signup_waves: Some(4),
    }
}

fn slot(id: i64, registration_id: Option<i64>, starting_order: i32, sequence: i32) -> RegistrationSlot {
    RegistrationSlot {
        id,
        event_id: 42,
        hole_id: Some(1),
        registration_id,
        player_id: None,
        starting_order,
        slot: sequence,
        status: SlotStatus::Reserved,
    }
}

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, hour, minute, 0).unwrap()
}

#[test]
fn tee_time_start_value_flows_into_group_label() {
    let event = weeknight_event();
    let holes = [Hole {
        id: 1,
        course_id: 7,
        number: 1,
    }];

    // Alternating 8/9 minute splits from 3:00 PM: order 3 tees at 3:25 PM.
    let s = slot(11, Some(5), 3, 0);
    let start = get_start(&event, &s, &holes).unwrap();
    assert_eq!(start, "3:25 PM");

    let group = get_group(&event, &s, &start, "East", &[s.clone()]).unwrap();
    assert_eq!(group, "East-3:25 PM");
}

#[test]
fn shotgun_start_value_flows_into_group_label() {
    let mut event = weeknight_event();
    event.start_type = Some(StartType::Shotgun);
    let holes = [
        Hole {
            id: 1,
            course_id: 7,
            number: 8,
        },
        Hole {
            id: 2,
            course_id: 7,
            number: 9,
        },
    ];

    let s = slot(11, Some(5), 1, 0);
    let start = get_start(&event, &s, &holes).unwrap();
    assert_eq!(start, "8B");

    let group = get_group(&event, &s, &start, "North", &[s.clone()]).unwrap();
    assert_eq!(group, "North-8B");
}

#[test]
fn team_event_splits_foursome_into_two_pairs() {
    let mut event = weeknight_event();
    event.event_type = EventType::WeekendMajor;
    event.team_size = 2;

    let slots = vec![
        slot(31, Some(9), 0, 2),
        slot(32, Some(9), 0, 0),
        slot(33, Some(9), 0, 3),
        slot(34, Some(9), 0, 1),
    ];

    // Split follows sequence order, not id order.
    let mut labels: Vec<String> = slots
        .iter()
        .map(|s| get_group(&event, s, "N/A", "East", &slots).unwrap())
        .collect();
    labels.sort();
    assert_eq!(labels, vec!["9a", "9a", "9b", "9b"]);
}

#[test]
fn priority_waves_unlock_the_sheet_front_to_back() {
    let event = weeknight_event();

    // 8:00 opens wave 1: only the first quarter of the sheet.
    assert!(check_reservation_permitted(&event, at(8, 5), 4, None).is_ok());
    assert!(matches!(
        check_reservation_permitted(&event, at(8, 5), 5, None),
        Err(RegistrationError::WaveNotOpen { required_wave: 2 })
    ));

    // 9:00 opens wave 3: three quarters of the sheet.
    assert!(check_reservation_permitted(&event, at(9, 5), 14, None).is_ok());
    assert!(matches!(
        check_reservation_permitted(&event, at(9, 5), 15, None),
        Err(RegistrationError::WaveNotOpen { required_wave: 4 })
    ));

    // General signup opens everything.
    assert!(check_reservation_permitted(&event, at(10, 0), 19, None).is_ok());
}

#[test]
fn events_without_waves_admit_everyone_during_priority() {
    let mut event = weeknight_event();
    event.signup_waves = None;

    assert_eq!(classify_window(&event, at(8, 30)), Window::Priority);
    assert_eq!(admission::current_wave(&event, at(8, 30)), UNRESTRICTED_WAVE);
    assert!(check_reservation_permitted(&event, at(8, 30), 19, None).is_ok());
}

#[test]
fn calendar_rejects_outside_every_window() {
    let event = weeknight_event();
    for moment in [at(6, 0), at(18, 0), at(23, 0)] {
        assert!(matches!(
            check_reservation_permitted(&event, moment, 0, None),
            Err(RegistrationError::RegistrationNotOpen)
        ));
    }
}

#[test]
fn slot_walks_the_full_happy_path() {
    let mut status = SlotStatus::Available;
    for event in [
        SlotEvent::Reserve,
        SlotEvent::BeginPayment,
        SlotEvent::ConfirmPayment,
    ] {
        status = target_state(status, &event).unwrap();
    }
    assert_eq!(status, SlotStatus::Reserved);
    assert!(status.is_confirmed());
}

#[test]
fn release_returns_every_held_status_to_available() {
    for held in SlotStatus::held_statuses() {
        assert!(held.is_held());
        assert_eq!(
            target_state(held, &SlotEvent::Release).unwrap(),
            SlotStatus::Available
        );
    }
}

#[test]
fn reserved_is_reachable_only_through_payment() {
    for status in SlotStatus::all() {
        for event in SlotEvent::all() {
            if let Ok(next) = target_state(status, &event) {
                if next == SlotStatus::Reserved && status != SlotStatus::Reserved {
                    assert_eq!(status, SlotStatus::AwaitingPayment);
                    assert_eq!(event, SlotEvent::ConfirmPayment);
                }
            }
        }
    }
}
