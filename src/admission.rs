//! # Admission Window
//!
//! Classifies "now" against an event's signup calendar and computes priority
//! waves. Wave unlock is time-based (the priority period divides evenly into
//! `signup_waves` intervals); wave membership is position-based (contiguous
//! chunks of the start sheet). All checks here are cheap and lock-free, and
//! the lifecycle runs them before opening any transaction.

use crate::error::{RegistrationError, Result};
use crate::models::{ClubEvent, RegistrationType, StartType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wave value meaning "no wave restrictions configured".
pub const UNRESTRICTED_WAVE: i32 = 999;

/// Phase of an event's signup calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Window {
    /// The event has no signup calendar at all
    NotApplicable,
    /// Signup has not started
    Future,
    /// The priority period before general signup
    Priority,
    /// General signup
    Open,
    /// Signup has ended
    Past,
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotApplicable => "n/a",
            Self::Future => "future",
            Self::Priority => "priority",
            Self::Open => "open",
            Self::Past => "past",
        };
        write!(f, "{name}")
    }
}

/// Classify the current moment against the event's signup calendar.
pub fn classify_window(event: &ClubEvent, now: DateTime<Utc>) -> Window {
    if event.registration_type == RegistrationType::None {
        return Window::NotApplicable;
    }
    let (Some(signup_start), Some(signup_end)) = (event.signup_start, event.signup_end) else {
        return Window::NotApplicable;
    };

    if let Some(priority_start) = event.priority_signup_start {
        if now >= priority_start && now < signup_start {
            return Window::Priority;
        }
    }
    if now >= signup_start && now < signup_end {
        return Window::Open;
    }
    if now >= signup_end {
        return Window::Past;
    }
    Window::Future
}

/// The wave currently unlocked during the priority period.
///
/// Returns [`UNRESTRICTED_WAVE`] when no waves are configured, 0 before the
/// priority period opens, and `signup_waves + 1` once general signup starts.
/// The priority period divides evenly into `signup_waves` intervals.
pub fn current_wave(event: &ClubEvent, now: DateTime<Utc>) -> i32 {
    let (Some(waves), Some(priority_start), Some(signup_start)) = (
        event.signup_waves,
        event.priority_signup_start,
        event.signup_start,
    ) else {
        return UNRESTRICTED_WAVE;
    };

    if waves <= 0 {
        return UNRESTRICTED_WAVE;
    }
    if now < priority_start {
        return 0;
    }
    if now >= signup_start {
        return waves + 1;
    }

    let priority_duration = (signup_start - priority_start).num_milliseconds();
    if priority_duration <= 0 {
        return waves + 1;
    }
    let wave_duration = priority_duration / i64::from(waves);
    if wave_duration <= 0 {
        return waves;
    }
    let elapsed = (now - priority_start).num_milliseconds();

    ((elapsed / wave_duration) as i32 + 1).min(waves)
}

/// The wave a slot position belongs to.
///
/// Shotgun positions flatten to `(hole_number - 1) * 2 + starting_order`;
/// the `total_groups` positions split into `signup_waves` contiguous chunks
/// with the larger chunks first when the division is uneven. Positions past
/// the configured groups land in the final wave. Returns 1 when waves are
/// not configured.
pub fn starting_wave_for(event: &ClubEvent, starting_order: i32, hole_number: Option<i32>) -> i32 {
    let (Some(waves), Some(total_groups)) = (event.signup_waves, event.total_groups) else {
        return 1;
    };
    if waves <= 0 || total_groups <= 0 {
        return 1;
    }

    let mut effective_order = starting_order;
    if event.start_type == Some(StartType::Shotgun) {
        if let Some(hole) = hole_number {
            effective_order = (hole - 1) * 2 + starting_order;
        }
    }
    if effective_order >= total_groups {
        return waves;
    }

    let base = total_groups / waves;
    let remainder = total_groups % waves;
    let cutoff = remainder * (base + 1);

    if effective_order < cutoff {
        effective_order / (base + 1) + 1
    } else {
        remainder + (effective_order - cutoff) / base + 1
    }
}

/// The composed eligibility rule: reservation is permitted during general
/// signup, or during the priority period once the slot's wave has unlocked.
/// Everything else is rejected before any lock is taken.
pub fn check_reservation_permitted(
    event: &ClubEvent,
    now: DateTime<Utc>,
    starting_order: i32,
    hole_number: Option<i32>,
) -> Result<()> {
    match classify_window(event, now) {
        Window::Open => Ok(()),
        Window::Priority => {
            let required = starting_wave_for(event, starting_order, hole_number);
            if required <= current_wave(event, now) {
                Ok(())
            } else {
                Err(RegistrationError::WaveNotOpen {
                    required_wave: required,
                })
            }
        }
        _ => Err(RegistrationError::RegistrationNotOpen),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventType;
    use chrono::TimeZone;

    fn event_with_calendar() -> ClubEvent {
        ClubEvent {
            id: 1,
            name: "Weeknight".to_string(),
            event_type: EventType::Weeknight,
            registration_type: RegistrationType::Member,
            start_type: Some(StartType::TeeTimes),
            can_choose: true,
            start_time: Some("5:00 PM".to_string()),
            tee_time_splits: Some("9".to_string()),
            starter_time_interval: 0,
            team_size: 1,
            total_groups: Some(20),
            registration_maximum: None,
            // Priority 8:00-10:00, open 10:00-18:00.
            priority_signup_start: Some(Utc.with_ymd_and_hms(2024, 4, 1, 8, 0, 0).unwrap()),
            signup_start: Some(Utc.with_ymd_and_hms(2024, 4, 1, 10, 0, 0).unwrap()),
            signup_end: Some(Utc.with_ymd_and_hms(2024, 4, 1, 18, 0, 0).unwrap()),
            signup_waves: Some(4),
        }
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 1, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_window_classification() {
        let event = event_with_calendar();
        assert_eq!(classify_window(&event, at(7, 0)), Window::Future);
        assert_eq!(classify_window(&event, at(8, 0)), Window::Priority);
        assert_eq!(classify_window(&event, at(9, 59)), Window::Priority);
        assert_eq!(classify_window(&event, at(10, 0)), Window::Open);
        assert_eq!(classify_window(&event, at(17, 59)), Window::Open);
        assert_eq!(classify_window(&event, at(18, 0)), Window::Past);
    }

    #[test]
    fn test_window_not_applicable() {
        let mut event = event_with_calendar();
        event.registration_type = RegistrationType::None;
        assert_eq!(classify_window(&event, at(10, 0)), Window::NotApplicable);

        let mut event = event_with_calendar();
        event.signup_start = None;
        assert_eq!(classify_window(&event, at(10, 0)), Window::NotApplicable);
    }

    #[test]
    fn test_no_priority_start_skips_priority_phase() {
        let mut event = event_with_calendar();
        event.priority_signup_start = None;
        assert_eq!(classify_window(&event, at(9, 0)), Window::Future);
    }

    #[test]
    fn test_current_wave_progression() {
        // Four waves over a two-hour priority period: one every 30 minutes.
        let event = event_with_calendar();
        assert_eq!(current_wave(&event, at(7, 0)), 0);
        assert_eq!(current_wave(&event, at(8, 0)), 1);
        assert_eq!(current_wave(&event, at(8, 29)), 1);
        assert_eq!(current_wave(&event, at(8, 30)), 2);
        assert_eq!(current_wave(&event, at(9, 0)), 3);
        assert_eq!(current_wave(&event, at(9, 30)), 4);
        assert_eq!(current_wave(&event, at(9, 59)), 4);
        // General signup opens everything.
        assert_eq!(current_wave(&event, at(10, 0)), 5);
    }

    #[test]
    fn test_current_wave_unrestricted_without_waves() {
        let mut event = event_with_calendar();
        event.signup_waves = None;
        assert_eq!(current_wave(&event, at(8, 30)), UNRESTRICTED_WAVE);
    }

    #[test]
    fn test_starting_wave_even_split() {
        // 20 groups, 4 waves: positions 0-4 wave 1, 5-9 wave 2, ...
        let event = event_with_calendar();
        assert_eq!(starting_wave_for(&event, 0, None), 1);
        assert_eq!(starting_wave_for(&event, 4, None), 1);
        assert_eq!(starting_wave_for(&event, 5, None), 2);
        assert_eq!(starting_wave_for(&event, 19, None), 4);
    }

    #[test]
    fn test_starting_wave_uneven_split_front_loads() {
        // 10 groups, 3 waves: chunks of 4, 3, 3.
        let mut event = event_with_calendar();
        event.total_groups = Some(10);
        event.signup_waves = Some(3);
        assert_eq!(starting_wave_for(&event, 3, None), 1);
        assert_eq!(starting_wave_for(&event, 4, None), 2);
        assert_eq!(starting_wave_for(&event, 6, None), 2);
        assert_eq!(starting_wave_for(&event, 7, None), 3);
    }

    #[test]
    fn test_starting_wave_flattens_shotgun_positions() {
        let mut event = event_with_calendar();
        event.start_type = Some(StartType::Shotgun);
        // Hole 8, B group: position (8-1)*2 + 1 = 15 -> wave 4 of 20/4.
        assert_eq!(starting_wave_for(&event, 1, Some(8)), 4);
        // Hole 1, A group: position 0 -> wave 1.
        assert_eq!(starting_wave_for(&event, 0, Some(1)), 1);
    }

    #[test]
    fn test_positions_past_configured_groups_take_final_wave() {
        let event = event_with_calendar();
        assert_eq!(starting_wave_for(&event, 25, None), 4);
    }

    #[test]
    fn test_eligibility_rule() {
        let event = event_with_calendar();

        // Open window: always permitted.
        assert!(check_reservation_permitted(&event, at(11, 0), 19, None).is_ok());

        // Priority, wave 1 unlocked: front positions only.
        assert!(check_reservation_permitted(&event, at(8, 10), 2, None).is_ok());
        assert!(matches!(
            check_reservation_permitted(&event, at(8, 10), 19, None),
            Err(RegistrationError::WaveNotOpen { required_wave: 4 })
        ));

        // Outside any window: rejected before any lock is taken.
        assert!(matches!(
            check_reservation_permitted(&event, at(7, 0), 0, None),
            Err(RegistrationError::RegistrationNotOpen)
        ));
        assert!(matches!(
            check_reservation_permitted(&event, at(19, 0), 0, None),
            Err(RegistrationError::RegistrationNotOpen)
        ));
    }
}
