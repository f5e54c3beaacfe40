//! # Group Labeler
//!
//! Computes the human-meaningful group identifier for the slots of one
//! registration. Weeknight-style events group by course and start value;
//! team events group by registration id, splitting a four-player
//! registration into two independent two-player teams when the event plays
//! in pairs.

use crate::error::{RegistrationError, Result};
use crate::models::{ClubEvent, EventType, RegistrationSlot};

/// Group label for a slot. `start_value` is the result of
/// [`crate::schedule::get_start`] and `all_slots_in_registration` the full
/// slot set sharing the slot's registration.
pub fn get_group(
    event: &ClubEvent,
    slot: &RegistrationSlot,
    start_value: &str,
    course_name: &str,
    all_slots_in_registration: &[RegistrationSlot],
) -> Result<String> {
    if event.event_type == EventType::Weeknight {
        // Tee times and shotgun starts both yield a distinguishing start
        // value, so one label form covers both.
        return Ok(format!("{course_name}-{start_value}"));
    }

    if !event.event_type.is_team_style() {
        // Meetings, open days and the like carry no start sheet worth
        // labeling; the registration id is the only stable handle.
        return Ok(slot
            .registration_id
            .map_or_else(|| "unknown".to_string(), |id| id.to_string()));
    }

    let registration_id = slot.registration_id.ok_or_else(|| {
        RegistrationError::Validation(
            "Missing registration id on slot for group calculation".to_string(),
        )
    })?;

    // A 4-player registration in a 2-player-team event fields two
    // independent teams that need independent standings; 2-player
    // registrations are already a single team.
    if event.team_size == 2 && all_slots_in_registration.len() == 4 {
        let mut sorted: Vec<&RegistrationSlot> = all_slots_in_registration.iter().collect();
        sorted.sort_by_key(|s| s.slot);
        let index = sorted
            .iter()
            .position(|s| s.id == slot.id)
            .ok_or_else(|| {
                RegistrationError::Validation(
                    "Slot is not a member of its own registration's slot set".to_string(),
                )
            })?;
        let suffix = if index < 2 { "a" } else { "b" };
        return Ok(format!("{registration_id}{suffix}"));
    }

    Ok(registration_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventType, RegistrationType, StartType};
    use crate::state_machine::SlotStatus;

    fn event(event_type: EventType, team_size: i32) -> ClubEvent {
        ClubEvent {
            id: 1,
            name: "Two-Man Shamble".to_string(),
            event_type,
            registration_type: RegistrationType::Member,
            start_type: Some(StartType::TeeTimes),
            can_choose: true,
            start_time: Some("5:00 PM".to_string()),
            tee_time_splits: Some("9".to_string()),
            starter_time_interval: 0,
            team_size,
            total_groups: None,
            registration_maximum: None,
            signup_start: None,
            priority_signup_start: None,
            signup_end: None,
            signup_waves: None,
        }
    }

    fn slots(registration_id: i64, count: usize) -> Vec<RegistrationSlot> {
        (0..count)
            .map(|i| RegistrationSlot {
                id: 100 + i as i64,
                event_id: 1,
                hole_id: None,
                registration_id: Some(registration_id),
                player_id: None,
                starting_order: i as i32,
                slot: i as i32,
                status: SlotStatus::Pending,
            })
            .collect()
    }

    #[test]
    fn test_weeknight_label_uses_course_and_start() {
        let event = event(EventType::Weeknight, 1);
        let all = slots(9, 1);
        let label = get_group(&event, &all[0], "5:09 PM", "East", &all).unwrap();
        assert_eq!(label, "East-5:09 PM");
    }

    #[test]
    fn test_non_weeknight_non_team_types_fall_back_to_registration_id() {
        for event_type in [EventType::Open, EventType::Meeting, EventType::MatchPlay] {
            let event = event(event_type, 1);
            let all = slots(9, 1);
            let label = get_group(&event, &all[0], "5:00 PM", "East", &all).unwrap();
            assert_eq!(label, "9");
        }
    }

    #[test]
    fn test_fallback_without_registration_id_is_unknown() {
        let event = event(EventType::Open, 1);
        let mut all = slots(9, 1);
        all[0].registration_id = None;
        let label = get_group(&event, &all[0], "5:00 PM", "East", &all).unwrap();
        assert_eq!(label, "unknown");
    }

    #[test]
    fn test_four_slots_split_into_two_teams() {
        let event = event(EventType::Other, 2);
        let all = slots(9, 4);
        let labels: Vec<String> = all
            .iter()
            .map(|s| get_group(&event, s, "N/A", "", &all).unwrap())
            .collect();
        assert_eq!(labels, vec!["9a", "9a", "9b", "9b"]);
    }

    #[test]
    fn test_two_slots_keep_bare_registration_id() {
        let event = event(EventType::Other, 2);
        let all = slots(9, 2);
        let labels: Vec<String> = all
            .iter()
            .map(|s| get_group(&event, s, "N/A", "", &all).unwrap())
            .collect();
        assert_eq!(labels, vec!["9", "9"]);
    }

    #[test]
    fn test_split_orders_by_slot_index() {
        let event = event(EventType::WeekendMajor, 2);
        let mut all = slots(42, 4);
        // Shuffle the slot indices; the split must follow `slot`, not the
        // order the rows arrive in.
        all[0].slot = 3;
        all[1].slot = 0;
        all[2].slot = 2;
        all[3].slot = 1;
        let label = get_group(&event, &all[0], "N/A", "", &all).unwrap();
        assert_eq!(label, "42b");
        let label = get_group(&event, &all[1], "N/A", "", &all).unwrap();
        assert_eq!(label, "42a");
    }

    #[test]
    fn test_missing_registration_id_is_an_error() {
        let event = event(EventType::Other, 2);
        let mut all = slots(9, 4);
        all[0].registration_id = None;
        let first = all[0].clone();
        assert!(matches!(
            get_group(&event, &first, "N/A", "", &all),
            Err(RegistrationError::Validation(_))
        ));
    }
}
