//! # Schedule Math
//!
//! Pure, deterministic start-sheet arithmetic: tee times with starter gaps,
//! shotgun hole labels, and the dispatcher that picks between them. No I/O;
//! everything the math needs arrives as arguments.

use crate::error::{RegistrationError, Result};
use crate::models::{ClubEvent, Hole, RegistrationSlot, StartType};

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Parse a time string like "5:00 PM" or "12:30 AM" into minutes since
/// midnight.
pub fn parse_time(time_str: &str) -> Result<i64> {
    let trimmed = time_str.trim();
    let (clock, meridiem) = trimmed
        .rsplit_once(|c: char| c.is_whitespace())
        .ok_or_else(|| RegistrationError::Validation(format!("Invalid time format: {time_str}")))?;

    let (hour_str, minute_str) = clock
        .split_once(':')
        .ok_or_else(|| RegistrationError::Validation(format!("Invalid time format: {time_str}")))?;

    if minute_str.len() != 2 {
        return Err(RegistrationError::Validation(format!(
            "Invalid time format: {time_str}"
        )));
    }

    let mut hour: i64 = hour_str
        .parse()
        .map_err(|_| RegistrationError::Validation(format!("Invalid time format: {time_str}")))?;
    let minute: i64 = minute_str
        .parse()
        .map_err(|_| RegistrationError::Validation(format!("Invalid time format: {time_str}")))?;

    if !(1..=12).contains(&hour) {
        return Err(RegistrationError::Validation(format!(
            "Hour out of range in time: {time_str}"
        )));
    }
    if !(0..=59).contains(&minute) {
        return Err(RegistrationError::Validation(format!(
            "Minute out of range in time: {time_str}"
        )));
    }

    match meridiem.to_ascii_uppercase().as_str() {
        "AM" => {
            if hour == 12 {
                hour = 0;
            }
        }
        "PM" => {
            if hour != 12 {
                hour += 12;
            }
        }
        _ => {
            return Err(RegistrationError::Validation(format!(
                "Invalid time format: {time_str}"
            )))
        }
    }

    Ok(hour * 60 + minute)
}

/// Format minutes since midnight as "H:MM AM/PM", no leading zero on the
/// hour. Values past midnight wrap.
pub fn format_time(total_minutes: i64) -> String {
    let minutes = total_minutes.rem_euclid(MINUTES_PER_DAY);
    let hour24 = minutes / 60;
    let minute = minutes % 60;
    let meridiem = if hour24 >= 12 { "PM" } else { "AM" };
    let mut hour12 = hour24 % 12;
    if hour12 == 0 {
        hour12 = 12;
    }
    format!("{hour12}:{minute:02} {meridiem}")
}

/// Parse a splits string like "9" or "8,9" into minute intervals. The
/// intervals repeat cyclically across the tee sheet.
pub fn parse_tee_time_splits(splits: Option<&str>) -> Result<Vec<i64>> {
    let raw = splits
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| RegistrationError::Configuration("Missing tee time splits".to_string()))?;

    let values: Vec<i64> = raw
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            p.parse::<i64>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    RegistrationError::Configuration(format!("Invalid tee time split value: {p}"))
                })
        })
        .collect::<Result<_>>()?;

    if values.is_empty() {
        return Err(RegistrationError::Configuration(
            "Invalid tee time splits".to_string(),
        ));
    }

    Ok(values)
}

/// Calculate the tee time for a slot's starting order.
///
/// `starter_time_interval` N means every N filled tee times are followed by
/// one open gap, so the tee index advances by one extra interval per
/// completed group of N: `tee_index = order + order / N`. The floor is taken
/// once per completed interval, not per slot, so slot 0 is always the base
/// time.
pub fn compute_tee_time(event: &ClubEvent, slot_starting_order: i32) -> Result<String> {
    let start_time = event.start_time.as_deref().ok_or_else(|| {
        RegistrationError::Configuration("Missing event start time for tee time calculation".into())
    })?;
    let splits = parse_tee_time_splits(event.tee_time_splits.as_deref())?;
    let base_minutes = parse_time(start_time)?;

    if slot_starting_order < 0 {
        return Err(RegistrationError::Validation(
            "Starting order must be non-negative".to_string(),
        ));
    }

    let order = slot_starting_order as i64;
    let starter_interval = event.starter_time_interval as i64;
    let tee_index = if starter_interval > 0 {
        order + order / starter_interval
    } else {
        order
    };

    let offset: i64 = (0..tee_index)
        .map(|i| splits[(i % splits.len() as i64) as usize])
        .sum();

    Ok(format_time(base_minutes + offset))
}

/// Calculate a shotgun starting hole label like "8B". Only two groups start
/// from each hole, an "A" group and a "B" group.
pub fn compute_shotgun_start(hole_id: i64, holes: &[Hole], starting_order: i32) -> Result<String> {
    let hole = holes
        .iter()
        .find(|h| h.id == hole_id)
        .ok_or(RegistrationError::HoleNotFound { hole_id })?;

    let letter = match starting_order {
        0 => "A",
        1 => "B",
        other => {
            return Err(RegistrationError::Validation(format!(
                "Invalid starting order for shotgun start: {other}"
            )))
        }
    };

    Ok(format!("{}{}", hole.number, letter))
}

/// The human-facing start value for a slot: a tee time, a shotgun hole
/// label, or "N/A" when the event carries no course assignment.
pub fn get_start(event: &ClubEvent, slot: &RegistrationSlot, holes: &[Hole]) -> Result<String> {
    if !event.can_choose {
        return Ok("N/A".to_string());
    }

    match event.start_type {
        Some(StartType::TeeTimes) => compute_tee_time(event, slot.starting_order),
        Some(StartType::Shotgun) => {
            let hole_id = slot.hole_id.ok_or_else(|| {
                RegistrationError::Validation("Missing hole id for shotgun start".to_string())
            })?;
            compute_shotgun_start(hole_id, holes, slot.starting_order)
        }
        _ => Ok("N/A".to_string()),
    }
}
