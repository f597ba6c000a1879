use std::collections::BTreeMap;

use super::tracker::ConstraintTracker;
use super::types::{Finding, FindingKind, PersonId};

/// Read-only final check. Recomputes every tally from the grid itself and
/// reports deviations as structured findings; never mutates state and is
/// never used for control flow.
pub fn validate_roster(tracker: &ConstraintTracker) -> Vec<Finding> {
    let mut findings = Vec::new();
    let days = tracker.days();
    let rooms = tracker.rooms();
    let mut tallies = vec![0u32; tracker.people().len()];

    for day in 0..days {
        let mut seats: BTreeMap<PersonId, u32> = BTreeMap::new();
        for room in 0..rooms {
            match tracker.slot(day, room) {
                None => findings.push(Finding::new(
                    FindingKind::UnfilledRoom,
                    format!("day {day}, room {room} could not be filled"),
                )),
                Some(slot) => {
                    for id in [slot.primary, slot.secondary] {
                        *seats.entry(id).or_insert(0) += 1;
                        tallies[id] += 1;
                    }
                }
            }
        }
        for (id, count) in seats {
            if count > 1 {
                findings.push(Finding::new(
                    FindingKind::DoubleBooking,
                    format!(
                        "'{}' holds {} seats on day {}",
                        tracker.person(id).name,
                        count,
                        day
                    ),
                ));
            }
        }
    }

    for day in 0..days.saturating_sub(1) {
        for room in 0..rooms {
            let (Some(today), Some(tomorrow)) =
                (tracker.slot(day, room), tracker.slot(day + 1, room))
            else {
                continue;
            };
            for id in [today.primary, today.secondary] {
                if id == tomorrow.primary || id == tomorrow.secondary {
                    findings.push(Finding::new(
                        FindingKind::ConsecutiveRoomRepeat,
                        format!(
                            "'{}' sits in room {} on both day {} and day {}",
                            tracker.person(id).name,
                            room,
                            day,
                            day + 1
                        ),
                    ));
                }
            }
        }
    }

    let target = tracker.config().staff_duty_target;
    for id in tracker.staff_ids() {
        if tallies[id] != target {
            findings.push(Finding::new(
                FindingKind::StaffTargetDeviation,
                format!(
                    "'{}' has {} duties, target is {}",
                    tracker.person(id).name,
                    tallies[id],
                    target
                ),
            ));
        }
    }

    for (senior, junior) in seniority_violations(tracker) {
        findings.push(Finding::new(
            FindingKind::SeniorityOrderViolation,
            format!(
                "'{}' ({} duties) out-counts the less senior '{}' ({} duties)",
                tracker.person(senior).name,
                tracker.duty(senior),
                tracker.person(junior).name,
                tracker.duty(junior)
            ),
        ));
    }

    for id in tracker.ids() {
        if tallies[id] != tracker.duty(id) {
            findings.push(Finding::new(
                FindingKind::DutyCountMismatch,
                format!(
                    "duty counter for '{}' says {} but the grid holds {}",
                    tracker.person(id).name,
                    tracker.duty(id),
                    tallies[id]
                ),
            ));
        }
    }

    findings
}

/// All ordered faculty pairs (senior, junior) where the senior member holds
/// more duties than the junior one. The hierarchy is a total order, so every
/// pair is checked, not just rank-adjacent ones.
pub fn seniority_violations(tracker: &ConstraintTracker) -> Vec<(PersonId, PersonId)> {
    let faculty = tracker.faculty_ids();
    let mut violations = Vec::new();
    for (pos, &senior) in faculty.iter().enumerate() {
        for &junior in &faculty[pos + 1..] {
            if tracker.duty(senior) > tracker.duty(junior) {
                violations.push((senior, junior));
            }
        }
    }
    violations
}
