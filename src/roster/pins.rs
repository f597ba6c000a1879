use std::collections::{HashMap, HashSet};

use rand::rngs::StdRng;

use super::filler::pick_preferred;
use super::tracker::ConstraintTracker;
use super::types::{PersonId, PinIssue, PinIssueKind, PinRequest, RosterError};

/// Checks the whole pin batch and reports every problem found, not just the
/// first. Returns the resolved (person, day) pairs on success.
pub fn validate_pins(
    pins: &[PinRequest],
    tracker: &ConstraintTracker,
) -> Result<Vec<(PersonId, usize)>, RosterError> {
    let by_name: HashMap<&str, PersonId> = tracker
        .people()
        .iter()
        .enumerate()
        .map(|(id, p)| (p.name.as_str(), id))
        .collect();

    let mut issues = Vec::new();
    let mut seen = HashSet::new();
    let mut per_day: HashMap<usize, u32> = HashMap::new();
    let mut resolved = Vec::new();

    for pin in pins {
        let Some(&id) = by_name.get(pin.name.as_str()) else {
            issues.push(PinIssue::new(
                PinIssueKind::UnknownPerson,
                format!("pin references unknown person '{}'", pin.name),
            ));
            continue;
        };
        if pin.day >= tracker.days() {
            issues.push(PinIssue::new(
                PinIssueKind::DayOutOfRange,
                format!(
                    "pin for '{}' names day index {} outside 0..{}",
                    pin.name,
                    pin.day,
                    tracker.days()
                ),
            ));
            continue;
        }
        if !seen.insert((id, pin.day)) {
            issues.push(PinIssue::new(
                PinIssueKind::DuplicatePin,
                format!("duplicate pin for '{}' on day index {}", pin.name, pin.day),
            ));
            continue;
        }
        *per_day.entry(pin.day).or_insert(0) += 1;
        resolved.push((id, pin.day));
    }

    let rooms = tracker.rooms() as u32;
    let mut crowded: Vec<usize> = per_day
        .iter()
        .filter(|&(_, &count)| count > rooms)
        .map(|(&day, _)| day)
        .collect();
    crowded.sort_unstable();
    for day in crowded {
        issues.push(PinIssue::new(
            PinIssueKind::DayOverCapacity,
            format!(
                "day index {} has {} pins but only {} rooms",
                day, per_day[&day], rooms
            ),
        ));
    }

    if issues.is_empty() {
        Ok(resolved)
    } else {
        Err(RosterError::PinValidation(issues))
    }
}

/// Places every validated pin, in day order, and marks the pinned person
/// protected for that day. Pins that cannot be seated are logged and
/// returned; they never abort the run.
pub fn place_pins(
    tracker: &mut ConstraintTracker,
    pins: &[(PersonId, usize)],
    rng: &mut StdRng,
) -> Vec<PinRequest> {
    let mut ordered: Vec<(PersonId, usize)> = pins.to_vec();
    ordered.sort_by_key(|&(_, day)| day);

    // People pinned on a given day are reserved for their own pin and must
    // not be drafted as partners for someone else's.
    let mut pinned_on_day: HashMap<usize, HashSet<PersonId>> = HashMap::new();
    for &(id, day) in &ordered {
        pinned_on_day.entry(day).or_default().insert(id);
    }

    let mut unsatisfied = Vec::new();
    for &(id, day) in &ordered {
        // Already seated on this day: just mark the protection.
        if tracker.is_assigned(id, day) {
            tracker.protect(id, day);
            continue;
        }
        if seat_pin(tracker, id, day, &pinned_on_day[&day], rng) {
            tracker.protect(id, day);
        } else {
            let name = tracker.person(id).name.clone();
            log::warn!("pin for '{}' on day index {} could not be seated", name, day);
            unsatisfied.push(PinRequest { name, day });
        }
    }
    unsatisfied
}

/// Scans rooms in fixed order and seats the pinned person with the best
/// available partner. Partner priority: fewest duties, then a member of the
/// population the day is still short on, then the less senior person,
/// random among exact ties.
fn seat_pin(
    tracker: &mut ConstraintTracker,
    id: PersonId,
    day: usize,
    reserved: &HashSet<PersonId>,
    rng: &mut StdRng,
) -> bool {
    for room in 0..tracker.rooms() {
        if tracker.slot(day, room).is_some() || tracker.room_conflict(id, day, room) {
            continue;
        }
        let prefer_staff = tracker.staff_count_on(day) < tracker.config().min_staff_per_day;
        let pool: Vec<PersonId> = tracker
            .ids()
            .filter(|&partner| {
                partner != id
                    && !reserved.contains(&partner)
                    && tracker.is_eligible(partner, day, room)
            })
            .collect();
        if let Some(partner) = pick_preferred(tracker, &pool, prefer_staff, rng) {
            tracker.assign_pair(day, room, id, partner);
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::config::resolve_config;
    use crate::roster::types::{Person, Role};
    use rand::SeedableRng;

    fn tracker(faculty: usize, staff: usize, days: usize, rooms: usize) -> ConstraintTracker {
        let config = resolve_config(faculty, staff, days, rooms).unwrap();
        let mut people = Vec::new();
        for rank in 0..faculty {
            people.push(Person {
                name: format!("fac{}", rank + 1),
                role: Role::Faculty,
                rank,
            });
        }
        for rank in 0..staff {
            people.push(Person {
                name: format!("staff{}", rank + 1),
                role: Role::Staff,
                rank,
            });
        }
        ConstraintTracker::new(people, config)
    }

    fn pin(name: &str, day: usize) -> PinRequest {
        PinRequest {
            name: name.to_string(),
            day,
        }
    }

    #[test]
    fn collects_every_validation_issue() {
        let t = tracker(3, 2, 4, 2);
        let pins = vec![
            pin("nobody", 0),
            pin("fac1", 9),
            pin("fac2", 1),
            pin("fac2", 1),
            // three pins on day 2 with only two rooms
            pin("fac1", 2),
            pin("fac3", 2),
            pin("staff1", 2),
        ];
        let err = validate_pins(&pins, &t).unwrap_err();
        let RosterError::PinValidation(issues) = err else {
            panic!("expected pin validation error");
        };
        let kinds: Vec<PinIssueKind> = issues.iter().map(|i| i.kind).collect();
        assert!(kinds.contains(&PinIssueKind::UnknownPerson));
        assert!(kinds.contains(&PinIssueKind::DayOutOfRange));
        assert!(kinds.contains(&PinIssueKind::DuplicatePin));
        assert!(kinds.contains(&PinIssueKind::DayOverCapacity));
        assert_eq!(issues.len(), 4);
    }

    #[test]
    fn valid_batch_resolves_ids() {
        let t = tracker(3, 2, 4, 2);
        let pins = vec![pin("staff2", 3), pin("fac1", 0)];
        let resolved = validate_pins(&pins, &t).unwrap();
        assert_eq!(resolved, vec![(4, 3), (0, 0)]);
    }

    #[test]
    fn places_pin_and_protects_the_day() {
        let mut t = tracker(3, 2, 4, 2);
        let mut rng = StdRng::seed_from_u64(1);
        let unsatisfied = place_pins(&mut t, &[(4, 2)], &mut rng);
        assert!(unsatisfied.is_empty());
        assert!(t.is_assigned(4, 2));
        assert!(t.is_protected(4, 2));
        assert_eq!(t.duty(4), 1);
        // The partner shares the slot and is not protected.
        let room = t.room_on(4, 2).unwrap();
        let slot = t.slot(2, room).unwrap();
        let partner = if slot.primary == 4 {
            slot.secondary
        } else {
            slot.primary
        };
        assert_ne!(partner, 4);
        assert!(!t.is_protected(partner, 2));
    }

    #[test]
    fn two_pins_on_one_day_get_separate_rooms() {
        let mut t = tracker(3, 2, 4, 2);
        let mut rng = StdRng::seed_from_u64(1);
        let unsatisfied = place_pins(&mut t, &[(0, 1), (4, 1)], &mut rng);
        assert!(unsatisfied.is_empty());
        assert_ne!(t.room_on(0, 1), t.room_on(4, 1));
    }

    #[test]
    fn reports_unseatable_pin_without_aborting() {
        // One faculty + one staff, both pinned on the same day: each pin
        // reserves the other person, so neither can find a partner.
        let mut t = tracker(1, 1, 2, 1);
        let mut rng = StdRng::seed_from_u64(1);
        let unsatisfied = place_pins(&mut t, &[(0, 0), (1, 0)], &mut rng);
        assert_eq!(unsatisfied.len(), 2);
        assert!(t.slot(0, 0).is_none());
    }
}
