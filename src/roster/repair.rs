use std::cmp::Reverse;

use rand::rngs::StdRng;

use super::filler::pick_preferred;
use super::tracker::ConstraintTracker;
use super::types::{PersonId, Role};
use super::validate::seniority_violations;

/// Upper bound on swaps per correction phase. Guarantees termination even
/// when a deviation cannot be repaired.
const SWAP_BUDGET: usize = 100;

/// Runs the three correction phases in order: exact staff targets, the
/// faculty seniority hierarchy, then general fairness smoothing. Each phase
/// respects protection, the hard constraints and its own swap budget.
pub fn repair_roster(tracker: &mut ConstraintTracker, rng: &mut StdRng) {
    correct_staff_targets(tracker, rng);
    correct_seniority_order(tracker);
    smooth_faculty_load(tracker);
}

fn correct_staff_targets(tracker: &mut ConstraintTracker, rng: &mut StdRng) {
    let target = tracker.config().staff_duty_target;
    let staff = tracker.staff_ids();
    let mut budget = SWAP_BUDGET;

    // Staff above target hand assignments to faculty.
    loop {
        let mut progressed = false;
        for &s in &staff {
            while tracker.duty(s) > target && budget > 0 {
                if !hand_off_to_faculty(tracker, s, rng) {
                    break;
                }
                budget -= 1;
                progressed = true;
            }
        }
        if !progressed || budget == 0 {
            break;
        }
    }

    // Staff below target take over faculty-held secondary seats.
    loop {
        let mut progressed = false;
        for &s in &staff {
            while tracker.duty(s) < target && budget > 0 {
                if !take_faculty_seat(tracker, s) {
                    break;
                }
                budget -= 1;
                progressed = true;
            }
        }
        if !progressed || budget == 0 {
            break;
        }
    }

    if budget == 0 {
        log::warn!("staff-target correction stopped early: swap budget exhausted");
    }
}

/// Finds one of this staff member's assignments that a faculty member can
/// take over. Tries a direct swap on every day first, then a two-move
/// chain that relocates a same-day occupant into the vacated room, and
/// only then relaxes the faculty duty ceiling (the seniority phase moves
/// any surplus between faculty afterwards). Pinned days are untouchable.
fn hand_off_to_faculty(tracker: &mut ConstraintTracker, s: PersonId, rng: &mut StdRng) -> bool {
    try_hand_off(tracker, s, false, rng) || try_hand_off(tracker, s, true, rng)
}

fn try_hand_off(
    tracker: &mut ConstraintTracker,
    s: PersonId,
    ignore_caps: bool,
    rng: &mut StdRng,
) -> bool {
    for day in 0..tracker.days() {
        let Some(room) = tracker.room_on(s, day) else {
            continue;
        };
        if tracker.is_protected(s, day) {
            continue;
        }
        let pool: Vec<PersonId> = tracker
            .faculty_ids()
            .into_iter()
            .filter(|&f| can_enter(tracker, f, day, room, ignore_caps))
            .collect();
        if let Some(f) = pick_preferred(tracker, &pool, false, rng) {
            tracker.replace_occupant(day, room, s, f);
            return true;
        }
    }
    // No direct swap exists: relocate a same-day occupant into the vacated
    // room so a faculty member blocked by the room rule can enter through
    // the room the occupant leaves behind.
    for day in 0..tracker.days() {
        let Some(room) = tracker.room_on(s, day) else {
            continue;
        };
        if tracker.is_protected(s, day) {
            continue;
        }
        let mut candidates: Vec<PersonId> = tracker
            .faculty_ids()
            .into_iter()
            .filter(|&f| {
                !tracker.is_assigned(f, day)
                    && (ignore_caps || tracker.duty(f) < tracker.duty_cap(f))
            })
            .collect();
        candidates.sort_by_key(|&f| (tracker.duty(f), Reverse(tracker.person(f).rank)));
        for f in candidates {
            if let Some((via_room, o)) = find_room_shuffle(tracker, day, room, f) {
                tracker.replace_occupant(day, via_room, o, f);
                tracker.replace_occupant(day, room, s, o);
                return true;
            }
        }
    }
    false
}

/// Whether this faculty member can take a seat in the given room that day.
fn can_enter(
    tracker: &ConstraintTracker,
    f: PersonId,
    day: usize,
    room: usize,
    ignore_caps: bool,
) -> bool {
    !tracker.is_assigned(f, day)
        && (ignore_caps || tracker.duty(f) < tracker.duty_cap(f))
        && !tracker.room_conflict(f, day, room)
}

/// A same-day relocation: an occupant of another room who may legally move
/// into `room`, provided `enterer` can take the seat the occupant leaves.
/// Returns the occupant's current room and id.
fn find_room_shuffle(
    tracker: &ConstraintTracker,
    day: usize,
    room: usize,
    enterer: PersonId,
) -> Option<(usize, PersonId)> {
    for via_room in 0..tracker.rooms() {
        if via_room == room {
            continue;
        }
        let Some(slot) = tracker.slot(day, via_room) else {
            continue;
        };
        if tracker.room_conflict(enterer, day, via_room) {
            continue;
        }
        for o in [slot.primary, slot.secondary] {
            if !tracker.is_protected(o, day) && !tracker.room_conflict(o, day, room) {
                return Some((via_room, o));
            }
        }
    }
    None
}

/// Seats an under-target staff member in a seat currently held by faculty
/// (either position), displacing the most loaded such member. Seats
/// blocked by the room rule are reached by relocating a same-day occupant
/// into the blocked room first.
fn take_faculty_seat(tracker: &mut ConstraintTracker, s: PersonId) -> bool {
    let mut best: Option<(usize, usize, PersonId)> = None;
    for day in 0..tracker.days() {
        if tracker.is_assigned(s, day) {
            continue;
        }
        for room in 0..tracker.rooms() {
            let Some(slot) = tracker.slot(day, room) else {
                continue;
            };
            for f in [slot.primary, slot.secondary] {
                if tracker.person(f).role != Role::Faculty
                    || tracker.is_protected(f, day)
                    || tracker.room_conflict(s, day, room)
                {
                    continue;
                }
                if best.map_or(true, |(_, _, b)| tracker.duty(f) > tracker.duty(b)) {
                    best = Some((day, room, f));
                }
            }
        }
    }
    if let Some((day, room, f)) = best {
        tracker.replace_occupant(day, room, f, s);
        return true;
    }
    // Every reachable faculty seat conflicts with the staff member's own
    // room history: enter through another room on the same day instead.
    for day in 0..tracker.days() {
        if tracker.is_assigned(s, day) {
            continue;
        }
        for room in 0..tracker.rooms() {
            let Some(slot) = tracker.slot(day, room) else {
                continue;
            };
            for f in [slot.primary, slot.secondary] {
                if tracker.person(f).role != Role::Faculty || tracker.is_protected(f, day) {
                    continue;
                }
                if let Some((via_room, o)) = find_room_shuffle(tracker, day, room, s) {
                    tracker.replace_occupant(day, via_room, o, s);
                    tracker.replace_occupant(day, room, f, o);
                    return true;
                }
            }
        }
    }
    false
}

fn correct_seniority_order(tracker: &mut ConstraintTracker) {
    let faculty = tracker.faculty_ids();
    let mut budget = SWAP_BUDGET;
    for _ in 0..faculty.len().max(2) {
        let mut changed = false;
        for (pos, &senior) in faculty.iter().enumerate() {
            for &junior in &faculty[pos + 1..] {
                while tracker.duty(senior) > tracker.duty(junior) && budget > 0 {
                    if creates_downstream_violation(tracker, junior) {
                        break;
                    }
                    let Some((day, room)) = find_transfer(tracker, senior, junior) else {
                        break;
                    };
                    tracker.replace_occupant(day, room, senior, junior);
                    budget -= 1;
                    changed = true;
                }
            }
        }
        if !changed || budget == 0 {
            break;
        }
    }
    if budget == 0 {
        log::warn!("seniority correction stopped early: swap budget exhausted");
    }
}

/// Would handing one more duty to this junior out-count somebody even less
/// senior?
fn creates_downstream_violation(tracker: &ConstraintTracker, junior: PersonId) -> bool {
    let new_count = tracker.duty(junior) + 1;
    let junior_rank = tracker.person(junior).rank;
    tracker
        .faculty_ids()
        .into_iter()
        .any(|k| tracker.person(k).rank > junior_rank && new_count > tracker.duty(k))
}

/// A legal (day, room) on which `from`'s assignment can move to `to`:
/// `from` unprotected there, `to` free, no consecutive-room repeat, and
/// `to` staying within their ceiling.
fn find_transfer(
    tracker: &ConstraintTracker,
    from: PersonId,
    to: PersonId,
) -> Option<(usize, usize)> {
    if tracker.duty(to) + 1 > tracker.duty_cap(to) {
        return None;
    }
    for day in 0..tracker.days() {
        let Some(room) = tracker.room_on(from, day) else {
            continue;
        };
        if tracker.is_protected(from, day)
            || tracker.is_assigned(to, day)
            || tracker.room_conflict(to, day, room)
        {
            continue;
        }
        return Some((day, room));
    }
    None
}

/// Nudges the most and least loaded faculty members toward the mean, one
/// assignment at a time, reverting any move that worsens the seniority
/// order.
fn smooth_faculty_load(tracker: &mut ConstraintTracker) {
    let faculty = tracker.faculty_ids();
    if faculty.len() < 2 {
        return;
    }
    let mut budget = SWAP_BUDGET;
    while budget > 0 {
        let Some(&hi) = faculty.iter().max_by_key(|&&f| tracker.duty(f)) else {
            return;
        };
        let Some(&lo) = faculty.iter().min_by_key(|&&f| tracker.duty(f)) else {
            return;
        };
        if tracker.duty(hi) - tracker.duty(lo) <= 1 {
            return;
        }
        let before = seniority_violations(tracker).len();
        let Some((day, room)) = find_transfer(tracker, hi, lo) else {
            return;
        };
        tracker.replace_occupant(day, room, hi, lo);
        budget -= 1;
        if seniority_violations(tracker).len() > before {
            tracker.replace_occupant(day, room, lo, hi);
            return;
        }
    }
}
