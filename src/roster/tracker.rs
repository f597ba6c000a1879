use std::collections::HashSet;

use super::config::RosterConfig;
use super::position;
use super::types::{DutyTally, Person, PersonId, Role, Slot, SlotRecord};

/// The single mutable state of one generation run.
///
/// Owns the grid plus every counter the pipeline consults: duty counts,
/// per-person room history, per-day assignment sets and the protected
/// (person, day) pairs created by honored pins. All mutation goes through
/// `assign_pair` and `replace_occupant`, which keep the bookkeeping
/// consistent and re-apply the seat ordering rule.
pub struct ConstraintTracker {
    people: Vec<Person>,
    config: RosterConfig,
    grid: Vec<Vec<Option<Slot>>>,
    duties: Vec<u32>,
    room_history: Vec<Vec<Option<usize>>>,
    assigned: Vec<HashSet<PersonId>>,
    protected: HashSet<(PersonId, usize)>,
}

impl ConstraintTracker {
    pub fn new(people: Vec<Person>, config: RosterConfig) -> Self {
        let count = people.len();
        let days = config.days;
        let rooms = config.rooms;
        Self {
            people,
            grid: vec![vec![None; rooms]; days],
            duties: vec![0; count],
            room_history: vec![vec![None; days]; count],
            assigned: vec![HashSet::new(); days],
            protected: HashSet::new(),
            config,
        }
    }

    pub fn config(&self) -> &RosterConfig {
        &self.config
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn person(&self, id: PersonId) -> &Person {
        &self.people[id]
    }

    pub fn days(&self) -> usize {
        self.config.days
    }

    pub fn rooms(&self) -> usize {
        self.config.rooms
    }

    pub fn ids(&self) -> std::ops::Range<PersonId> {
        0..self.people.len()
    }

    /// Faculty ids in seniority order.
    pub fn faculty_ids(&self) -> Vec<PersonId> {
        self.ids()
            .filter(|&id| self.people[id].role == Role::Faculty)
            .collect()
    }

    /// Staff ids in seniority order.
    pub fn staff_ids(&self) -> Vec<PersonId> {
        self.ids()
            .filter(|&id| self.people[id].role == Role::Staff)
            .collect()
    }

    pub fn duty(&self, id: PersonId) -> u32 {
        self.duties[id]
    }

    /// Individual duty ceiling: the rank-stratified cap for faculty, the
    /// exact target for staff.
    pub fn duty_cap(&self, id: PersonId) -> u32 {
        let person = &self.people[id];
        match person.role {
            Role::Faculty => self.config.faculty_caps[person.rank],
            Role::Staff => self.config.staff_duty_target,
        }
    }

    pub fn slot(&self, day: usize, room: usize) -> Option<Slot> {
        self.grid[day][room]
    }

    pub fn is_assigned(&self, id: PersonId, day: usize) -> bool {
        self.assigned[day].contains(&id)
    }

    /// The room this person holds on the given day, if any.
    pub fn room_on(&self, id: PersonId, day: usize) -> Option<usize> {
        self.room_history[id][day]
    }

    /// True if placing this person in this room would repeat the room from
    /// the previous day or collide with the next one.
    pub fn room_conflict(&self, id: PersonId, day: usize, room: usize) -> bool {
        let history = &self.room_history[id];
        (day > 0 && history[day - 1] == Some(room))
            || (day + 1 < self.config.days && history[day + 1] == Some(room))
    }

    /// Full eligibility for a seat: free that day, under the individual
    /// duty ceiling, no consecutive-room repeat.
    pub fn is_eligible(&self, id: PersonId, day: usize, room: usize) -> bool {
        !self.is_assigned(id, day)
            && self.duties[id] < self.duty_cap(id)
            && !self.room_conflict(id, day, room)
    }

    pub fn protect(&mut self, id: PersonId, day: usize) {
        self.protected.insert((id, day));
    }

    pub fn is_protected(&self, id: PersonId, day: usize) -> bool {
        self.protected.contains(&(id, day))
    }

    /// Number of staff assignments on a day (either seat counts).
    pub fn staff_count_on(&self, day: usize) -> u32 {
        self.assigned[day]
            .iter()
            .filter(|&&id| self.people[id].role == Role::Staff)
            .count() as u32
    }

    /// Fills an open slot with a pair. Seats are ordered by the resolver.
    pub fn assign_pair(&mut self, day: usize, room: usize, a: PersonId, b: PersonId) {
        debug_assert_ne!(a, b, "a slot needs two distinct people");
        debug_assert!(self.grid[day][room].is_none(), "slot already filled");
        let slot = position::resolve_slot(&self.people, Slot {
            primary: a,
            secondary: b,
        });
        self.grid[day][room] = Some(slot);
        for id in [a, b] {
            self.duties[id] += 1;
            self.room_history[id][day] = Some(room);
            self.assigned[day].insert(id);
        }
    }

    /// Swaps one occupant of a filled slot for another person, updating all
    /// counters and re-resolving the seat order.
    pub fn replace_occupant(&mut self, day: usize, room: usize, out: PersonId, inn: PersonId) {
        let Some(slot) = self.grid[day][room] else {
            debug_assert!(false, "replace_occupant on an empty slot");
            return;
        };
        debug_assert!(slot.primary == out || slot.secondary == out);
        let remaining = if slot.primary == out {
            slot.secondary
        } else {
            slot.primary
        };
        self.duties[out] -= 1;
        self.duties[inn] += 1;
        self.assigned[day].remove(&out);
        self.assigned[day].insert(inn);
        self.room_history[out][day] = None;
        self.room_history[inn][day] = Some(room);
        self.grid[day][room] = Some(position::resolve_slot(&self.people, Slot {
            primary: remaining,
            secondary: inn,
        }));
    }

    /// The finished grid as flat output records, ordered by day then room.
    pub fn slot_records(&self) -> Vec<SlotRecord> {
        let mut records = Vec::new();
        for (day, rooms) in self.grid.iter().enumerate() {
            for (room, slot) in rooms.iter().enumerate() {
                if let Some(slot) = slot {
                    records.push(SlotRecord {
                        day,
                        room,
                        primary: self.people[slot.primary].name.clone(),
                        secondary: self.people[slot.secondary].name.clone(),
                    });
                }
            }
        }
        records
    }

    /// Duty counts for one population, sorted by descending count
    /// (seniority breaks ties).
    pub fn tallies(&self, role: Role) -> Vec<DutyTally> {
        let mut entries: Vec<(usize, u32, &str)> = self
            .ids()
            .filter(|&id| self.people[id].role == role)
            .map(|id| (self.people[id].rank, self.duties[id], self.people[id].name.as_str()))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        entries
            .into_iter()
            .map(|(_, duty_count, name)| DutyTally {
                name: name.to_string(),
                duty_count,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::config::resolve_config;

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

    #[test]
    fn assign_pair_updates_all_counters() {
        let mut t = tracker(3, 2, 4, 2);
        t.assign_pair(0, 1, 4, 0); // staff2 + fac1, resolver reorders
        let slot = t.slot(0, 1).unwrap();
        assert_eq!(slot.primary, 0);
        assert_eq!(slot.secondary, 4);
        assert_eq!(t.duty(0), 1);
        assert_eq!(t.duty(4), 1);
        assert!(t.is_assigned(0, 0));
        assert_eq!(t.room_on(4, 0), Some(1));
        assert_eq!(t.staff_count_on(0), 1);
    }

    #[test]
    fn room_conflict_looks_both_ways() {
        let mut t = tracker(3, 2, 4, 2);
        t.assign_pair(1, 0, 0, 3);
        assert!(t.room_conflict(0, 2, 0)); // was in room 0 yesterday
        assert!(t.room_conflict(0, 0, 0)); // will be in room 0 tomorrow
        assert!(!t.room_conflict(0, 2, 1));
        assert!(!t.room_conflict(1, 2, 0));
    }

    #[test]
    fn replace_occupant_moves_counters_and_reorders() {
        let mut t = tracker(3, 2, 4, 2);
        t.assign_pair(0, 0, 1, 3); // fac2 primary, staff1 secondary
        t.replace_occupant(0, 0, 1, 4); // staff2 replaces fac2
        let slot = t.slot(0, 0).unwrap();
        // Two staff now: the more senior one takes the primary seat.
        assert_eq!(slot.primary, 3);
        assert_eq!(slot.secondary, 4);
        assert_eq!(t.duty(1), 0);
        assert_eq!(t.duty(4), 1);
        assert!(!t.is_assigned(1, 0));
        assert_eq!(t.room_on(1, 0), None);
        assert_eq!(t.room_on(4, 0), Some(0));
    }

    #[test]
    fn protection_is_per_person_and_day() {
        let mut t = tracker(2, 2, 3, 1);
        t.protect(0, 1);
        assert!(t.is_protected(0, 1));
        assert!(!t.is_protected(0, 0));
        assert!(!t.is_protected(1, 1));
    }

    #[test]
    fn tallies_sort_by_descending_count() {
        let mut t = tracker(3, 2, 4, 2);
        t.assign_pair(0, 0, 0, 3);
        t.assign_pair(1, 1, 0, 3);
        t.assign_pair(2, 0, 0, 4);
        let faculty = t.tallies(Role::Faculty);
        assert_eq!(faculty[0].name, "fac1");
        assert_eq!(faculty[0].duty_count, 3);
        let staff = t.tallies(Role::Staff);
        assert_eq!(staff[0].name, "staff1");
        assert_eq!(staff[0].duty_count, 2);
        assert_eq!(staff[1].duty_count, 1);
    }
}
