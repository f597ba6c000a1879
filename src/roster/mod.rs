//! Duty roster generation.
//!
//! The pipeline runs in fixed order: resolve the configuration, validate
//! and place pins, fill the remaining rooms greedily, repair residual
//! deviations by swapping, then validate the finished grid. All tie-breaks
//! go through one seeded RNG, so a run is fully reproducible from its seed.

pub mod config;
mod filler;
mod pins;
mod position;
mod repair;
mod tracker;
pub mod types;
mod validate;

use rand::rngs::StdRng;
use rand::SeedableRng;

use self::tracker::ConstraintTracker;
use self::types::{Finding, FindingKind, Person, Role};

pub use self::types::{
    DutyTally, PinRequest, RosterError, RosterOutcome, RosterRequest, SlotRecord,
};

/// Builds the combined people table: faculty first, then staff, each
/// ranked by their position in the input list.
fn build_people(request: &RosterRequest) -> Vec<Person> {
    let mut people = Vec::with_capacity(request.faculty.len() + request.staff.len());
    for (rank, name) in request.faculty.iter().enumerate() {
        people.push(Person {
            name: name.clone(),
            role: Role::Faculty,
            rank,
        });
    }
    for (rank, name) in request.staff.iter().enumerate() {
        people.push(Person {
            name: name.clone(),
            role: Role::Staff,
            rank,
        });
    }
    people
}

/// Runs the full generation pipeline for one request.
///
/// Fatal problems (bad grid, impossible capacity, invalid pins) come back
/// as errors; everything the heuristics could not fix comes back as
/// findings on an otherwise complete outcome.
pub fn generate_roster(request: &RosterRequest) -> Result<RosterOutcome, RosterError> {
    let config = config::resolve_config(
        request.faculty.len(),
        request.staff.len(),
        request.days,
        request.rooms,
    )?;
    let mut tracker = ConstraintTracker::new(build_people(request), config);
    let resolved_pins = pins::validate_pins(&request.pins, &tracker)?;

    let seed = request.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);
    log::info!(
        "generating roster: {} faculty, {} staff, {} days x {} rooms, seed {}",
        request.faculty.len(),
        request.staff.len(),
        request.days,
        request.rooms,
        seed
    );

    let unsatisfied = pins::place_pins(&mut tracker, &resolved_pins, &mut rng);
    filler::fill_rooms(&mut tracker, &mut rng);
    repair::repair_roster(&mut tracker, &mut rng);

    let mut findings = validate::validate_roster(&tracker);
    for pin in unsatisfied {
        findings.push(Finding::new(
            FindingKind::UnsatisfiablePin,
            format!(
                "pin for '{}' on day index {} could not be honored",
                pin.name, pin.day
            ),
        ));
    }
    log::info!("roster complete: {} findings", findings.len());

    Ok(RosterOutcome {
        slots: tracker.slot_records(),
        faculty_tallies: tracker.tallies(Role::Faculty),
        staff_tallies: tracker.tallies(Role::Staff),
        findings,
        seed,
    })
}
