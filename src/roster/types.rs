use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Index into the combined people table (faculty first, then staff).
pub type PersonId = usize;

/// Which population a person belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Faculty,
    Staff,
}

/// A rosterable person. Rank is the position within their own population's
/// input list: lower rank = more senior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub role: Role,
    pub rank: usize,
}

/// An externally supplied obligation: this person must serve on this day.
/// `day` is a 0-based day index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinRequest {
    pub name: String,
    pub day: usize,
}

/// One filled room on one day. The two occupants are always distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub primary: PersonId,
    pub secondary: PersonId,
}

/// Everything needed for one generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterRequest {
    /// Faculty names in seniority order (most senior first).
    pub faculty: Vec<String>,
    /// Staff names in seniority order (most senior first).
    pub staff: Vec<String>,
    pub days: usize,
    pub rooms: usize,
    #[serde(default)]
    pub pins: Vec<PinRequest>,
    /// Fixed seed for the tie-breaking RNG. Absent = drawn from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// One slot of the finished roster, in output form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRecord {
    pub day: usize,
    pub room: usize,
    pub primary: String,
    pub secondary: String,
}

/// Final duty count for one person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutyTally {
    pub name: String,
    pub duty_count: u32,
}

/// Categories of validator findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FindingKind {
    /// A room could not be filled with two eligible people.
    UnfilledRoom,
    /// A person holds more than one seat on the same day.
    DoubleBooking,
    /// A person sits in the same room on two consecutive days.
    ConsecutiveRoomRepeat,
    /// A staff member's final duty count misses the exact target.
    StaffTargetDeviation,
    /// A more senior faculty member out-counts a less senior one.
    SeniorityOrderViolation,
    /// The running duty counter disagrees with the grid tally.
    DutyCountMismatch,
    /// A pin request could not be honored.
    UnsatisfiablePin,
}

/// A single diagnostic produced by the validator (or the pin handler).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub message: String,
}

impl Finding {
    pub fn new(kind: FindingKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// The complete result of one generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterOutcome {
    /// All filled slots, ordered by day then room.
    pub slots: Vec<SlotRecord>,
    /// Faculty duty counts, sorted by descending count.
    pub faculty_tallies: Vec<DutyTally>,
    /// Staff duty counts, sorted by descending count.
    pub staff_tallies: Vec<DutyTally>,
    /// Non-fatal issues: unfilled rooms, residual deviations, unmet pins.
    pub findings: Vec<Finding>,
    /// The seed the run actually used (echoed back for reproducibility).
    pub seed: u64,
}

/// Fatal problems with the requested grid or populations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("days must be between 1 and 31, got {0}")]
    DaysOutOfRange(usize),
    #[error("rooms must be between 1 and 12, got {0}")]
    RoomsOutOfRange(usize),
    #[error("faculty list is empty")]
    NoFaculty,
    #[error("staff list is empty")]
    NoStaff,
}

/// Fatal mismatches between the grid size and the populations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapacityError {
    #[error(
        "grid too small: {staff} staff require {required} duties \
         but the grid only has {available} positions"
    )]
    StaffDemandExceedsGrid {
        staff: usize,
        required: u32,
        available: u32,
    },
    #[error("{people} people cannot fill {seats} distinct seats per day")]
    TooFewPeople { people: usize, seats: usize },
}

/// Categories of pin-request problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PinIssueKind {
    UnknownPerson,
    DayOutOfRange,
    DuplicatePin,
    DayOverCapacity,
}

/// One problem with the supplied pin requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinIssue {
    pub kind: PinIssueKind,
    pub message: String,
}

impl PinIssue {
    pub fn new(kind: PinIssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

fn join_pin_issues(issues: &[PinIssue]) -> String {
    issues
        .iter()
        .map(|i| i.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Top-level error type for a generation run. Pin validation reports every
/// issue found in the batch, not just the first.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Capacity(#[from] CapacityError),
    #[error("invalid pin requests: {}", join_pin_issues(.0))]
    PinValidation(Vec<PinIssue>),
}
