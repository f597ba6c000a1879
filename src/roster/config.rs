use super::types::{CapacityError, ConfigError, RosterError};

pub const MIN_DAYS: usize = 1;
pub const MAX_DAYS: usize = 31;
pub const MIN_ROOMS: usize = 1;
pub const MAX_ROOMS: usize = 12;

/// Global numeric parameters derived from the populations and the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterConfig {
    pub days: usize,
    pub rooms: usize,
    /// Total seats in the grid: days * rooms * 2.
    pub total_positions: u32,
    /// Exact duty count every staff member must end with.
    pub staff_duty_target: u32,
    pub total_staff_duties: u32,
    pub total_faculty_duties: u32,
    /// Duty ceiling per faculty member, indexed by seniority rank.
    /// Non-decreasing: a more senior member never out-caps a junior.
    pub faculty_caps: Vec<u32>,
    /// Soft per-day minimum of staff assignments, used to steer the filler.
    pub min_staff_per_day: u32,
}

/// Derives the run configuration from population sizes and grid dimensions.
pub fn resolve_config(
    faculty: usize,
    staff: usize,
    days: usize,
    rooms: usize,
) -> Result<RosterConfig, RosterError> {
    if !(MIN_DAYS..=MAX_DAYS).contains(&days) {
        return Err(ConfigError::DaysOutOfRange(days).into());
    }
    if !(MIN_ROOMS..=MAX_ROOMS).contains(&rooms) {
        return Err(ConfigError::RoomsOutOfRange(rooms).into());
    }
    if faculty == 0 {
        return Err(ConfigError::NoFaculty.into());
    }
    if staff == 0 {
        return Err(ConfigError::NoStaff.into());
    }

    let total_positions = (days * rooms * 2) as u32;
    let staff_duty_target = 1.max(days as u32 - 1);
    let total_staff_duties = staff as u32 * staff_duty_target;

    if total_staff_duties > total_positions {
        return Err(CapacityError::StaffDemandExceedsGrid {
            staff,
            required: total_staff_duties,
            available: total_positions,
        }
        .into());
    }
    if faculty + staff < rooms * 2 {
        return Err(CapacityError::TooFewPeople {
            people: faculty + staff,
            seats: rooms * 2,
        }
        .into());
    }

    let total_faculty_duties = total_positions - total_staff_duties;
    let base = total_faculty_duties / faculty as u32;
    let remainder = (total_faculty_duties % faculty as u32) as usize;

    // The remainder goes to the least senior ranks, so caps never decrease
    // with falling seniority.
    let faculty_caps = (0..faculty)
        .map(|rank| base + u32::from(rank >= faculty - remainder))
        .collect();

    Ok(RosterConfig {
        days,
        rooms,
        total_positions,
        staff_duty_target,
        total_staff_duties,
        total_faculty_duties,
        faculty_caps,
        min_staff_per_day: total_staff_duties / days as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::types::{CapacityError, ConfigError, RosterError};

    #[test]
    fn derives_basic_parameters() {
        let config = resolve_config(5, 3, 6, 3).unwrap();
        assert_eq!(config.total_positions, 36);
        assert_eq!(config.staff_duty_target, 5);
        assert_eq!(config.total_staff_duties, 15);
        assert_eq!(config.total_faculty_duties, 21);
        assert_eq!(config.min_staff_per_day, 2);
    }

    #[test]
    fn caps_are_monotonic_with_remainder_on_juniors() {
        let config = resolve_config(5, 3, 6, 3).unwrap();
        // 21 duties over 5 ranks: base 4, remainder 1 to the least senior.
        assert_eq!(config.faculty_caps, vec![4, 4, 4, 4, 5]);
        for pair in config.faculty_caps.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
        let total: u32 = config.faculty_caps.iter().sum();
        assert_eq!(total, config.total_faculty_duties);
    }

    #[test]
    fn single_day_grid_still_targets_one_duty() {
        let config = resolve_config(3, 1, 1, 2).unwrap();
        assert_eq!(config.staff_duty_target, 1);
    }

    #[test]
    fn rejects_out_of_range_grid() {
        assert!(matches!(
            resolve_config(3, 3, 0, 2),
            Err(RosterError::Config(ConfigError::DaysOutOfRange(0)))
        ));
        assert!(matches!(
            resolve_config(3, 3, 6, 13),
            Err(RosterError::Config(ConfigError::RoomsOutOfRange(13)))
        ));
    }

    #[test]
    fn rejects_empty_populations() {
        assert!(matches!(
            resolve_config(0, 3, 6, 2),
            Err(RosterError::Config(ConfigError::NoFaculty))
        ));
        assert!(matches!(
            resolve_config(3, 0, 6, 2),
            Err(RosterError::Config(ConfigError::NoStaff))
        ));
    }

    #[test]
    fn rejects_staff_demand_beyond_grid() {
        // 5 staff * 5 duties = 25 > 24 positions on a 6x2 grid.
        let err = resolve_config(5, 5, 6, 2).unwrap_err();
        assert!(matches!(
            err,
            RosterError::Capacity(CapacityError::StaffDemandExceedsGrid {
                staff: 5,
                required: 25,
                available: 24,
            })
        ));
    }

    #[test]
    fn rejects_too_few_people_for_one_day() {
        let err = resolve_config(1, 2, 3, 4).unwrap_err();
        assert!(matches!(
            err,
            RosterError::Capacity(CapacityError::TooFewPeople { people: 3, seats: 8 })
        ));
    }
}
