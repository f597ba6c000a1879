use std::io;
use std::path::Path;

use chrono::NaiveDate;
use csv::WriterBuilder;

use crate::display::day_label;
use crate::roster::RosterOutcome;

/// Writes the roster grid as CSV: one column per day, two rows per room
/// (primary seat first). Unfilled rooms show as `[EMPTY]`.
pub fn write_roster_grid<W: io::Write>(
    outcome: &RosterOutcome,
    start: NaiveDate,
    days: usize,
    rooms: usize,
    writer: W,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = WriterBuilder::new().from_writer(writer);

    let mut header = vec!["Room".to_string()];
    for day in 0..days {
        header.push(day_label(start, day));
    }
    wtr.write_record(&header)?;

    for room in 0..rooms {
        let mut primary_row = vec![format!("Room {}", room + 1)];
        let mut secondary_row = vec![String::new()];
        for day in 0..days {
            let slot = outcome
                .slots
                .iter()
                .find(|s| s.day == day && s.room == room);
            match slot {
                Some(s) => {
                    primary_row.push(s.primary.clone());
                    secondary_row.push(s.secondary.clone());
                }
                None => {
                    primary_row.push("[EMPTY]".to_string());
                    secondary_row.push("[EMPTY]".to_string());
                }
            }
        }
        wtr.write_record(&primary_row)?;
        wtr.write_record(&secondary_row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes the roster grid CSV to a file on disk.
pub fn export_roster_grid<P: AsRef<Path>>(
    outcome: &RosterOutcome,
    start: NaiveDate,
    days: usize,
    rooms: usize,
    csv_path: P,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = std::fs::File::create(csv_path)?;
    write_roster_grid(outcome, start, days, rooms, file)
}

/// Writes the final duty counts as CSV, faculty first.
pub fn write_duty_tallies<W: io::Write>(
    outcome: &RosterOutcome,
    writer: W,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = WriterBuilder::new().from_writer(writer);

    wtr.write_record(["role", "name", "duties"])?;
    for tally in &outcome.faculty_tallies {
        wtr.write_record(["faculty", &tally.name, &tally.duty_count.to_string()])?;
    }
    for tally in &outcome.staff_tallies {
        wtr.write_record(["staff", &tally.name, &tally.duty_count.to_string()])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes the duty-count CSV to a file on disk.
pub fn export_duty_tallies<P: AsRef<Path>>(
    outcome: &RosterOutcome,
    csv_path: P,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = std::fs::File::create(csv_path)?;
    write_duty_tallies(outcome, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{DutyTally, SlotRecord};

    fn outcome() -> RosterOutcome {
        RosterOutcome {
            slots: vec![
                SlotRecord {
                    day: 0,
                    room: 0,
                    primary: "Dr. Adams".to_string(),
                    secondary: "Cole".to_string(),
                },
                SlotRecord {
                    day: 1,
                    room: 0,
                    primary: "Dr. Baker".to_string(),
                    secondary: "Diaz".to_string(),
                },
            ],
            faculty_tallies: vec![DutyTally {
                name: "Dr. Adams".to_string(),
                duty_count: 1,
            }],
            staff_tallies: vec![DutyTally {
                name: "Cole".to_string(),
                duty_count: 1,
            }],
            findings: Vec::new(),
            seed: 1,
        }
    }

    #[test]
    fn grid_has_one_column_per_day_and_two_rows_per_room() {
        let start = NaiveDate::from_ymd_opt(2026, 9, 7).unwrap();
        let mut buffer = Vec::new();
        write_roster_grid(&outcome(), start, 2, 1, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Room,Mon 2026-09-07,Tue 2026-09-08");
        assert_eq!(lines[1], "Room 1,Dr. Adams,Dr. Baker");
        assert_eq!(lines[2], ",Cole,Diaz");
    }

    #[test]
    fn unfilled_rooms_are_marked_empty() {
        let start = NaiveDate::from_ymd_opt(2026, 9, 7).unwrap();
        let mut buffer = Vec::new();
        write_roster_grid(&outcome(), start, 2, 2, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("Room 2,[EMPTY],[EMPTY]"));
    }

    #[test]
    fn tallies_list_faculty_before_staff() {
        let mut buffer = Vec::new();
        write_duty_tallies(&outcome(), &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "role,name,duties");
        assert_eq!(lines[1], "faculty,Dr. Adams,1");
        assert_eq!(lines[2], "staff,Cole,1");
    }
}
