use std::fs::File;
use std::io::Write;

use chrono::{Duration, NaiveDate};

use crate::roster::{DutyTally, RosterOutcome};

/// Calendar label for a 0-based day index, e.g. "Mon 2026-09-07".
pub fn day_label(start: NaiveDate, day: usize) -> String {
    (start + Duration::days(day as i64))
        .format("%a %Y-%m-%d")
        .to_string()
}

/// Prints the finished roster in a readable format, one block per day.
pub fn print_roster(outcome: &RosterOutcome, start: NaiveDate, days: usize, rooms: usize) {
    println!("\n=== Duty Roster (seed {}) ===", outcome.seed);

    for day in 0..days {
        println!("\n{}", day_label(start, day));
        for room in 0..rooms {
            let slot = outcome
                .slots
                .iter()
                .find(|s| s.day == day && s.room == room);
            match slot {
                Some(s) => println!("  Room {} -> {} / {}", room + 1, s.primary, s.secondary),
                None => println!("  Room {} -> [EMPTY]", room + 1),
            }
        }
    }

    if !outcome.findings.is_empty() {
        println!("\nFindings ({}):", outcome.findings.len());
        for finding in &outcome.findings {
            println!("  - {:?}: {}", finding.kind, finding.message);
        }
    }
}

/// Prints duty counts as a bar chart, one section per population.
pub fn print_duty_bars(outcome: &RosterOutcome) {
    println!("\n=== Duty Counts ===");
    print_tally_section("Faculty", &outcome.faculty_tallies);
    print_tally_section("Staff", &outcome.staff_tallies);
}

fn print_tally_section(title: &str, tallies: &[DutyTally]) {
    println!("\n{}:", title);
    let width = tallies.iter().map(|t| t.name.len()).max().unwrap_or(0);
    for tally in tallies {
        println!(
            "  {:width$}  {:2}  {}",
            tally.name,
            tally.duty_count,
            "#".repeat(tally.duty_count as usize),
            width = width
        );
    }
}

/// Writes the roster to a plain-text file, one line per room per day.
pub fn write_roster_to_file(
    outcome: &RosterOutcome,
    start: NaiveDate,
    days: usize,
    rooms: usize,
    filename: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = File::create(filename)?;

    writeln!(file, "** Duty Roster (seed {}) **", outcome.seed)?;
    for day in 0..days {
        writeln!(file, "\n{}", day_label(start, day))?;
        for room in 0..rooms {
            let slot = outcome
                .slots
                .iter()
                .find(|s| s.day == day && s.room == room);
            match slot {
                Some(s) => writeln!(file, "Room {}: {} / {}", room + 1, s.primary, s.secondary)?,
                None => writeln!(file, "Room {}: [EMPTY]", room + 1)?,
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_labels_advance_from_the_start_date() {
        let start = NaiveDate::from_ymd_opt(2026, 9, 7).unwrap();
        assert_eq!(day_label(start, 0), "Mon 2026-09-07");
        assert_eq!(day_label(start, 6), "Sun 2026-09-13");
    }
}
