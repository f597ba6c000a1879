use csv::Reader;
use std::io;
use std::path::Path;

use crate::roster::types::{Person, PinRequest, Role};

/// Parses the people roster from CSV. Row order within each role is the
/// seniority order: the first faculty row is the most senior faculty
/// member, and likewise for staff.
///
/// Expected columns (matched by header substring, extra columns ignored):
/// * `name` - the person's display name, must be unique
/// * `role` - anything containing "faculty" or "staff"
pub fn parse_people<R: io::Read>(input: R) -> Result<Vec<Person>, Box<dyn std::error::Error>> {
    let mut reader = Reader::from_reader(input);

    let headers = reader.headers()?;
    let name_col = headers
        .iter()
        .position(|h| h.to_lowercase().contains("name"))
        .unwrap_or(0);
    let role_col = headers
        .iter()
        .position(|h| h.to_lowercase().contains("role"))
        .unwrap_or(1);

    let mut people: Vec<Person> = Vec::new();
    let mut faculty_rank = 0;
    let mut staff_rank = 0;

    for result in reader.records() {
        let record = result?;
        let name = record.get(name_col).unwrap_or("").trim().to_string();
        let role_text = record.get(role_col).unwrap_or("").trim().to_lowercase();

        // Skip incomplete rows
        if name.is_empty() || role_text.is_empty() {
            continue;
        }

        let (role, rank) = if role_text.contains("faculty") {
            let rank = faculty_rank;
            faculty_rank += 1;
            (Role::Faculty, rank)
        } else if role_text.contains("staff") {
            let rank = staff_rank;
            staff_rank += 1;
            (Role::Staff, rank)
        } else {
            return Err(format!("row for '{}' has unknown role '{}'", name, role_text).into());
        };

        if people.iter().any(|p| p.name == name) {
            return Err(format!("duplicate person '{}' in people file", name).into());
        }
        people.push(Person { name, role, rank });
    }

    Ok(people)
}

/// Loads the people roster from a CSV file on disk.
pub fn load_people<P: AsRef<Path>>(csv_path: P) -> Result<Vec<Person>, Box<dyn std::error::Error>> {
    let file = std::fs::File::open(csv_path)?;
    parse_people(file)
}

/// Parses pin requests from CSV. Days in the file are 1-based (day 1 is
/// the first roster day); they come back 0-based.
///
/// Expected columns (matched by header substring): `name`, `day`.
pub fn parse_pins<R: io::Read>(input: R) -> Result<Vec<PinRequest>, Box<dyn std::error::Error>> {
    let mut reader = Reader::from_reader(input);

    let headers = reader.headers()?;
    let name_col = headers
        .iter()
        .position(|h| h.to_lowercase().contains("name"))
        .unwrap_or(0);
    let day_col = headers
        .iter()
        .position(|h| h.to_lowercase().contains("day"))
        .unwrap_or(1);

    let mut pins = Vec::new();
    for result in reader.records() {
        let record = result?;
        let name = record.get(name_col).unwrap_or("").trim().to_string();
        let day_text = record.get(day_col).unwrap_or("").trim();
        if name.is_empty() || day_text.is_empty() {
            continue;
        }
        let day: usize = day_text
            .parse()
            .map_err(|_| format!("pin for '{}' has non-numeric day '{}'", name, day_text))?;
        if day == 0 {
            return Err(format!("pin for '{}' names day 0; days are numbered from 1", name).into());
        }
        pins.push(PinRequest { name, day: day - 1 });
    }

    Ok(pins)
}

/// Loads pin requests from a CSV file on disk.
pub fn load_pins<P: AsRef<Path>>(
    csv_path: P,
) -> Result<Vec<PinRequest>, Box<dyn std::error::Error>> {
    let file = std::fs::File::open(csv_path)?;
    parse_pins(file)
}
