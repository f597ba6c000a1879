mod display;
mod export;
mod parser;
mod roster;
mod web;

use chrono::Local;

use display::{print_duty_bars, print_roster, write_roster_to_file};
use export::{export_duty_tallies, export_roster_grid};
use parser::{load_people, load_pins};
use roster::types::Role;
use roster::{generate_roster, RosterRequest};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Check if we should run in web mode
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "web" {
        let port = args
            .get(2)
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);
        let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string()); // Default password, change this!

        println!("Starting web server on port {}...", port);
        println!("Access the site at http://localhost:{}", port);

        web::start_server(port, password).await?;
        return Ok(());
    }

    // CLI mode: <people.csv> <days> <rooms> [pins.csv|-] [seed]
    if args.len() < 4 {
        eprintln!("Usage: {} <people.csv> <days> <rooms> [pins.csv|-] [seed]", args[0]);
        eprintln!("       {} web [port]", args[0]);
        std::process::exit(2);
    }

    let people_path = &args[1];
    let days: usize = args[2].parse()?;
    let rooms: usize = args[3].parse()?;

    println!("Loading people from {}...", people_path);
    let people = load_people(people_path)?;
    let faculty: Vec<String> = people
        .iter()
        .filter(|p| p.role == Role::Faculty)
        .map(|p| p.name.clone())
        .collect();
    let staff: Vec<String> = people
        .iter()
        .filter(|p| p.role == Role::Staff)
        .map(|p| p.name.clone())
        .collect();
    println!("Loaded {} faculty and {} staff", faculty.len(), staff.len());

    let pins = match args.get(4).map(String::as_str) {
        Some("-") | None => Vec::new(),
        Some(path) => {
            let pins = load_pins(path)?;
            println!("Loaded {} pin requests from {}", pins.len(), path);
            pins
        }
    };
    let seed = match args.get(5) {
        Some(s) => Some(s.parse::<u64>()?),
        None => None,
    };

    let request = RosterRequest {
        faculty,
        staff,
        days,
        rooms,
        pins,
        seed,
    };

    println!("\n=== Generating Roster ===");
    let outcome = generate_roster(&request)?;

    let start = Local::now().date_naive();
    print_roster(&outcome, start, days, rooms);
    print_duty_bars(&outcome);

    println!("\n=== Writing Roster to Files ===");
    write_roster_to_file(&outcome, start, days, rooms, "roster.txt")?;
    export_roster_grid(&outcome, start, days, rooms, "roster_grid.csv")?;
    export_duty_tallies(&outcome, "duty_counts.csv")?;
    println!("Roster saved to:");
    println!("  - roster.txt");
    println!("  - roster_grid.csv");
    println!("  - duty_counts.csv");

    Ok(())
}
