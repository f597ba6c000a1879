use actix_web::{middleware, web, App, HttpRequest, HttpResponse, HttpServer, Result};
use actix_files::Files;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::parser::parse_people;
use crate::roster::types::Role;
use crate::roster::{generate_roster, DutyTally, RosterError, RosterOutcome, RosterRequest};

// In-memory storage for the latest roster (in production, use a database)
pub struct AppState {
    pub outcome: Mutex<Option<RosterOutcome>>,
    pub admin_password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    password: String,
}

#[derive(Deserialize)]
pub struct UploadParams {
    days: usize,
    rooms: usize,
    seed: Option<u64>,
}

#[derive(Serialize)]
pub struct StatsResponse {
    total_slots: usize,
    seed: u64,
    findings_by_kind: HashMap<String, u32>,
    faculty_tallies: Vec<DutyTally>,
    staff_tallies: Vec<DutyTally>,
}

fn is_authorized(req: &HttpRequest, state: &AppState) -> bool {
    let password = req
        .headers()
        .get("X-Admin-Password")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    password == state.admin_password
}

fn error_status(err: &RosterError) -> HttpResponse {
    match err {
        // Bad input, not a server fault
        RosterError::Config(_) | RosterError::Capacity(_) | RosterError::PinValidation(_) => {
            HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "error": err.to_string()
            }))
        }
    }
}

// Admin login endpoint
async fn admin_login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if req.password == state.admin_password {
        Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
    } else {
        Ok(HttpResponse::Unauthorized()
            .json(serde_json::json!({"success": false, "error": "Invalid password"})))
    }
}

// Admin CSV upload endpoint: body is the people CSV, grid comes in the query
async fn admin_upload(
    req: HttpRequest,
    params: web::Query<UploadParams>,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_authorized(&req, &state) {
        return Ok(HttpResponse::Unauthorized()
            .json(serde_json::json!({"success": false, "error": "Unauthorized"})));
    }

    let people = match parse_people(&body[..]) {
        Ok(people) => people,
        Err(e) => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "error": format!("Failed to parse CSV: {}", e)
            })))
        }
    };

    let request = RosterRequest {
        faculty: people
            .iter()
            .filter(|p| p.role == Role::Faculty)
            .map(|p| p.name.clone())
            .collect(),
        staff: people
            .iter()
            .filter(|p| p.role == Role::Staff)
            .map(|p| p.name.clone())
            .collect(),
        days: params.days,
        rooms: params.rooms,
        pins: Vec::new(),
        seed: params.seed,
    };

    match generate_roster(&request) {
        Ok(outcome) => {
            let findings = outcome.findings.len();
            *state.outcome.lock().unwrap() = Some(outcome);
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "message": format!("Roster generated with {} findings", findings)
            })))
        }
        Err(e) => Ok(error_status(&e)),
    }
}

// Full-request generation endpoint (JSON body, supports pins)
async fn generate(
    req: HttpRequest,
    request: web::Json<RosterRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_authorized(&req, &state) {
        return Ok(HttpResponse::Unauthorized()
            .json(serde_json::json!({"success": false, "error": "Unauthorized"})));
    }

    match generate_roster(&request) {
        Ok(outcome) => {
            let response = HttpResponse::Ok().json(&outcome);
            *state.outcome.lock().unwrap() = Some(outcome);
            Ok(response)
        }
        Err(e) => Ok(error_status(&e)),
    }
}

// Roster endpoint
async fn get_roster(state: web::Data<AppState>) -> Result<HttpResponse> {
    let outcome = state.outcome.lock().unwrap();
    if let Some(ref outcome) = *outcome {
        Ok(HttpResponse::Ok().json(outcome))
    } else {
        Ok(HttpResponse::NotFound().json(serde_json::json!({"error": "No roster available"})))
    }
}

// Stats endpoint
async fn get_stats(state: web::Data<AppState>) -> Result<HttpResponse> {
    let outcome = state.outcome.lock().unwrap();
    if let Some(ref outcome) = *outcome {
        let mut findings_by_kind: HashMap<String, u32> = HashMap::new();
        for finding in &outcome.findings {
            *findings_by_kind
                .entry(format!("{:?}", finding.kind))
                .or_insert(0) += 1;
        }
        Ok(HttpResponse::Ok().json(StatsResponse {
            total_slots: outcome.slots.len(),
            seed: outcome.seed,
            findings_by_kind,
            faculty_tallies: outcome.faculty_tallies.clone(),
            staff_tallies: outcome.staff_tallies.clone(),
        }))
    } else {
        Ok(HttpResponse::NotFound().json(serde_json::json!({"error": "No roster available"})))
    }
}

// HTML page handler
async fn index() -> Result<HttpResponse> {
    let html = include_str!("../static/index.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

pub async fn start_server(port: u16, admin_password: String) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState {
        outcome: Mutex::new(None),
        admin_password,
    });

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .service(Files::new("/static", "static").show_files_listing())
            .route("/", web::get().to(index))
            .route("/api/login", web::post().to(admin_login))
            .route("/api/upload", web::post().to(admin_upload))
            .route("/api/generate", web::post().to(generate))
            .route("/api/roster", web::get().to(get_roster))
            .route("/api/stats", web::get().to(get_stats))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
