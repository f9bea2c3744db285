//! Public pages of a barbershop, addressed by its slug.

use super::AppState;
use crate::availability::{available_slots, SlotAvailability};
use crate::backend::BarbershopBackend;
use crate::booking::{self, find_barbershop, AppointmentDetails, ScheduleEntry};
use crate::configuration::Configuration;
use crate::error::BookingResult;
use crate::requests::{
    BookingRequest, ClientRegistrationRequest, PhoneRequest, ReviewRequest, SlotQuery,
};
use crate::types::{
    Appointment, Barbershop, Client, Employee, Notification, Review, Service, WorkingHours,
};
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{http::StatusCode, Json, Router};
use axum_valid::Valid;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarbershopPage {
    pub barbershop: Barbershop,
    pub services: Vec<Service>,
    pub employees: Vec<Employee>,
    pub working_hours: Vec<WorkingHours>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneVerification {
    pub registered: bool,
    pub client: Option<Client>,
}

pub fn router<B: BarbershopBackend, C: Configuration>() -> Router<AppState<B, C>> {
    Router::new()
        .route("/booking/{slug}", get(barbershop_page))
        .route("/booking/{slug}/services", get(services))
        .route("/booking/{slug}/employees", get(employees))
        .route(
            "/booking/{slug}/employees/{employee_id}/services",
            get(employee_services),
        )
        .route(
            "/booking/{slug}/employees/{employee_id}/schedule",
            get(employee_schedule),
        )
        .route("/booking/{slug}/slots/{employee_id}/{date}", get(slots))
        .route("/booking/{slug}/verify-phone", post(verify_phone))
        .route("/booking/{slug}/register", post(register))
        .route("/booking/{slug}/appointments", post(book))
        .route(
            "/booking/{slug}/clients/{phone}/appointments",
            get(client_appointments),
        )
        .route("/booking/{slug}/appointments/{id}/cancel", post(cancel))
        .route("/booking/{slug}/appointments/{id}/review", post(review))
        .route(
            "/booking/{slug}/clients/{phone}/notifications",
            get(notifications),
        )
        .route(
            "/booking/{slug}/clients/{phone}/notifications/{id}/read",
            post(mark_read),
        )
}

fn active_services<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
) -> BookingResult<Vec<Service>> {
    Ok(backend
        .services(barbershop.id)?
        .into_iter()
        .filter(|service| service.is_active)
        .collect())
}

fn active_employees<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
) -> BookingResult<Vec<Employee>> {
    Ok(backend
        .employees(barbershop.id)?
        .into_iter()
        .filter(|employee| employee.is_active)
        .collect())
}

async fn barbershop_page<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Path(slug): Path<String>,
) -> BookingResult<Json<BarbershopPage>> {
    let backend = &state.backend;
    let barbershop = find_barbershop(backend, &slug)?;
    Ok(Json(BarbershopPage {
        services: active_services(backend, &barbershop)?,
        employees: active_employees(backend, &barbershop)?,
        working_hours: backend.working_hours(barbershop.id)?,
        barbershop,
    }))
}

async fn services<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Path(slug): Path<String>,
) -> BookingResult<Json<Vec<Service>>> {
    let barbershop = find_barbershop(&state.backend, &slug)?;
    Ok(Json(active_services(&state.backend, &barbershop)?))
}

async fn employees<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Path(slug): Path<String>,
) -> BookingResult<Json<Vec<Employee>>> {
    let barbershop = find_barbershop(&state.backend, &slug)?;
    Ok(Json(active_employees(&state.backend, &barbershop)?))
}

async fn employee_services<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Path((slug, employee_id)): Path<(String, Uuid)>,
) -> BookingResult<Json<Vec<Service>>> {
    let barbershop = find_barbershop(&state.backend, &slug)?;
    let services = booking::employee_offered_services(&state.backend, &barbershop, employee_id)?;
    Ok(Json(services))
}

async fn employee_schedule<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Path((slug, employee_id)): Path<(String, Uuid)>,
) -> BookingResult<Json<Vec<ScheduleEntry>>> {
    let barbershop = find_barbershop(&state.backend, &slug)?;
    let today = state.clock.now().date();
    let schedule = booking::employee_schedule(&state.backend, &barbershop, employee_id, today)?;
    Ok(Json(schedule))
}

async fn slots<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Path((slug, employee_id, date)): Path<(String, Uuid, NaiveDate)>,
    Query(query): Query<SlotQuery>,
) -> BookingResult<Json<SlotAvailability>> {
    let barbershop = find_barbershop(&state.backend, &slug)?;
    let availability = available_slots(
        &state.backend,
        &barbershop,
        employee_id,
        date,
        query.service_id,
        state.clock.now(),
        state.configuration.slot_interval(),
    )?;
    Ok(Json(availability))
}

async fn verify_phone<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Path(slug): Path<String>,
    Valid(Json(request)): Valid<Json<PhoneRequest>>,
) -> BookingResult<Json<PhoneVerification>> {
    let barbershop = find_barbershop(&state.backend, &slug)?;
    let client = booking::verify_phone(&state.backend, &barbershop, &request.phone)?;
    Ok(Json(PhoneVerification {
        registered: client.is_some(),
        client,
    }))
}

async fn register<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Path(slug): Path<String>,
    Valid(Json(request)): Valid<Json<ClientRegistrationRequest>>,
) -> BookingResult<(StatusCode, Json<Client>)> {
    let barbershop = find_barbershop(&state.backend, &slug)?;
    let client = booking::register_client(&state.backend, &barbershop, request.name, request.phone)?;
    Ok((StatusCode::CREATED, Json(client)))
}

async fn book<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Path(slug): Path<String>,
    Valid(Json(request)): Valid<Json<BookingRequest>>,
) -> BookingResult<(StatusCode, Json<Appointment>)> {
    let barbershop = find_barbershop(&state.backend, &slug)?;
    let appointment = booking::book_appointment(
        &state.backend,
        &barbershop,
        &request,
        state.clock.now(),
        state.configuration.slot_interval(),
    )?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

async fn client_appointments<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Path((slug, phone)): Path<(String, String)>,
) -> BookingResult<Json<Vec<AppointmentDetails>>> {
    let barbershop = find_barbershop(&state.backend, &slug)?;
    let appointments = booking::client_appointments(&state.backend, &barbershop, &phone)?;
    Ok(Json(appointments))
}

async fn cancel<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Path((slug, id)): Path<(String, Uuid)>,
    Valid(Json(request)): Valid<Json<PhoneRequest>>,
) -> BookingResult<Json<Appointment>> {
    let barbershop = find_barbershop(&state.backend, &slug)?;
    let appointment = booking::cancel_appointment(&state.backend, &barbershop, id, &request.phone)?;
    Ok(Json(appointment))
}

async fn review<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Path((slug, id)): Path<(String, Uuid)>,
    Valid(Json(request)): Valid<Json<ReviewRequest>>,
) -> BookingResult<(StatusCode, Json<Review>)> {
    let barbershop = find_barbershop(&state.backend, &slug)?;
    let review = booking::review_appointment(
        &state.backend,
        &barbershop,
        id,
        &request.phone,
        request.rating,
        request.comment,
    )?;
    Ok((StatusCode::CREATED, Json(review)))
}

async fn notifications<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Path((slug, phone)): Path<(String, String)>,
) -> BookingResult<Json<Vec<Notification>>> {
    let barbershop = find_barbershop(&state.backend, &slug)?;
    let notifications = booking::client_notifications(&state.backend, &barbershop, &phone)?;
    Ok(Json(notifications))
}

async fn mark_read<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Path((slug, phone, id)): Path<(String, String, Uuid)>,
) -> BookingResult<StatusCode> {
    let barbershop = find_barbershop(&state.backend, &slug)?;
    booking::mark_notification_read(&state.backend, &barbershop, &phone, id)?;
    Ok(StatusCode::NO_CONTENT)
}
