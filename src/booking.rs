use crate::availability::is_slot_available;
use crate::backend::BarbershopBackend;
use crate::error::{BookingError, BookingResult};
use crate::requests::BookingRequest;
use crate::slug::is_valid_slug;
use crate::types::{
    Appointment, AppointmentStatus, Barbershop, Client, Notification, NotificationKind, Review,
    Service,
};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{error, info};
use uuid::Uuid;

/// Appointment together with the names a client or owner wants to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentDetails {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub client_name: String,
    pub client_phone: String,
    pub employee_name: String,
    pub service_name: String,
    pub price_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub service: String,
}

pub fn find_barbershop<B: BarbershopBackend>(backend: &B, slug: &str) -> BookingResult<Barbershop> {
    if !is_valid_slug(slug) {
        return Err(BookingError::not_found("Barbershop"));
    }
    backend
        .barbershop_by_slug(slug)?
        .ok_or_else(|| BookingError::not_found("Barbershop"))
}

pub fn verify_phone<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    phone: &str,
) -> BookingResult<Option<Client>> {
    backend.client_by_phone(barbershop.id, phone)
}

fn require_client<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    phone: &str,
) -> BookingResult<Client> {
    verify_phone(backend, barbershop, phone)?.ok_or_else(|| BookingError::not_found("Client"))
}

pub fn register_client<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    name: String,
    phone: String,
) -> BookingResult<Client> {
    let client = Client {
        id: Uuid::new_v4(),
        barbershop_id: barbershop.id,
        name,
        phone,
        created_at: Utc::now(),
    };
    backend.add_client(client.clone())?;
    info!(barbershop = %barbershop.slug, client = %client.id, "Client registered");
    Ok(client)
}

/// Notifications follow an already stored change, so a failure is logged
/// instead of failing the request.
fn notify<B: BarbershopBackend>(
    backend: &B,
    appointment: &Appointment,
    kind: NotificationKind,
    message: String,
) {
    let notification = Notification {
        id: Uuid::new_v4(),
        client_id: appointment.client_id,
        appointment_id: appointment.id,
        kind,
        message,
        sent_at: Utc::now(),
        is_read: false,
    };
    if let Err(err) = backend.add_notification(notification) {
        error!(%err, appointment = %appointment.id, %kind, "Failed to store notification");
    }
}

fn service_name<B: BarbershopBackend>(backend: &B, service_id: Uuid) -> BookingResult<String> {
    Ok(backend
        .service(service_id)?
        .map(|service| service.name)
        .unwrap_or_else(|| "Service".to_string()))
}

/// Books `request` for the client registered under its phone number.
///
/// The requested time has to be one of the slots currently offered for the
/// employee and service.
pub fn book_appointment<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    request: &BookingRequest,
    now: NaiveDateTime,
    interval: Duration,
) -> BookingResult<Appointment> {
    let client = require_client(backend, barbershop, &request.phone)?;

    let employee = backend
        .employee(request.employee_id)?
        .filter(|employee| employee.barbershop_id == barbershop.id && employee.is_active)
        .ok_or_else(|| BookingError::not_found("Employee"))?;

    let service = backend
        .service(request.service_id)?
        .filter(|service| service.barbershop_id == barbershop.id && service.is_active)
        .ok_or_else(|| BookingError::not_found("Service"))?;

    let performs_service = backend
        .employee_services(barbershop.id)?
        .iter()
        .any(|es| es.employee_id == employee.id && es.service_id == service.id);
    if !performs_service {
        return Err(BookingError::invalid(
            "Employee does not perform this service",
        ));
    }

    let start = request.date.and_time(request.time);
    if !is_slot_available(
        backend,
        barbershop,
        employee.id,
        service.id,
        start,
        now,
        interval,
    )? {
        return Err(BookingError::conflict(format!(
            "{} at {} is not available",
            request.date,
            request.time.format("%H:%M")
        )));
    }

    let appointment = Appointment {
        id: Uuid::new_v4(),
        barbershop_id: barbershop.id,
        client_id: client.id,
        employee_id: employee.id,
        service_id: service.id,
        date: request.date,
        time: request.time,
        status: AppointmentStatus::Scheduled,
        created_at: Utc::now(),
    };
    backend.add_appointment(appointment.clone())?;

    notify(
        backend,
        &appointment,
        NotificationKind::AppointmentConfirmation,
        format!(
            "Your {} with {} at {} is booked for {} at {}.",
            service.name,
            employee.name,
            barbershop.name,
            appointment.date,
            appointment.time.format("%H:%M")
        ),
    );
    info!(
        barbershop = %barbershop.slug,
        appointment = %appointment.id,
        date = %appointment.date,
        time = %appointment.time,
        "Appointment booked"
    );
    Ok(appointment)
}

fn barbershop_appointment<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    appointment_id: Uuid,
) -> BookingResult<Appointment> {
    backend
        .appointment(appointment_id)?
        .filter(|appointment| appointment.barbershop_id == barbershop.id)
        .ok_or_else(|| BookingError::not_found("Appointment"))
}

/// Moves an appointment of `barbershop` to `status`. Cancelled appointments stay cancelled.
pub fn change_appointment_status<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    appointment_id: Uuid,
    status: AppointmentStatus,
) -> BookingResult<Appointment> {
    let appointment = barbershop_appointment(backend, barbershop, appointment_id)?;
    if appointment.status == AppointmentStatus::Cancelled {
        return Err(BookingError::conflict("Appointment was cancelled"));
    }
    if appointment.status == status {
        return Ok(appointment);
    }

    let appointment = backend.update_appointment_status(appointment_id, status)?;
    if status == AppointmentStatus::Cancelled {
        notify(
            backend,
            &appointment,
            NotificationKind::AppointmentCancellation,
            format!(
                "Your {} on {} at {} was cancelled.",
                service_name(backend, appointment.service_id)?,
                appointment.date,
                appointment.time.format("%H:%M")
            ),
        );
    }
    info!(appointment = %appointment.id, status = %status, "Appointment status changed");
    Ok(appointment)
}

/// Cancellation requested by the client who booked the appointment.
pub fn cancel_appointment<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    appointment_id: Uuid,
    phone: &str,
) -> BookingResult<Appointment> {
    let client = require_client(backend, barbershop, phone)?;
    let appointment = barbershop_appointment(backend, barbershop, appointment_id)?;
    if appointment.client_id != client.id {
        return Err(BookingError::not_found("Appointment"));
    }
    if !appointment.is_scheduled() {
        return Err(BookingError::conflict(format!(
            "Appointment is already {}",
            appointment.status
        )));
    }
    change_appointment_status(
        backend,
        barbershop,
        appointment_id,
        AppointmentStatus::Cancelled,
    )
}

pub fn review_appointment<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    appointment_id: Uuid,
    phone: &str,
    rating: i16,
    comment: Option<String>,
) -> BookingResult<Review> {
    let client = require_client(backend, barbershop, phone)?;
    let appointment = barbershop_appointment(backend, barbershop, appointment_id)?;
    if appointment.client_id != client.id {
        return Err(BookingError::not_found("Appointment"));
    }
    if appointment.status != AppointmentStatus::Completed {
        return Err(BookingError::invalid(
            "Only completed appointments can be reviewed",
        ));
    }

    let review = Review {
        id: Uuid::new_v4(),
        appointment_id,
        rating,
        comment: comment.filter(|comment| !comment.trim().is_empty()),
        created_at: Utc::now(),
    };
    backend.add_review(review.clone())?;
    Ok(review)
}

/// Joins appointments of one barbershop with client, employee and service names.
pub fn appointment_details<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    appointments: Vec<Appointment>,
) -> BookingResult<Vec<AppointmentDetails>> {
    let clients: HashMap<Uuid, Client> = backend
        .clients(barbershop.id)?
        .into_iter()
        .map(|client| (client.id, client))
        .collect();
    let employees: HashMap<Uuid, String> = backend
        .employees(barbershop.id)?
        .into_iter()
        .map(|employee| (employee.id, employee.name))
        .collect();
    let services: HashMap<Uuid, Service> = backend
        .services(barbershop.id)?
        .into_iter()
        .map(|service| (service.id, service))
        .collect();

    Ok(appointments
        .into_iter()
        .map(|appointment| {
            let client = clients.get(&appointment.client_id);
            let service = services.get(&appointment.service_id);
            AppointmentDetails {
                client_name: client.map(|c| c.name.clone()).unwrap_or_default(),
                client_phone: client.map(|c| c.phone.clone()).unwrap_or_default(),
                employee_name: employees
                    .get(&appointment.employee_id)
                    .cloned()
                    .unwrap_or_default(),
                service_name: service.map(|s| s.name.clone()).unwrap_or_default(),
                price_cents: service.map(|s| s.price_cents).unwrap_or_default(),
                appointment,
            }
        })
        .collect())
}

pub fn client_appointments<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    phone: &str,
) -> BookingResult<Vec<AppointmentDetails>> {
    let client = require_client(backend, barbershop, phone)?;
    let appointments = backend
        .appointments(barbershop.id)?
        .into_iter()
        .filter(|appointment| appointment.client_id == client.id)
        .collect();
    appointment_details(backend, barbershop, appointments)
}

pub fn client_notifications<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    phone: &str,
) -> BookingResult<Vec<Notification>> {
    let client = require_client(backend, barbershop, phone)?;
    backend.notifications(client.id)
}

pub fn mark_notification_read<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    phone: &str,
    notification_id: Uuid,
) -> BookingResult<()> {
    let owned = client_notifications(backend, barbershop, phone)?
        .iter()
        .any(|notification| notification.id == notification_id);
    if !owned {
        return Err(BookingError::not_found("Notification"));
    }
    backend.mark_notification_read(notification_id)
}

/// Active services of the barbershop the employee is assigned to.
pub fn employee_offered_services<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    employee_id: Uuid,
) -> BookingResult<Vec<Service>> {
    backend
        .employee(employee_id)?
        .filter(|employee| employee.barbershop_id == barbershop.id && employee.is_active)
        .ok_or_else(|| BookingError::not_found("Employee"))?;

    let assigned: Vec<Uuid> = backend
        .employee_services(barbershop.id)?
        .into_iter()
        .filter(|es| es.employee_id == employee_id)
        .map(|es| es.service_id)
        .collect();
    Ok(backend
        .services(barbershop.id)?
        .into_iter()
        .filter(|service| service.is_active && assigned.contains(&service.id))
        .collect())
}

/// Upcoming scheduled appointments of an employee, earliest first.
pub fn employee_schedule<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    employee_id: Uuid,
    today: NaiveDate,
) -> BookingResult<Vec<ScheduleEntry>> {
    backend
        .employee(employee_id)?
        .filter(|employee| employee.barbershop_id == barbershop.id)
        .ok_or_else(|| BookingError::not_found("Employee"))?;

    let services: HashMap<Uuid, String> = backend
        .services(barbershop.id)?
        .into_iter()
        .map(|service| (service.id, service.name))
        .collect();
    let mut schedule: Vec<ScheduleEntry> = backend
        .appointments(barbershop.id)?
        .into_iter()
        .filter(|a| a.employee_id == employee_id && a.is_scheduled() && a.date >= today)
        .map(|a| ScheduleEntry {
            date: a.date,
            time: a.time,
            service: services.get(&a.service_id).cloned().unwrap_or_default(),
        })
        .collect();
    schedule.sort_by_key(|entry| (entry.date, entry.time));
    Ok(schedule)
}
