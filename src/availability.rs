//! Slot availability.
//!
//! A slot is a candidate start time inside the opening window of a
//! barbershop. Candidates are spaced by the configured interval and are
//! offered while the requested service still fits before closing time and
//! does not overlap a scheduled appointment of the same employee.

use crate::backend::BarbershopBackend;
use crate::error::{BookingError, BookingResult};
use crate::types::{Barbershop, DayOfWeek, WorkingHours};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use uuid::Uuid;

pub const CLOSED_MESSAGE: &str = "Barbershop is closed on this day";
pub const PAST_DATE_MESSAGE: &str = "Date is in the past";
pub const FULLY_BOOKED_MESSAGE: &str = "No slots left on this day";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotAvailability {
    pub date: NaiveDate,
    pub employee_id: Uuid,
    #[serde(serialize_with = "serialize_slots")]
    pub available_slots: Vec<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SlotAvailability {
    fn empty(date: NaiveDate, employee_id: Uuid, message: &str) -> Self {
        Self {
            date,
            employee_id,
            available_slots: vec![],
            message: Some(message.to_string()),
        }
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        self.available_slots.contains(&time)
    }
}

fn serialize_slots<S: Serializer>(slots: &[NaiveTime], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(slots.iter().map(|slot| slot.format("%H:%M").to_string()))
}

/// `time + duration`, or `None` when the result would pass midnight.
fn add_within_day(time: NaiveTime, duration: Duration) -> Option<NaiveTime> {
    match time.overflowing_add_signed(duration) {
        (later, 0) => Some(later),
        _ => None,
    }
}

/// Opening and closing time of the barbershop on `date`, if it opens at all.
pub fn opening_window(
    barbershop: &Barbershop,
    working_hours: &[WorkingHours],
    date: NaiveDate,
) -> Option<(NaiveTime, NaiveTime)> {
    if !barbershop.is_open {
        return None;
    }
    let day = DayOfWeek::of(date);
    working_hours
        .iter()
        .find(|hours| hours.barbershop_id == barbershop.id && hours.day_of_week == day)
        .map(|hours| (hours.start_time, hours.end_time))
}

/// Walks `window` in steps of `interval` and keeps every start time whose
/// `slot_length` fits before closing, does not overlap `booked` and is not
/// earlier than `not_before`.
pub fn enumerate_slots(
    window: (NaiveTime, NaiveTime),
    interval: Duration,
    slot_length: Duration,
    booked: &[(NaiveTime, Duration)],
    not_before: Option<NaiveTime>,
) -> Vec<NaiveTime> {
    let (opening, closing) = window;
    let mut slots = vec![];
    if interval <= Duration::zero() {
        return slots;
    }

    let mut candidate = opening;
    while let Some(slot_end) = add_within_day(candidate, slot_length) {
        if slot_end > closing {
            break;
        }
        let passed = not_before.is_some_and(|earliest| candidate < earliest);
        let overlaps = booked.iter().any(|(start, length)| {
            *start < slot_end && add_within_day(*start, *length).map_or(true, |end| candidate < end)
        });
        if !passed && !overlaps {
            slots.push(candidate);
        }
        match add_within_day(candidate, interval) {
            Some(next) => candidate = next,
            None => break,
        }
    }
    slots
}

/// Free slots of an employee on `date`.
///
/// With `service_id` the slot length is the service duration, otherwise it
/// is one interval. Cancelled and completed appointments never block a slot.
pub fn available_slots<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    employee_id: Uuid,
    date: NaiveDate,
    service_id: Option<Uuid>,
    now: NaiveDateTime,
    interval: Duration,
) -> BookingResult<SlotAvailability> {
    backend
        .employee(employee_id)?
        .filter(|employee| employee.barbershop_id == barbershop.id && employee.is_active)
        .ok_or_else(|| BookingError::not_found("Employee"))?;

    let durations: HashMap<Uuid, Duration> = backend
        .services(barbershop.id)?
        .into_iter()
        .map(|service| (service.id, Duration::minutes(service.duration_minutes.into())))
        .collect();

    let slot_length = match service_id {
        Some(service_id) => backend
            .service(service_id)?
            .filter(|service| service.barbershop_id == barbershop.id && service.is_active)
            .map(|service| Duration::minutes(service.duration_minutes.into()))
            .ok_or_else(|| BookingError::not_found("Service"))?,
        None => interval,
    };

    if date < now.date() {
        return Ok(SlotAvailability::empty(date, employee_id, PAST_DATE_MESSAGE));
    }

    let working_hours = backend.working_hours(barbershop.id)?;
    let Some(window) = opening_window(barbershop, &working_hours, date) else {
        return Ok(SlotAvailability::empty(date, employee_id, CLOSED_MESSAGE));
    };

    let booked: Vec<(NaiveTime, Duration)> = backend
        .employee_appointments(employee_id, date)?
        .into_iter()
        .filter(|appointment| appointment.is_scheduled())
        .map(|appointment| {
            let length = durations
                .get(&appointment.service_id)
                .copied()
                .unwrap_or(interval);
            (appointment.time, length)
        })
        .collect();

    let not_before = (date == now.date()).then(|| now.time());
    let slots = enumerate_slots(window, interval, slot_length, &booked, not_before);
    let message = slots
        .is_empty()
        .then(|| FULLY_BOOKED_MESSAGE.to_string());

    Ok(SlotAvailability {
        date,
        employee_id,
        available_slots: slots,
        message,
    })
}

/// Whether `start` is one of the slots currently offered for the service.
pub fn is_slot_available<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    employee_id: Uuid,
    service_id: Uuid,
    start: NaiveDateTime,
    now: NaiveDateTime,
    interval: Duration,
) -> BookingResult<bool> {
    let availability = available_slots(
        backend,
        barbershop,
        employee_id,
        start.date(),
        Some(service_id),
        now,
        interval,
    )?;
    Ok(availability.contains(start.time()))
}
