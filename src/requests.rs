//! JSON payloads accepted by the HTTP API, validated before they reach the
//! backend.

use crate::types::{AppointmentStatus, DayOfWeek, EmployeeRole, ExpenseType};
use chrono::{NaiveDate, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

lazy_static! {
    /// Up to 15 digits with an optional leading `+`.
    pub static ref PHONE_REGEX: Regex = Regex::new(r"^\+?1?\d{9,15}$").unwrap();
}

fn default_true() -> bool {
    true
}

fn validate_opening_window(request: &WorkingHoursRequest) -> Result<(), ValidationError> {
    if request.end_time <= request.start_time {
        let mut err = ValidationError::new("opening_window");
        err.message = Some("end_time must be later than start_time".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterOwnerRequest {
    #[validate(length(min = 3, max = 150))]
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BarbershopRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 200))]
    pub address: String,
    #[validate(regex(path = *PHONE_REGEX))]
    pub phone: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub is_open: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EmployeeRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(regex(path = *PHONE_REGEX))]
    pub phone: String,
    pub role: EmployeeRole,
    pub hire_date: NaiveDate,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServiceRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0, max = 99_999_999))]
    pub price_cents: i64,
    #[validate(range(min = 5, max = 480))]
    pub duration_minutes: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_opening_window"))]
pub struct WorkingHoursRequest {
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EmployeeServiceRequest {
    pub employee_id: Uuid,
    pub service_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExpenseRequest {
    #[validate(length(min = 1, max = 200))]
    pub description: String,
    #[validate(range(min = 0))]
    pub amount_cents: i64,
    pub date: NaiveDate,
    pub expense_type: ExpenseType,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InventoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(range(min = 0))]
    pub quantity: i32,
    #[validate(range(min = 0))]
    pub reorder_level: i32,
    #[validate(range(min = 0, max = 99_999_999))]
    pub unit_price_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AppointmentStatusRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PhoneRequest {
    #[validate(regex(path = *PHONE_REGEX))]
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ClientRegistrationRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(regex(path = *PHONE_REGEX))]
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BookingRequest {
    #[validate(regex(path = *PHONE_REGEX))]
    pub phone: String,
    pub employee_id: Uuid,
    pub service_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReviewRequest {
    #[validate(regex(path = *PHONE_REGEX))]
    pub phone: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: i16,
    #[validate(length(max = 1000))]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlotQuery {
    pub service_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpenseFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub expense_type: Option<ExpenseType>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryFilter {
    pub search: Option<String>,
    #[serde(default)]
    pub low_stock: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentFilter {
    pub date: Option<NaiveDate>,
    pub status: Option<AppointmentStatus>,
}

/// Case-insensitive substring match used by the list filters.
pub fn matches_search(value: &str, search: Option<&str>) -> bool {
    match search.map(str::trim).filter(|s| !s.is_empty()) {
        Some(search) => value.to_lowercase().contains(&search.to_lowercase()),
        None => true,
    }
}
