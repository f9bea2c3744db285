use crate::error::BookingError;
use crate::schema::{
    appointments, barbershops, clients, employee_services, employees, expenses, inventory_items,
    notifications, owners, reviews, services, working_hours,
};
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use diesel::{Insertable, Queryable};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Enum stored as a lowercase text column.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = BookingError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($text => Ok(Self::$variant),)+
                    other => Err(BookingError::invalid(format!(
                        "Unknown {} '{other}'",
                        stringify!($name)
                    ))),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = BookingError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }
    };
}

text_enum!(EmployeeRole {
    Barber => "barber",
    Hairdresser => "hairdresser",
    Manicurist => "manicurist",
    Receptionist => "receptionist",
    Manager => "manager",
    Other => "other",
});

text_enum!(AppointmentStatus {
    Scheduled => "scheduled",
    Completed => "completed",
    Cancelled => "cancelled",
});

impl Default for AppointmentStatus {
    fn default() -> Self {
        Self::Scheduled
    }
}

text_enum!(NotificationKind {
    AppointmentReminder => "appointment_reminder",
    AppointmentConfirmation => "appointment_confirmation",
    AppointmentCancellation => "appointment_cancellation",
});

text_enum!(ExpenseType {
    Supplies => "supplies",
    Equipment => "equipment",
    Utilities => "utilities",
    Rent => "rent",
    Salary => "salary",
    Other => "other",
});

/// Weekday of a working-hours entry, stored as 0 (Monday) to 6 (Sunday).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    pub fn of(date: NaiveDate) -> Self {
        Self::ALL[date.weekday().num_days_from_monday() as usize]
    }

    pub fn number(&self) -> i16 {
        *self as i16
    }
}

impl TryFrom<i16> for DayOfWeek {
    type Error = BookingError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        usize::try_from(value)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
            .ok_or_else(|| BookingError::invalid(format!("Day of week {value} out of range")))
    }
}

impl From<DayOfWeek> for i16 {
    fn from(value: DayOfWeek) -> Self {
        value.number()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = owners)]
pub struct Owner {
    pub id: Uuid,
    pub username: String,
    pub token: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = barbershops)]
pub struct Barbershop {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub slug: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub description: String,
    pub code: Uuid,
    pub is_open: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = working_hours)]
pub struct WorkingHours {
    pub id: Uuid,
    pub barbershop_id: Uuid,
    #[diesel(deserialize_as = i16)]
    #[diesel(serialize_as = i16)]
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = employees)]
pub struct Employee {
    pub id: Uuid,
    pub barbershop_id: Uuid,
    pub name: String,
    pub phone: String,
    #[diesel(deserialize_as = String)]
    #[diesel(serialize_as = String)]
    pub role: EmployeeRole,
    pub hire_date: NaiveDate,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = services)]
pub struct Service {
    pub id: Uuid,
    pub barbershop_id: Uuid,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub duration_minutes: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = employee_services)]
pub struct EmployeeService {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub service_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = clients)]
pub struct Client {
    pub id: Uuid,
    pub barbershop_id: Uuid,
    pub name: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = appointments)]
pub struct Appointment {
    pub id: Uuid,
    pub barbershop_id: Uuid,
    pub client_id: Uuid,
    pub employee_id: Uuid,
    pub service_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    #[diesel(deserialize_as = String)]
    #[diesel(serialize_as = String)]
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    pub fn is_scheduled(&self) -> bool {
        self.status == AppointmentStatus::Scheduled
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = reviews)]
pub struct Review {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = notifications)]
pub struct Notification {
    pub id: Uuid,
    pub client_id: Uuid,
    pub appointment_id: Uuid,
    #[diesel(deserialize_as = String)]
    #[diesel(serialize_as = String)]
    pub kind: NotificationKind,
    pub message: String,
    pub sent_at: DateTime<Utc>,
    pub is_read: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = expenses)]
pub struct Expense {
    pub id: Uuid,
    pub barbershop_id: Uuid,
    pub description: String,
    pub amount_cents: i64,
    pub date: NaiveDate,
    #[diesel(deserialize_as = String)]
    #[diesel(serialize_as = String)]
    pub expense_type: ExpenseType,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = inventory_items)]
pub struct InventoryItem {
    pub id: Uuid,
    pub barbershop_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub reorder_level: i32,
    pub unit_price_cents: i64,
    pub last_restocked: NaiveDate,
}

impl InventoryItem {
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.reorder_level
    }
}
