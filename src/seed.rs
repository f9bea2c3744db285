//! Example data for trying the service out with the in-memory backend.

use crate::backend::BarbershopBackend;
use crate::error::BookingResult;
use crate::management;
use crate::requests::{
    BarbershopRequest, EmployeeRequest, EmployeeServiceRequest, ExpenseRequest, InventoryRequest,
    ServiceRequest, WorkingHoursRequest,
};
use crate::types::{Barbershop, DayOfWeek, EmployeeRole, ExpenseType, Owner};
use chrono::{NaiveDate, NaiveTime};
use tracing::info;

pub const DEMO_OWNER: &str = "demo";

fn hour(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or_default()
}

/// Creates the demo owner with one fully staffed barbershop, open Monday to
/// Saturday. The owner's token is left to the caller to show.
pub fn seed_demo<B: BarbershopBackend>(
    backend: &B,
    today: NaiveDate,
) -> BookingResult<(Owner, Barbershop)> {
    let owner = management::register_owner(backend, DEMO_OWNER.into())?;
    let barbershop = management::create_barbershop(
        backend,
        &owner,
        BarbershopRequest {
            name: "Demo Barbershop".into(),
            address: "Rua Augusta 1500, São Paulo".into(),
            phone: "+5511987654321".into(),
            email: "hello@demo-barbershop.test".into(),
            description: "Classic cuts and hot towel shaves".into(),
            is_open: true,
        },
    )?;

    for day_of_week in DayOfWeek::ALL
        .into_iter()
        .filter(|day| *day != DayOfWeek::Sunday)
    {
        management::create_working_hours(
            backend,
            &barbershop,
            WorkingHoursRequest {
                day_of_week,
                start_time: hour(9),
                end_time: hour(18),
            },
        )?;
    }

    let services = [
        ("Haircut", 4000, 30),
        ("Beard trim", 2500, 30),
        ("Haircut and beard", 6000, 60),
    ]
    .into_iter()
    .map(|(name, price_cents, duration_minutes)| {
        management::create_service(
            backend,
            &barbershop,
            ServiceRequest {
                name: name.into(),
                description: String::new(),
                price_cents,
                duration_minutes,
                is_active: true,
            },
        )
    })
    .collect::<BookingResult<Vec<_>>>()?;

    let barbers = [("Carlos", "+5511911110000"), ("Rafael", "+5511922220000")];
    for (name, phone) in barbers {
        let employee = management::create_employee(
            backend,
            &barbershop,
            EmployeeRequest {
                name: name.into(),
                phone: phone.into(),
                role: EmployeeRole::Barber,
                hire_date: today,
                is_active: true,
            },
        )?;
        for service in &services {
            management::assign_service(
                backend,
                &barbershop,
                EmployeeServiceRequest {
                    employee_id: employee.id,
                    service_id: service.id,
                },
            )?;
        }
    }

    management::create_expense(
        backend,
        &barbershop,
        ExpenseRequest {
            description: "Monthly rent".into(),
            amount_cents: 250_000,
            date: today,
            expense_type: ExpenseType::Rent,
            notes: None,
        },
    )?;
    management::create_inventory_item(
        backend,
        &barbershop,
        InventoryRequest {
            name: "Shaving cream".into(),
            quantity: 3,
            reorder_level: 5,
            unit_price_cents: 1500,
        },
        today,
    )?;

    info!(
        owner = %owner.username,
        slug = %barbershop.slug,
        "Demo barbershop seeded"
    );
    Ok((owner, barbershop))
}
