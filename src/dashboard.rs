use crate::backend::BarbershopBackend;
use crate::booking::{appointment_details, AppointmentDetails};
use crate::error::BookingResult;
use crate::types::{AppointmentStatus, Barbershop, Employee, InventoryItem, Service};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

const RECENT_EMPLOYEES: usize = 5;
const FEATURED_SERVICES: usize = 5;
const UPCOMING_APPOINTMENTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub barbershop: Barbershop,
    pub total_employees: usize,
    pub active_employees: usize,
    pub total_services: usize,
    pub total_clients: usize,
    pub recent_employees: Vec<Employee>,
    pub active_services: Vec<Service>,
    pub appointments_today: Vec<AppointmentDetails>,
    pub upcoming_appointments: Vec<AppointmentDetails>,
    pub monthly_expenses_cents: i64,
    pub monthly_revenue_cents: i64,
    pub low_stock_items: Vec<InventoryItem>,
    pub review_count: usize,
    pub average_rating: Option<f64>,
}

fn same_month(date: NaiveDate, today: NaiveDate) -> bool {
    date.year() == today.year() && date.month() == today.month()
}

pub fn dashboard<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    now: NaiveDateTime,
) -> BookingResult<DashboardSummary> {
    let today = now.date();

    let employees = backend.employees(barbershop.id)?;
    let active_employees = employees.iter().filter(|e| e.is_active).count();
    let mut recent_employees = employees.clone();
    recent_employees.sort_by(|a, b| b.hire_date.cmp(&a.hire_date));
    recent_employees.truncate(RECENT_EMPLOYEES);

    let services = backend.services(barbershop.id)?;
    let prices: HashMap<Uuid, i64> = services.iter().map(|s| (s.id, s.price_cents)).collect();
    let active_services: Vec<Service> = services
        .iter()
        .filter(|service| service.is_active)
        .take(FEATURED_SERVICES)
        .cloned()
        .collect();

    let appointments = backend.appointments(barbershop.id)?;
    let mut todays: Vec<_> = appointments
        .iter()
        .filter(|a| a.date == today)
        .cloned()
        .collect();
    todays.sort_by_key(|a| a.time);
    let mut upcoming: Vec<_> = appointments
        .iter()
        .filter(|a| a.is_scheduled() && (a.date, a.time) >= (today, now.time()))
        .cloned()
        .collect();
    upcoming.sort_by_key(|a| (a.date, a.time));
    upcoming.truncate(UPCOMING_APPOINTMENTS);

    let monthly_revenue_cents = appointments
        .iter()
        .filter(|a| a.status == AppointmentStatus::Completed && same_month(a.date, today))
        .filter_map(|a| prices.get(&a.service_id))
        .sum();
    let monthly_expenses_cents = backend
        .expenses(barbershop.id)?
        .iter()
        .filter(|expense| same_month(expense.date, today))
        .map(|expense| expense.amount_cents)
        .sum();

    let low_stock_items = backend
        .inventory(barbershop.id)?
        .into_iter()
        .filter(InventoryItem::is_low_stock)
        .collect();

    let ratings: Vec<i16> = backend
        .reviews(barbershop.id)?
        .iter()
        .map(|review| review.rating)
        .collect();
    let average_rating = match ratings.is_empty() {
        true => None,
        false => {
            let total: f64 = ratings.iter().map(|&rating| f64::from(rating)).sum();
            Some(total / ratings.len() as f64)
        }
    };

    Ok(DashboardSummary {
        barbershop: barbershop.clone(),
        total_employees: employees.len(),
        active_employees,
        total_services: services.len(),
        total_clients: backend.clients(barbershop.id)?.len(),
        recent_employees,
        active_services,
        appointments_today: appointment_details(backend, barbershop, todays)?,
        upcoming_appointments: appointment_details(backend, barbershop, upcoming)?,
        monthly_expenses_cents,
        monthly_revenue_cents,
        low_stock_items,
        review_count: ratings.len(),
        average_rating,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testutils::{
        at, new_appointment, new_employee, new_service, seed_barbershop, seed_shop_with_staff,
        time,
    };
    use crate::types::{Expense, ExpenseType, Review};
    use chrono::{NaiveTime, Utc};

    #[test]
    fn test_empty_dashboard() {
        let store = crate::local_store::LocalStore::default();
        let shop = seed_barbershop(&store, "North Cuts");

        let summary = dashboard(&store, &shop, at("2030-01-07 12:00")).unwrap();
        assert_eq!(summary.total_employees, 0);
        assert_eq!(summary.total_clients, 0);
        assert!(summary.upcoming_appointments.is_empty());
        assert_eq!(summary.monthly_revenue_cents, 0);
        assert_eq!(summary.average_rating, None);
    }

    #[test]
    fn test_dashboard_counts_and_money() {
        let store = crate::local_store::LocalStore::default();
        let fixture = seed_shop_with_staff(&store);
        let shop = &fixture.barbershop;

        let mut inactive = new_employee(shop.id, "Paul", "+5511999991111");
        inactive.is_active = false;
        inactive.hire_date = NaiveDate::from_ymd_opt(2029, 6, 1).unwrap();
        store.add_employee(inactive.clone()).unwrap();
        let mut retired_service = new_service(shop.id, "Perm", 90);
        retired_service.is_active = false;
        store.add_service(retired_service).unwrap();

        let appointment = |day: u32, at_time: &str| {
            new_appointment(
                shop,
                &fixture.client,
                &fixture.employee,
                &fixture.service,
                NaiveDate::from_ymd_opt(2030, 1, day).unwrap(),
                time(at_time),
            )
        };
        let done = appointment(2, "10:00");
        store.add_appointment(done.clone()).unwrap();
        store
            .update_appointment_status(done.id, AppointmentStatus::Completed)
            .unwrap();
        store.add_appointment(appointment(7, "09:00")).unwrap();
        store.add_appointment(appointment(7, "15:00")).unwrap();
        store.add_appointment(appointment(9, "11:00")).unwrap();

        store
            .add_review(Review {
                id: Uuid::new_v4(),
                appointment_id: done.id,
                rating: 4,
                comment: None,
                created_at: Utc::now(),
            })
            .unwrap();
        for (day, amount_cents) in [(3, 1000), (20, 2500)] {
            store
                .add_expense(Expense {
                    id: Uuid::new_v4(),
                    barbershop_id: shop.id,
                    description: "Towels".into(),
                    amount_cents,
                    date: NaiveDate::from_ymd_opt(2030, 1, day).unwrap(),
                    expense_type: ExpenseType::Supplies,
                    notes: None,
                })
                .unwrap();
        }
        store
            .add_expense(Expense {
                id: Uuid::new_v4(),
                barbershop_id: shop.id,
                description: "Rent".into(),
                amount_cents: 99_000,
                date: NaiveDate::from_ymd_opt(2029, 12, 31).unwrap(),
                expense_type: ExpenseType::Rent,
                notes: None,
            })
            .unwrap();

        for (name, quantity) in [("Pomade", 2), ("Shampoo", 10)] {
            store
                .add_inventory_item(InventoryItem {
                    id: Uuid::new_v4(),
                    barbershop_id: shop.id,
                    name: name.into(),
                    quantity,
                    reorder_level: 5,
                    unit_price_cents: 1200,
                    last_restocked: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
                })
                .unwrap();
        }

        let summary = dashboard(&store, shop, at("2030-01-07 12:00")).unwrap();
        assert_eq!(summary.total_employees, 2);
        assert_eq!(summary.active_employees, 1);
        assert_eq!(summary.recent_employees[0].id, inactive.id);
        assert_eq!(summary.total_services, 2);
        assert_eq!(summary.active_services, vec![fixture.service.clone()]);
        assert_eq!(summary.total_clients, 1);
        assert_eq!(summary.appointments_today.len(), 2);
        assert_eq!(summary.appointments_today[0].appointment.time, time("09:00"));

        let upcoming: Vec<NaiveTime> = summary
            .upcoming_appointments
            .iter()
            .map(|details| details.appointment.time)
            .collect();
        assert_eq!(upcoming, vec![time("15:00"), time("11:00")]);

        assert_eq!(summary.monthly_expenses_cents, 3500);
        assert_eq!(summary.monthly_revenue_cents, fixture.service.price_cents);
        assert_eq!(summary.review_count, 1);
        assert_eq!(summary.average_rating, Some(4.0));
        assert_eq!(summary.low_stock_items.len(), 1);
        assert_eq!(summary.low_stock_items[0].name, "Pomade");
    }
}
