//! Back office of a barbershop owner.
//!
//! Every operation takes the barbershop the owner is working on, already
//! resolved through [`owned_barbershop`]. Records of another barbershop are
//! reported as not found.

use crate::backend::BarbershopBackend;
use crate::booking::{appointment_details, AppointmentDetails};
use crate::error::{BookingError, BookingResult};
use crate::requests::{
    matches_search, AppointmentFilter, BarbershopRequest, EmployeeRequest, EmployeeServiceRequest,
    ExpenseFilter, ExpenseRequest, InventoryFilter, InventoryRequest, ServiceRequest,
    WorkingHoursRequest,
};
use crate::slug::unique_slug;
use crate::types::{
    Barbershop, Client, Employee, EmployeeService, Expense, InventoryItem, Owner, Service,
    WorkingHours,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingLink {
    pub slug: String,
    pub url: String,
    pub code: Uuid,
}

pub fn register_owner<B: BarbershopBackend>(backend: &B, username: String) -> BookingResult<Owner> {
    let owner = Owner {
        id: Uuid::new_v4(),
        username,
        token: Uuid::new_v4().simple().to_string(),
        created_at: Utc::now(),
    };
    backend.add_owner(owner.clone())?;
    info!(owner = %owner.username, "Owner registered");
    Ok(owner)
}

pub fn owned_barbershop<B: BarbershopBackend>(
    backend: &B,
    owner: &Owner,
    barbershop_id: Uuid,
) -> BookingResult<Barbershop> {
    backend
        .barbershop(barbershop_id)?
        .filter(|barbershop| barbershop.owner_id == owner.id)
        .ok_or_else(|| BookingError::not_found("Barbershop"))
}

pub fn create_barbershop<B: BarbershopBackend>(
    backend: &B,
    owner: &Owner,
    request: BarbershopRequest,
) -> BookingResult<Barbershop> {
    let barbershop = Barbershop {
        id: Uuid::new_v4(),
        owner_id: owner.id,
        slug: unique_slug(backend, &request.name)?,
        name: request.name,
        address: request.address,
        phone: request.phone,
        email: request.email,
        description: request.description,
        code: Uuid::new_v4(),
        is_open: request.is_open,
    };
    backend.add_barbershop(barbershop.clone())?;
    info!(owner = %owner.username, slug = %barbershop.slug, "Barbershop created");
    Ok(barbershop)
}

/// The slug is fixed at creation, so booking links survive a rename.
pub fn update_barbershop<B: BarbershopBackend>(
    backend: &B,
    barbershop: Barbershop,
    request: BarbershopRequest,
) -> BookingResult<Barbershop> {
    let barbershop = Barbershop {
        name: request.name,
        address: request.address,
        phone: request.phone,
        email: request.email,
        description: request.description,
        is_open: request.is_open,
        ..barbershop
    };
    backend.update_barbershop(barbershop.clone())?;
    Ok(barbershop)
}

pub fn booking_link(public_url: &str, barbershop: &Barbershop) -> BookingLink {
    BookingLink {
        slug: barbershop.slug.clone(),
        url: format!("{}/booking/{}", public_url.trim_end_matches('/'), barbershop.slug),
        code: barbershop.code,
    }
}

fn owned<T>(record: Option<T>, belongs: impl Fn(&T) -> bool, what: &str) -> BookingResult<T> {
    record
        .filter(|record| belongs(record))
        .ok_or_else(|| BookingError::not_found(what))
}

pub fn employee<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    id: Uuid,
) -> BookingResult<Employee> {
    owned(
        backend.employee(id)?,
        |e| e.barbershop_id == barbershop.id,
        "Employee",
    )
}

pub fn list_employees<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    search: Option<&str>,
) -> BookingResult<Vec<Employee>> {
    Ok(backend
        .employees(barbershop.id)?
        .into_iter()
        .filter(|employee| matches_search(&employee.name, search))
        .collect())
}

pub fn create_employee<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    request: EmployeeRequest,
) -> BookingResult<Employee> {
    let employee = Employee {
        id: Uuid::new_v4(),
        barbershop_id: barbershop.id,
        name: request.name,
        phone: request.phone,
        role: request.role,
        hire_date: request.hire_date,
        is_active: request.is_active,
    };
    backend.add_employee(employee.clone())?;
    Ok(employee)
}

pub fn update_employee<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    id: Uuid,
    request: EmployeeRequest,
) -> BookingResult<Employee> {
    let employee = Employee {
        name: request.name,
        phone: request.phone,
        role: request.role,
        hire_date: request.hire_date,
        is_active: request.is_active,
        ..employee(backend, barbershop, id)?
    };
    backend.update_employee(employee.clone())?;
    Ok(employee)
}

pub fn remove_employee<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    id: Uuid,
) -> BookingResult<()> {
    employee(backend, barbershop, id)?;
    backend.remove_employee(id)
}

pub fn service<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    id: Uuid,
) -> BookingResult<Service> {
    owned(
        backend.service(id)?,
        |s| s.barbershop_id == barbershop.id,
        "Service",
    )
}

pub fn list_services<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    search: Option<&str>,
) -> BookingResult<Vec<Service>> {
    Ok(backend
        .services(barbershop.id)?
        .into_iter()
        .filter(|service| matches_search(&service.name, search))
        .collect())
}

pub fn create_service<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    request: ServiceRequest,
) -> BookingResult<Service> {
    let service = Service {
        id: Uuid::new_v4(),
        barbershop_id: barbershop.id,
        name: request.name,
        description: request.description,
        price_cents: request.price_cents,
        duration_minutes: request.duration_minutes,
        is_active: request.is_active,
    };
    backend.add_service(service.clone())?;
    Ok(service)
}

pub fn update_service<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    id: Uuid,
    request: ServiceRequest,
) -> BookingResult<Service> {
    let service = Service {
        name: request.name,
        description: request.description,
        price_cents: request.price_cents,
        duration_minutes: request.duration_minutes,
        is_active: request.is_active,
        ..service(backend, barbershop, id)?
    };
    backend.update_service(service.clone())?;
    Ok(service)
}

pub fn remove_service<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    id: Uuid,
) -> BookingResult<()> {
    service(backend, barbershop, id)?;
    backend.remove_service(id)
}

fn working_hours_entry<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    id: Uuid,
) -> BookingResult<WorkingHours> {
    backend
        .working_hours(barbershop.id)?
        .into_iter()
        .find(|hours| hours.id == id)
        .ok_or_else(|| BookingError::not_found("Working hours"))
}

pub fn create_working_hours<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    request: WorkingHoursRequest,
) -> BookingResult<WorkingHours> {
    let working_hours = WorkingHours {
        id: Uuid::new_v4(),
        barbershop_id: barbershop.id,
        day_of_week: request.day_of_week,
        start_time: request.start_time,
        end_time: request.end_time,
    };
    backend.add_working_hours(working_hours.clone())?;
    Ok(working_hours)
}

pub fn update_working_hours<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    id: Uuid,
    request: WorkingHoursRequest,
) -> BookingResult<WorkingHours> {
    let working_hours = WorkingHours {
        day_of_week: request.day_of_week,
        start_time: request.start_time,
        end_time: request.end_time,
        ..working_hours_entry(backend, barbershop, id)?
    };
    backend.update_working_hours(working_hours.clone())?;
    Ok(working_hours)
}

pub fn remove_working_hours<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    id: Uuid,
) -> BookingResult<()> {
    working_hours_entry(backend, barbershop, id)?;
    backend.remove_working_hours(id)
}

pub fn assign_service<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    request: EmployeeServiceRequest,
) -> BookingResult<EmployeeService> {
    employee(backend, barbershop, request.employee_id)?;
    service(backend, barbershop, request.service_id)?;
    let employee_service = EmployeeService {
        id: Uuid::new_v4(),
        employee_id: request.employee_id,
        service_id: request.service_id,
    };
    backend.add_employee_service(employee_service.clone())?;
    Ok(employee_service)
}

pub fn unassign_service<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    id: Uuid,
) -> BookingResult<()> {
    let assigned = backend
        .employee_services(barbershop.id)?
        .iter()
        .any(|es| es.id == id);
    if !assigned {
        return Err(BookingError::not_found("Employee service"));
    }
    backend.remove_employee_service(id)
}

fn expense<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    id: Uuid,
) -> BookingResult<Expense> {
    backend
        .expenses(barbershop.id)?
        .into_iter()
        .find(|expense| expense.id == id)
        .ok_or_else(|| BookingError::not_found("Expense"))
}

pub fn list_expenses<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    filter: &ExpenseFilter,
) -> BookingResult<Vec<Expense>> {
    Ok(backend
        .expenses(barbershop.id)?
        .into_iter()
        .filter(|e| filter.start_date.map_or(true, |start| e.date >= start))
        .filter(|e| filter.end_date.map_or(true, |end| e.date <= end))
        .filter(|e| filter.expense_type.map_or(true, |kind| e.expense_type == kind))
        .collect())
}

pub fn create_expense<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    request: ExpenseRequest,
) -> BookingResult<Expense> {
    let expense = Expense {
        id: Uuid::new_v4(),
        barbershop_id: barbershop.id,
        description: request.description,
        amount_cents: request.amount_cents,
        date: request.date,
        expense_type: request.expense_type,
        notes: request.notes,
    };
    backend.add_expense(expense.clone())?;
    Ok(expense)
}

pub fn update_expense<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    id: Uuid,
    request: ExpenseRequest,
) -> BookingResult<Expense> {
    let expense = Expense {
        description: request.description,
        amount_cents: request.amount_cents,
        date: request.date,
        expense_type: request.expense_type,
        notes: request.notes,
        ..expense(backend, barbershop, id)?
    };
    backend.update_expense(expense.clone())?;
    Ok(expense)
}

pub fn remove_expense<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    id: Uuid,
) -> BookingResult<()> {
    expense(backend, barbershop, id)?;
    backend.remove_expense(id)
}

fn inventory_item<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    id: Uuid,
) -> BookingResult<InventoryItem> {
    backend
        .inventory(barbershop.id)?
        .into_iter()
        .find(|item| item.id == id)
        .ok_or_else(|| BookingError::not_found("Inventory item"))
}

pub fn list_inventory<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    filter: &InventoryFilter,
) -> BookingResult<Vec<InventoryItem>> {
    Ok(backend
        .inventory(barbershop.id)?
        .into_iter()
        .filter(|item| matches_search(&item.name, filter.search.as_deref()))
        .filter(|item| !filter.low_stock || item.is_low_stock())
        .collect())
}

/// `today` becomes the restock date of the item.
pub fn create_inventory_item<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    request: InventoryRequest,
    today: NaiveDate,
) -> BookingResult<InventoryItem> {
    let item = InventoryItem {
        id: Uuid::new_v4(),
        barbershop_id: barbershop.id,
        name: request.name,
        quantity: request.quantity,
        reorder_level: request.reorder_level,
        unit_price_cents: request.unit_price_cents,
        last_restocked: today,
    };
    backend.add_inventory_item(item.clone())?;
    Ok(item)
}

pub fn update_inventory_item<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    id: Uuid,
    request: InventoryRequest,
    today: NaiveDate,
) -> BookingResult<InventoryItem> {
    let item = InventoryItem {
        name: request.name,
        quantity: request.quantity,
        reorder_level: request.reorder_level,
        unit_price_cents: request.unit_price_cents,
        last_restocked: today,
        ..inventory_item(backend, barbershop, id)?
    };
    backend.update_inventory_item(item.clone())?;
    Ok(item)
}

pub fn remove_inventory_item<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    id: Uuid,
) -> BookingResult<()> {
    inventory_item(backend, barbershop, id)?;
    backend.remove_inventory_item(id)
}

pub fn list_appointments<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    filter: &AppointmentFilter,
) -> BookingResult<Vec<AppointmentDetails>> {
    let appointments = backend
        .appointments(barbershop.id)?
        .into_iter()
        .filter(|a| filter.date.map_or(true, |date| a.date == date))
        .filter(|a| filter.status.map_or(true, |status| a.status == status))
        .collect();
    appointment_details(backend, barbershop, appointments)
}

pub fn list_clients<B: BarbershopBackend>(
    backend: &B,
    barbershop: &Barbershop,
    search: Option<&str>,
) -> BookingResult<Vec<Client>> {
    Ok(backend
        .clients(barbershop.id)?
        .into_iter()
        .filter(|client| {
            matches_search(&client.name, search) || matches_search(&client.phone, search)
        })
        .collect())
}
