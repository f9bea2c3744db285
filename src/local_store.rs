use crate::backend::{BarbershopBackend, APPOINTMENT_EVENT_CAPACITY};
use crate::error::{BookingError, BookingResult};
use crate::types::{
    Appointment, AppointmentStatus, Barbershop, Client, Employee, EmployeeService, Expense,
    InventoryItem, Notification, Owner, Review, Service, WorkingHours,
};
use chrono::NaiveDate;
use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard},
};
use tokio::sync::broadcast::{self, Sender};
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, error};
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
    owners: HashMap<Uuid, Owner>,
    barbershops: HashMap<Uuid, Barbershop>,
    working_hours: HashMap<Uuid, WorkingHours>,
    employees: HashMap<Uuid, Employee>,
    services: HashMap<Uuid, Service>,
    employee_services: HashMap<Uuid, EmployeeService>,
    clients: HashMap<Uuid, Client>,
    appointments: HashMap<Uuid, Appointment>,
    reviews: HashMap<Uuid, Review>,
    notifications: HashMap<Uuid, Notification>,
    expenses: HashMap<Uuid, Expense>,
    inventory: HashMap<Uuid, InventoryItem>,
}

impl Tables {
    fn require_barbershop(&self, id: Uuid) -> BookingResult<()> {
        match self.barbershops.contains_key(&id) {
            true => Ok(()),
            false => Err(BookingError::invalid(format!("Barbershop {id} does not exist"))),
        }
    }

    /// Removes the matching appointments together with their reviews and notifications.
    fn drop_appointments(&mut self, matches: impl Fn(&Appointment) -> bool) {
        let removed: HashSet<Uuid> = self
            .appointments
            .values()
            .filter(|appointment| matches(appointment))
            .map(|appointment| appointment.id)
            .collect();
        self.appointments.retain(|id, _| !removed.contains(id));
        self.reviews
            .retain(|_, review| !removed.contains(&review.appointment_id));
        self.notifications
            .retain(|_, notification| !removed.contains(&notification.appointment_id));
    }

    fn slot_taken(&self, candidate: &Appointment) -> bool {
        self.appointments.values().any(|appointment| {
            appointment.id != candidate.id
                && appointment.is_scheduled()
                && appointment.employee_id == candidate.employee_id
                && appointment.date == candidate.date
                && appointment.time == candidate.time
        })
    }
}

/// Backend keeping everything in memory. Data is lost when the process exits.
#[derive(Debug, Clone)]
pub struct LocalStore {
    tables: Arc<Mutex<Tables>>,
    sender: Sender<Appointment>,
}

impl Default for LocalStore {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(APPOINTMENT_EVENT_CAPACITY);
        Self {
            tables: Arc::new(Mutex::default()),
            sender,
        }
    }
}

impl LocalStore {
    fn tables(&self) -> BookingResult<MutexGuard<'_, Tables>> {
        self.tables.lock().map_err(|err| {
            error!(%err, "Local store lock poisoned");
            BookingError::storage("Local store unavailable")
        })
    }

    fn send_appointment(&self, appointment: Appointment) {
        if self.sender.send(appointment).is_err() {
            debug!("No subscribers for appointment events");
        }
    }
}

fn sorted<T: Clone, K: Ord>(
    records: &HashMap<Uuid, T>,
    keep: impl Fn(&T) -> bool,
    key: impl Fn(&T) -> K,
) -> Vec<T> {
    let mut records: Vec<T> = records.values().filter(|r| keep(r)).cloned().collect();
    records.sort_by_key(|r| key(r));
    records
}

fn replace<T>(records: &mut HashMap<Uuid, T>, id: Uuid, record: T, what: &str) -> BookingResult<()> {
    match records.get_mut(&id) {
        Some(existing) => {
            *existing = record;
            Ok(())
        }
        None => Err(BookingError::not_found(what)),
    }
}

fn remove<T>(records: &mut HashMap<Uuid, T>, id: Uuid, what: &str) -> BookingResult<T> {
    records
        .remove(&id)
        .ok_or_else(|| BookingError::not_found(what))
}

impl BarbershopBackend for LocalStore {
    fn appointment_events(&self) -> BroadcastStream<Appointment> {
        BroadcastStream::new(self.sender.subscribe())
    }

    fn add_owner(&self, owner: Owner) -> BookingResult<()> {
        let mut tables = self.tables()?;
        if tables
            .owners
            .values()
            .any(|o| o.username == owner.username || o.token == owner.token)
        {
            return Err(BookingError::conflict(format!(
                "Owner '{}' already exists",
                owner.username
            )));
        }
        tables.owners.insert(owner.id, owner);
        Ok(())
    }

    fn owner_by_token(&self, token: &str) -> BookingResult<Option<Owner>> {
        Ok(self
            .tables()?
            .owners
            .values()
            .find(|owner| owner.token == token)
            .cloned())
    }

    fn barbershops(&self, owner_id: Uuid) -> BookingResult<Vec<Barbershop>> {
        Ok(sorted(
            &self.tables()?.barbershops,
            |b| b.owner_id == owner_id,
            |b| b.name.clone(),
        ))
    }

    fn barbershop(&self, id: Uuid) -> BookingResult<Option<Barbershop>> {
        Ok(self.tables()?.barbershops.get(&id).cloned())
    }

    fn barbershop_by_slug(&self, slug: &str) -> BookingResult<Option<Barbershop>> {
        Ok(self
            .tables()?
            .barbershops
            .values()
            .find(|b| b.slug == slug)
            .cloned())
    }

    fn add_barbershop(&self, barbershop: Barbershop) -> BookingResult<()> {
        let mut tables = self.tables()?;
        if !tables.owners.contains_key(&barbershop.owner_id) {
            return Err(BookingError::invalid("Owner does not exist"));
        }
        if tables
            .barbershops
            .values()
            .any(|b| b.slug == barbershop.slug || b.code == barbershop.code)
        {
            return Err(BookingError::conflict(format!(
                "Barbershop slug '{}' is already taken",
                barbershop.slug
            )));
        }
        tables.barbershops.insert(barbershop.id, barbershop);
        Ok(())
    }

    fn update_barbershop(&self, barbershop: Barbershop) -> BookingResult<()> {
        let mut tables = self.tables()?;
        if tables
            .barbershops
            .values()
            .any(|b| b.id != barbershop.id && b.slug == barbershop.slug)
        {
            return Err(BookingError::conflict(format!(
                "Barbershop slug '{}' is already taken",
                barbershop.slug
            )));
        }
        replace(&mut tables.barbershops, barbershop.id, barbershop, "Barbershop")
    }

    fn working_hours(&self, barbershop_id: Uuid) -> BookingResult<Vec<WorkingHours>> {
        Ok(sorted(
            &self.tables()?.working_hours,
            |w| w.barbershop_id == barbershop_id,
            |w| w.day_of_week,
        ))
    }

    fn add_working_hours(&self, working_hours: WorkingHours) -> BookingResult<()> {
        let mut tables = self.tables()?;
        tables.require_barbershop(working_hours.barbershop_id)?;
        if tables.working_hours.values().any(|w| {
            w.barbershop_id == working_hours.barbershop_id
                && w.day_of_week == working_hours.day_of_week
        }) {
            return Err(BookingError::conflict(format!(
                "Working hours for {:?} already exist",
                working_hours.day_of_week
            )));
        }
        tables.working_hours.insert(working_hours.id, working_hours);
        Ok(())
    }

    fn update_working_hours(&self, working_hours: WorkingHours) -> BookingResult<()> {
        let mut tables = self.tables()?;
        if tables.working_hours.values().any(|w| {
            w.id != working_hours.id
                && w.barbershop_id == working_hours.barbershop_id
                && w.day_of_week == working_hours.day_of_week
        }) {
            return Err(BookingError::conflict(format!(
                "Working hours for {:?} already exist",
                working_hours.day_of_week
            )));
        }
        replace(
            &mut tables.working_hours,
            working_hours.id,
            working_hours,
            "Working hours",
        )
    }

    fn remove_working_hours(&self, id: Uuid) -> BookingResult<()> {
        remove(&mut self.tables()?.working_hours, id, "Working hours").map(|_| ())
    }

    fn employees(&self, barbershop_id: Uuid) -> BookingResult<Vec<Employee>> {
        Ok(sorted(
            &self.tables()?.employees,
            |e| e.barbershop_id == barbershop_id,
            |e| e.name.clone(),
        ))
    }

    fn employee(&self, id: Uuid) -> BookingResult<Option<Employee>> {
        Ok(self.tables()?.employees.get(&id).cloned())
    }

    fn add_employee(&self, employee: Employee) -> BookingResult<()> {
        let mut tables = self.tables()?;
        tables.require_barbershop(employee.barbershop_id)?;
        if tables
            .employees
            .values()
            .any(|e| e.barbershop_id == employee.barbershop_id && e.phone == employee.phone)
        {
            return Err(BookingError::conflict(format!(
                "An employee with phone {} already exists",
                employee.phone
            )));
        }
        tables.employees.insert(employee.id, employee);
        Ok(())
    }

    fn update_employee(&self, employee: Employee) -> BookingResult<()> {
        let mut tables = self.tables()?;
        if tables.employees.values().any(|e| {
            e.id != employee.id
                && e.barbershop_id == employee.barbershop_id
                && e.phone == employee.phone
        }) {
            return Err(BookingError::conflict(format!(
                "An employee with phone {} already exists",
                employee.phone
            )));
        }
        replace(&mut tables.employees, employee.id, employee, "Employee")
    }

    fn remove_employee(&self, id: Uuid) -> BookingResult<()> {
        let mut tables = self.tables()?;
        remove(&mut tables.employees, id, "Employee")?;
        tables.employee_services.retain(|_, es| es.employee_id != id);
        tables.drop_appointments(|a| a.employee_id == id);
        Ok(())
    }

    fn services(&self, barbershop_id: Uuid) -> BookingResult<Vec<Service>> {
        Ok(sorted(
            &self.tables()?.services,
            |s| s.barbershop_id == barbershop_id,
            |s| s.name.clone(),
        ))
    }

    fn service(&self, id: Uuid) -> BookingResult<Option<Service>> {
        Ok(self.tables()?.services.get(&id).cloned())
    }

    fn add_service(&self, service: Service) -> BookingResult<()> {
        let mut tables = self.tables()?;
        tables.require_barbershop(service.barbershop_id)?;
        tables.services.insert(service.id, service);
        Ok(())
    }

    fn update_service(&self, service: Service) -> BookingResult<()> {
        replace(&mut self.tables()?.services, service.id, service, "Service")
    }

    fn remove_service(&self, id: Uuid) -> BookingResult<()> {
        let mut tables = self.tables()?;
        remove(&mut tables.services, id, "Service")?;
        tables.employee_services.retain(|_, es| es.service_id != id);
        tables.drop_appointments(|a| a.service_id == id);
        Ok(())
    }

    fn employee_services(&self, barbershop_id: Uuid) -> BookingResult<Vec<EmployeeService>> {
        let tables = self.tables()?;
        let mut assignments: Vec<EmployeeService> = tables
            .employee_services
            .values()
            .filter(|es| {
                tables
                    .employees
                    .get(&es.employee_id)
                    .is_some_and(|e| e.barbershop_id == barbershop_id)
            })
            .cloned()
            .collect();
        assignments.sort_by_key(|es| (es.employee_id, es.service_id));
        Ok(assignments)
    }

    fn add_employee_service(&self, employee_service: EmployeeService) -> BookingResult<()> {
        let mut tables = self.tables()?;
        if !tables.employees.contains_key(&employee_service.employee_id)
            || !tables.services.contains_key(&employee_service.service_id)
        {
            return Err(BookingError::invalid("Employee or service does not exist"));
        }
        if tables.employee_services.values().any(|es| {
            es.employee_id == employee_service.employee_id
                && es.service_id == employee_service.service_id
        }) {
            return Err(BookingError::conflict(
                "Employee already performs this service",
            ));
        }
        tables
            .employee_services
            .insert(employee_service.id, employee_service);
        Ok(())
    }

    fn remove_employee_service(&self, id: Uuid) -> BookingResult<()> {
        remove(&mut self.tables()?.employee_services, id, "Employee service").map(|_| ())
    }

    fn clients(&self, barbershop_id: Uuid) -> BookingResult<Vec<Client>> {
        Ok(sorted(
            &self.tables()?.clients,
            |c| c.barbershop_id == barbershop_id,
            |c| std::cmp::Reverse(c.created_at),
        ))
    }

    fn client_by_phone(&self, barbershop_id: Uuid, phone: &str) -> BookingResult<Option<Client>> {
        Ok(self
            .tables()?
            .clients
            .values()
            .find(|c| c.barbershop_id == barbershop_id && c.phone == phone)
            .cloned())
    }

    fn add_client(&self, client: Client) -> BookingResult<()> {
        let mut tables = self.tables()?;
        tables.require_barbershop(client.barbershop_id)?;
        if tables
            .clients
            .values()
            .any(|c| c.barbershop_id == client.barbershop_id && c.phone == client.phone)
        {
            return Err(BookingError::conflict(format!(
                "Phone {} is already registered",
                client.phone
            )));
        }
        tables.clients.insert(client.id, client);
        Ok(())
    }

    fn appointments(&self, barbershop_id: Uuid) -> BookingResult<Vec<Appointment>> {
        Ok(sorted(
            &self.tables()?.appointments,
            |a| a.barbershop_id == barbershop_id,
            |a| std::cmp::Reverse((a.date, a.time)),
        ))
    }

    fn appointment(&self, id: Uuid) -> BookingResult<Option<Appointment>> {
        Ok(self.tables()?.appointments.get(&id).cloned())
    }

    fn employee_appointments(
        &self,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> BookingResult<Vec<Appointment>> {
        Ok(sorted(
            &self.tables()?.appointments,
            |a| a.employee_id == employee_id && a.date == date,
            |a| a.time,
        ))
    }

    fn add_appointment(&self, appointment: Appointment) -> BookingResult<()> {
        {
            let mut tables = self.tables()?;
            tables.require_barbershop(appointment.barbershop_id)?;
            if !tables.clients.contains_key(&appointment.client_id)
                || !tables.employees.contains_key(&appointment.employee_id)
                || !tables.services.contains_key(&appointment.service_id)
            {
                return Err(BookingError::invalid(
                    "Client, employee or service does not exist",
                ));
            }
            if appointment.is_scheduled() && tables.slot_taken(&appointment) {
                return Err(BookingError::conflict("Slot is already booked"));
            }
            tables
                .appointments
                .insert(appointment.id, appointment.clone());
        }
        self.send_appointment(appointment);
        Ok(())
    }

    fn update_appointment_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> BookingResult<Appointment> {
        let appointment = {
            let mut tables = self.tables()?;
            let mut appointment = tables
                .appointments
                .get(&id)
                .cloned()
                .ok_or_else(|| BookingError::not_found("Appointment"))?;
            appointment.status = status;
            if appointment.is_scheduled() && tables.slot_taken(&appointment) {
                return Err(BookingError::conflict("Slot is already booked"));
            }
            tables.appointments.insert(id, appointment.clone());
            appointment
        };
        self.send_appointment(appointment.clone());
        Ok(appointment)
    }

    fn reviews(&self, barbershop_id: Uuid) -> BookingResult<Vec<Review>> {
        let tables = self.tables()?;
        Ok(sorted(
            &tables.reviews,
            |r| {
                tables
                    .appointments
                    .get(&r.appointment_id)
                    .is_some_and(|a| a.barbershop_id == barbershop_id)
            },
            |r| std::cmp::Reverse(r.created_at),
        ))
    }

    fn add_review(&self, review: Review) -> BookingResult<()> {
        let mut tables = self.tables()?;
        if !tables.appointments.contains_key(&review.appointment_id) {
            return Err(BookingError::invalid("Appointment does not exist"));
        }
        if tables
            .reviews
            .values()
            .any(|r| r.appointment_id == review.appointment_id)
        {
            return Err(BookingError::conflict("Appointment was already reviewed"));
        }
        tables.reviews.insert(review.id, review);
        Ok(())
    }

    fn notifications(&self, client_id: Uuid) -> BookingResult<Vec<Notification>> {
        Ok(sorted(
            &self.tables()?.notifications,
            |n| n.client_id == client_id,
            |n| std::cmp::Reverse(n.sent_at),
        ))
    }

    fn add_notification(&self, notification: Notification) -> BookingResult<()> {
        let mut tables = self.tables()?;
        if !tables.clients.contains_key(&notification.client_id)
            || !tables.appointments.contains_key(&notification.appointment_id)
        {
            return Err(BookingError::invalid("Client or appointment does not exist"));
        }
        tables.notifications.insert(notification.id, notification);
        Ok(())
    }

    fn mark_notification_read(&self, id: Uuid) -> BookingResult<()> {
        match self.tables()?.notifications.get_mut(&id) {
            Some(notification) => {
                notification.is_read = true;
                Ok(())
            }
            None => Err(BookingError::not_found("Notification")),
        }
    }

    fn expenses(&self, barbershop_id: Uuid) -> BookingResult<Vec<Expense>> {
        Ok(sorted(
            &self.tables()?.expenses,
            |e| e.barbershop_id == barbershop_id,
            |e| std::cmp::Reverse(e.date),
        ))
    }

    fn add_expense(&self, expense: Expense) -> BookingResult<()> {
        let mut tables = self.tables()?;
        tables.require_barbershop(expense.barbershop_id)?;
        tables.expenses.insert(expense.id, expense);
        Ok(())
    }

    fn update_expense(&self, expense: Expense) -> BookingResult<()> {
        replace(&mut self.tables()?.expenses, expense.id, expense, "Expense")
    }

    fn remove_expense(&self, id: Uuid) -> BookingResult<()> {
        remove(&mut self.tables()?.expenses, id, "Expense").map(|_| ())
    }

    fn inventory(&self, barbershop_id: Uuid) -> BookingResult<Vec<InventoryItem>> {
        Ok(sorted(
            &self.tables()?.inventory,
            |i| i.barbershop_id == barbershop_id,
            |i| i.name.clone(),
        ))
    }

    fn add_inventory_item(&self, item: InventoryItem) -> BookingResult<()> {
        let mut tables = self.tables()?;
        tables.require_barbershop(item.barbershop_id)?;
        tables.inventory.insert(item.id, item);
        Ok(())
    }

    fn update_inventory_item(&self, item: InventoryItem) -> BookingResult<()> {
        replace(&mut self.tables()?.inventory, item.id, item, "Inventory item")
    }

    fn remove_inventory_item(&self, id: Uuid) -> BookingResult<()> {
        remove(&mut self.tables()?.inventory, id, "Inventory item").map(|_| ())
    }
}
