use crate::error::BookingResult;
use crate::types::{
    Appointment, AppointmentStatus, Barbershop, Client, Employee, EmployeeService, Expense,
    InventoryItem, Notification, Owner, Review, Service, WorkingHours,
};
use chrono::NaiveDate;
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

/// Capacity of the appointment event channel shared by all backends.
pub const APPOINTMENT_EVENT_CAPACITY: usize = 64;

/// Storage for every record of the service.
///
/// Lists are scoped to their parent record and come back in a stable order.
/// `update_*` and `remove_*` fail with `NotFound` for unknown ids, and every
/// uniqueness constraint violation is reported as `Conflict`.
pub trait BarbershopBackend: Clone + Send + Sync + 'static {
    /// Every appointment that is created or changes status, from now on.
    fn appointment_events(&self) -> BroadcastStream<Appointment>;

    fn add_owner(&self, owner: Owner) -> BookingResult<()>;
    fn owner_by_token(&self, token: &str) -> BookingResult<Option<Owner>>;

    fn barbershops(&self, owner_id: Uuid) -> BookingResult<Vec<Barbershop>>;
    fn barbershop(&self, id: Uuid) -> BookingResult<Option<Barbershop>>;
    fn barbershop_by_slug(&self, slug: &str) -> BookingResult<Option<Barbershop>>;
    fn add_barbershop(&self, barbershop: Barbershop) -> BookingResult<()>;
    fn update_barbershop(&self, barbershop: Barbershop) -> BookingResult<()>;

    fn working_hours(&self, barbershop_id: Uuid) -> BookingResult<Vec<WorkingHours>>;
    fn add_working_hours(&self, working_hours: WorkingHours) -> BookingResult<()>;
    fn update_working_hours(&self, working_hours: WorkingHours) -> BookingResult<()>;
    fn remove_working_hours(&self, id: Uuid) -> BookingResult<()>;

    fn employees(&self, barbershop_id: Uuid) -> BookingResult<Vec<Employee>>;
    fn employee(&self, id: Uuid) -> BookingResult<Option<Employee>>;
    fn add_employee(&self, employee: Employee) -> BookingResult<()>;
    fn update_employee(&self, employee: Employee) -> BookingResult<()>;
    fn remove_employee(&self, id: Uuid) -> BookingResult<()>;

    fn services(&self, barbershop_id: Uuid) -> BookingResult<Vec<Service>>;
    fn service(&self, id: Uuid) -> BookingResult<Option<Service>>;
    fn add_service(&self, service: Service) -> BookingResult<()>;
    fn update_service(&self, service: Service) -> BookingResult<()>;
    fn remove_service(&self, id: Uuid) -> BookingResult<()>;

    fn employee_services(&self, barbershop_id: Uuid) -> BookingResult<Vec<EmployeeService>>;
    fn add_employee_service(&self, employee_service: EmployeeService) -> BookingResult<()>;
    fn remove_employee_service(&self, id: Uuid) -> BookingResult<()>;

    fn clients(&self, barbershop_id: Uuid) -> BookingResult<Vec<Client>>;
    fn client_by_phone(&self, barbershop_id: Uuid, phone: &str) -> BookingResult<Option<Client>>;
    fn add_client(&self, client: Client) -> BookingResult<()>;

    fn appointments(&self, barbershop_id: Uuid) -> BookingResult<Vec<Appointment>>;
    fn appointment(&self, id: Uuid) -> BookingResult<Option<Appointment>>;
    fn employee_appointments(
        &self,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> BookingResult<Vec<Appointment>>;
    fn add_appointment(&self, appointment: Appointment) -> BookingResult<()>;
    fn update_appointment_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> BookingResult<Appointment>;

    fn reviews(&self, barbershop_id: Uuid) -> BookingResult<Vec<Review>>;
    fn add_review(&self, review: Review) -> BookingResult<()>;

    fn notifications(&self, client_id: Uuid) -> BookingResult<Vec<Notification>>;
    fn add_notification(&self, notification: Notification) -> BookingResult<()>;
    fn mark_notification_read(&self, id: Uuid) -> BookingResult<()>;

    fn expenses(&self, barbershop_id: Uuid) -> BookingResult<Vec<Expense>>;
    fn add_expense(&self, expense: Expense) -> BookingResult<()>;
    fn update_expense(&self, expense: Expense) -> BookingResult<()>;
    fn remove_expense(&self, id: Uuid) -> BookingResult<()>;

    fn inventory(&self, barbershop_id: Uuid) -> BookingResult<Vec<InventoryItem>>;
    fn add_inventory_item(&self, item: InventoryItem) -> BookingResult<()>;
    fn update_inventory_item(&self, item: InventoryItem) -> BookingResult<()>;
    fn remove_inventory_item(&self, id: Uuid) -> BookingResult<()>;
}
