use crate::backend::BarbershopBackend;
use crate::clock::{Clock, MockClock};
use crate::configuration::Configuration;
use crate::error::{BookingError, BookingResult};
use crate::http::create_app;
use crate::local_store::LocalStore;
use crate::slug::unique_slug;
use crate::types::{
    Appointment, AppointmentStatus, Barbershop, Client, DayOfWeek, Employee, EmployeeRole,
    EmployeeService, Expense, InventoryItem, Notification, Owner, Review, Service, WorkingHours,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::{net::TcpListener, task::JoinHandle, time::timeout};
use tokio_stream::{wrappers::BroadcastStream, StreamExt};
use uuid::Uuid;

pub const ADMIN_PASSWORD: &str = "secret";
pub const PUBLIC_URL: &str = "http://cuts.test";

#[derive(Debug, Clone)]
pub struct TestConfiguration;

impl Configuration for TestConfiguration {
    fn admin_password(&self) -> String {
        ADMIN_PASSWORD.into()
    }

    fn public_url(&self) -> String {
        PUBLIC_URL.into()
    }

    fn database_url(&self) -> Option<String> {
        None
    }

    fn port(&self) -> String {
        "0".into()
    }

    fn slot_interval(&self) -> chrono::Duration {
        chrono::Duration::minutes(30)
    }

    fn seed_demo(&self) -> bool {
        false
    }
}

pub fn time(value: &str) -> NaiveTime {
    NaiveTime::parse_from_str(value, "%H:%M").unwrap()
}

pub fn at(value: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M").unwrap()
}

/// Clock frozen at `value` ("YYYY-MM-DD HH:MM").
pub fn fixed_clock(value: &str) -> Arc<dyn Clock> {
    let mut clock = MockClock::new();
    clock.expect_now().return_const(at(value));
    Arc::new(clock)
}

pub fn seed_owner<B: BarbershopBackend>(store: &B) -> Owner {
    let owner = Owner {
        id: Uuid::new_v4(),
        username: format!("owner-{}", Uuid::new_v4().simple()),
        token: Uuid::new_v4().simple().to_string(),
        created_at: Utc::now(),
    };
    store.add_owner(owner.clone()).unwrap();
    owner
}

pub fn seed_barbershop_for<B: BarbershopBackend>(
    store: &B,
    owner: &Owner,
    name: &str,
) -> Barbershop {
    let barbershop = Barbershop {
        id: Uuid::new_v4(),
        owner_id: owner.id,
        name: name.into(),
        slug: unique_slug(store, name).unwrap(),
        address: "1 Main St".into(),
        phone: "+5511999990000".into(),
        email: "shop@cuts.test".into(),
        description: String::new(),
        code: Uuid::new_v4(),
        is_open: true,
    };
    store.add_barbershop(barbershop.clone()).unwrap();
    barbershop
}

pub fn seed_barbershop<B: BarbershopBackend>(store: &B, name: &str) -> Barbershop {
    let owner = seed_owner(store);
    seed_barbershop_for(store, &owner, name)
}

pub fn open_every_day<B: BarbershopBackend>(
    store: &B,
    barbershop: &Barbershop,
    opening: &str,
    closing: &str,
) {
    for day_of_week in DayOfWeek::ALL {
        store
            .add_working_hours(WorkingHours {
                id: Uuid::new_v4(),
                barbershop_id: barbershop.id,
                day_of_week,
                start_time: time(opening),
                end_time: time(closing),
            })
            .unwrap();
    }
}

pub fn new_employee(barbershop_id: Uuid, name: &str, phone: &str) -> Employee {
    Employee {
        id: Uuid::new_v4(),
        barbershop_id,
        name: name.into(),
        phone: phone.into(),
        role: EmployeeRole::Barber,
        hire_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        is_active: true,
    }
}

pub fn new_service(barbershop_id: Uuid, name: &str, duration_minutes: i32) -> Service {
    Service {
        id: Uuid::new_v4(),
        barbershop_id,
        name: name.into(),
        description: String::new(),
        price_cents: 3500,
        duration_minutes,
        is_active: true,
    }
}

pub fn new_client(barbershop_id: Uuid, name: &str, phone: &str) -> Client {
    Client {
        id: Uuid::new_v4(),
        barbershop_id,
        name: name.into(),
        phone: phone.into(),
        created_at: Utc::now(),
    }
}

pub fn new_appointment(
    barbershop: &Barbershop,
    client: &Client,
    employee: &Employee,
    service: &Service,
    date: NaiveDate,
    time: NaiveTime,
) -> Appointment {
    Appointment {
        id: Uuid::new_v4(),
        barbershop_id: barbershop.id,
        client_id: client.id,
        employee_id: employee.id,
        service_id: service.id,
        date,
        time,
        status: AppointmentStatus::Scheduled,
        created_at: Utc::now(),
    }
}

/// A barbershop open 09:00-18:00 with one barber performing a one hour
/// haircut and one registered client.
pub struct ShopFixture {
    pub owner: Owner,
    pub barbershop: Barbershop,
    pub employee: Employee,
    pub service: Service,
    pub client: Client,
}

pub fn seed_shop_with_staff<B: BarbershopBackend>(store: &B) -> ShopFixture {
    let owner = seed_owner(store);
    let barbershop = seed_barbershop_for(store, &owner, "North Cuts");
    open_every_day(store, &barbershop, "09:00", "18:00");

    let employee = new_employee(barbershop.id, "John", "+5511999990000");
    let service = new_service(barbershop.id, "Haircut", 60);
    let client = new_client(barbershop.id, "Ana", "11987654321");
    store.add_employee(employee.clone()).unwrap();
    store.add_service(service.clone()).unwrap();
    store.add_client(client.clone()).unwrap();
    store
        .add_employee_service(EmployeeService {
            id: Uuid::new_v4(),
            employee_id: employee.id,
            service_id: service.id,
        })
        .unwrap();

    ShopFixture {
        owner,
        barbershop,
        employee,
        service,
        client,
    }
}

/// Backend whose notification storage is down. Everything else goes to `store`.
#[derive(Debug, Clone, Default)]
pub struct NotificationOutage {
    pub store: LocalStore,
}

macro_rules! delegate_to_store {
    ($($name:ident($($arg:ident: $ty:ty),*) -> $ret:ty;)*) => {
        $(fn $name(&self, $($arg: $ty),*) -> $ret {
            self.store.$name($($arg),*)
        })*
    };
}

impl BarbershopBackend for NotificationOutage {
    delegate_to_store! {
        appointment_events() -> BroadcastStream<Appointment>;
        add_owner(owner: Owner) -> BookingResult<()>;
        owner_by_token(token: &str) -> BookingResult<Option<Owner>>;
        barbershops(owner_id: Uuid) -> BookingResult<Vec<Barbershop>>;
        barbershop(id: Uuid) -> BookingResult<Option<Barbershop>>;
        barbershop_by_slug(slug: &str) -> BookingResult<Option<Barbershop>>;
        add_barbershop(barbershop: Barbershop) -> BookingResult<()>;
        update_barbershop(barbershop: Barbershop) -> BookingResult<()>;
        working_hours(barbershop_id: Uuid) -> BookingResult<Vec<WorkingHours>>;
        add_working_hours(working_hours: WorkingHours) -> BookingResult<()>;
        update_working_hours(working_hours: WorkingHours) -> BookingResult<()>;
        remove_working_hours(id: Uuid) -> BookingResult<()>;
        employees(barbershop_id: Uuid) -> BookingResult<Vec<Employee>>;
        employee(id: Uuid) -> BookingResult<Option<Employee>>;
        add_employee(employee: Employee) -> BookingResult<()>;
        update_employee(employee: Employee) -> BookingResult<()>;
        remove_employee(id: Uuid) -> BookingResult<()>;
        services(barbershop_id: Uuid) -> BookingResult<Vec<Service>>;
        service(id: Uuid) -> BookingResult<Option<Service>>;
        add_service(service: Service) -> BookingResult<()>;
        update_service(service: Service) -> BookingResult<()>;
        remove_service(id: Uuid) -> BookingResult<()>;
        employee_services(barbershop_id: Uuid) -> BookingResult<Vec<EmployeeService>>;
        add_employee_service(employee_service: EmployeeService) -> BookingResult<()>;
        remove_employee_service(id: Uuid) -> BookingResult<()>;
        clients(barbershop_id: Uuid) -> BookingResult<Vec<Client>>;
        client_by_phone(barbershop_id: Uuid, phone: &str) -> BookingResult<Option<Client>>;
        add_client(client: Client) -> BookingResult<()>;
        appointments(barbershop_id: Uuid) -> BookingResult<Vec<Appointment>>;
        appointment(id: Uuid) -> BookingResult<Option<Appointment>>;
        employee_appointments(employee_id: Uuid, date: NaiveDate) -> BookingResult<Vec<Appointment>>;
        add_appointment(appointment: Appointment) -> BookingResult<()>;
        update_appointment_status(id: Uuid, status: AppointmentStatus) -> BookingResult<Appointment>;
        reviews(barbershop_id: Uuid) -> BookingResult<Vec<Review>>;
        add_review(review: Review) -> BookingResult<()>;
        notifications(client_id: Uuid) -> BookingResult<Vec<Notification>>;
        mark_notification_read(id: Uuid) -> BookingResult<()>;
        expenses(barbershop_id: Uuid) -> BookingResult<Vec<Expense>>;
        add_expense(expense: Expense) -> BookingResult<()>;
        update_expense(expense: Expense) -> BookingResult<()>;
        remove_expense(id: Uuid) -> BookingResult<()>;
        inventory(barbershop_id: Uuid) -> BookingResult<Vec<InventoryItem>>;
        add_inventory_item(item: InventoryItem) -> BookingResult<()>;
        update_inventory_item(item: InventoryItem) -> BookingResult<()>;
        remove_inventory_item(id: Uuid) -> BookingResult<()>;
    }

    fn add_notification(&self, _notification: Notification) -> BookingResult<()> {
        Err(BookingError::storage("Notification storage unavailable"))
    }
}

pub async fn read_from_appointment_stream(
    stream: &mut BroadcastStream<Appointment>,
) -> Appointment {
    timeout(Duration::from_secs(1), stream.next())
        .await
        .expect("no appointment event within a second")
        .expect("appointment stream closed")
        .expect("appointment stream lagged")
}

/// Serves the API on an ephemeral port and returns its base URL.
pub async fn spawn_app(store: LocalStore, now: &str) -> (JoinHandle<()>, String) {
    let app = create_app(store, TestConfiguration, fixed_clock(now));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (server, format!("http://{address}"))
}
