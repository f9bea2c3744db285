use super::AppState;
use crate::backend::BarbershopBackend;
use crate::booking::{change_appointment_status, AppointmentDetails};
use crate::configuration::Configuration;
use crate::dashboard::{dashboard, DashboardSummary};
use crate::error::BookingResult;
use crate::management::{self, owned_barbershop, BookingLink};
use crate::requests::{
    AppointmentFilter, AppointmentStatusRequest, BarbershopRequest, EmployeeRequest,
    EmployeeServiceRequest, ExpenseFilter, ExpenseRequest, InventoryFilter, InventoryRequest,
    SearchQuery, ServiceRequest, WorkingHoursRequest,
};
use crate::types::{
    Appointment, Barbershop, Client, Employee, EmployeeService, Expense, InventoryItem, Owner,
    Service, WorkingHours,
};
use axum::extract::{Path, Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{delete, get, put};
use axum::{http::StatusCode, Extension, Json, Router};
use axum_valid::Valid;
use futures::{future, Stream, StreamExt};
use std::convert::Infallible;
use tracing::warn;
use uuid::Uuid;

type Created<T> = BookingResult<(StatusCode, Json<T>)>;

fn created<T>(value: T) -> Created<T> {
    Ok((StatusCode::CREATED, Json(value)))
}

pub fn router<B: BarbershopBackend, C: Configuration>() -> Router<AppState<B, C>> {
    Router::new()
        .route(
            "/management/barbershops",
            get(list_barbershops).post(create_barbershop),
        )
        .route(
            "/management/barbershops/{id}",
            get(show_barbershop).put(update_barbershop),
        )
        .route(
            "/management/barbershops/{id}/booking-link",
            get(booking_link),
        )
        .route("/management/barbershops/{id}/dashboard", get(show_dashboard))
        .route(
            "/management/barbershops/{id}/employees",
            get(list_employees).post(create_employee),
        )
        .route(
            "/management/barbershops/{id}/employees/{employee_id}",
            get(show_employee)
                .put(update_employee)
                .delete(remove_employee),
        )
        .route(
            "/management/barbershops/{id}/services",
            get(list_services).post(create_service),
        )
        .route(
            "/management/barbershops/{id}/services/{service_id}",
            put(update_service).delete(remove_service),
        )
        .route(
            "/management/barbershops/{id}/working-hours",
            get(list_working_hours).post(create_working_hours),
        )
        .route(
            "/management/barbershops/{id}/working-hours/{working_hours_id}",
            put(update_working_hours).delete(remove_working_hours),
        )
        .route(
            "/management/barbershops/{id}/employee-services",
            get(list_employee_services).post(assign_service),
        )
        .route(
            "/management/barbershops/{id}/employee-services/{employee_service_id}",
            delete(unassign_service),
        )
        .route(
            "/management/barbershops/{id}/expenses",
            get(list_expenses).post(create_expense),
        )
        .route(
            "/management/barbershops/{id}/expenses/{expense_id}",
            put(update_expense).delete(remove_expense),
        )
        .route(
            "/management/barbershops/{id}/inventory",
            get(list_inventory).post(create_inventory_item),
        )
        .route(
            "/management/barbershops/{id}/inventory/{item_id}",
            put(update_inventory_item).delete(remove_inventory_item),
        )
        .route(
            "/management/barbershops/{id}/appointments",
            get(list_appointments),
        )
        .route(
            "/management/barbershops/{id}/appointments/{appointment_id}/status",
            put(set_appointment_status),
        )
        .route(
            "/management/barbershops/{id}/appointments/stream",
            get(appointment_stream),
        )
        .route("/management/barbershops/{id}/clients", get(list_clients))
}

async fn list_barbershops<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(owner): Extension<Owner>,
) -> BookingResult<Json<Vec<Barbershop>>> {
    Ok(Json(state.backend.barbershops(owner.id)?))
}

async fn create_barbershop<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(owner): Extension<Owner>,
    Valid(Json(request)): Valid<Json<BarbershopRequest>>,
) -> Created<Barbershop> {
    created(management::create_barbershop(&state.backend, &owner, request)?)
}

async fn show_barbershop<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(owner): Extension<Owner>,
    Path(id): Path<Uuid>,
) -> BookingResult<Json<Barbershop>> {
    Ok(Json(owned_barbershop(&state.backend, &owner, id)?))
}

async fn update_barbershop<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(owner): Extension<Owner>,
    Path(id): Path<Uuid>,
    Valid(Json(request)): Valid<Json<BarbershopRequest>>,
) -> BookingResult<Json<Barbershop>> {
    let barbershop = owned_barbershop(&state.backend, &owner, id)?;
    Ok(Json(management::update_barbershop(
        &state.backend,
        barbershop,
        request,
    )?))
}

async fn booking_link<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(owner): Extension<Owner>,
    Path(id): Path<Uuid>,
) -> BookingResult<Json<BookingLink>> {
    let barbershop = owned_barbershop(&state.backend, &owner, id)?;
    Ok(Json(management::booking_link(
        &state.configuration.public_url(),
        &barbershop,
    )))
}

async fn show_dashboard<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(owner): Extension<Owner>,
    Path(id): Path<Uuid>,
) -> BookingResult<Json<DashboardSummary>> {
    let barbershop = owned_barbershop(&state.backend, &owner, id)?;
    Ok(Json(dashboard(&state.backend, &barbershop, state.clock.now())?))
}

async fn list_employees<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(owner): Extension<Owner>,
    Path(id): Path<Uuid>,
    Query(query): Query<SearchQuery>,
) -> BookingResult<Json<Vec<Employee>>> {
    let barbershop = owned_barbershop(&state.backend, &owner, id)?;
    let employees =
        management::list_employees(&state.backend, &barbershop, query.search.as_deref())?;
    Ok(Json(employees))
}

async fn create_employee<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(owner): Extension<Owner>,
    Path(id): Path<Uuid>,
    Valid(Json(request)): Valid<Json<EmployeeRequest>>,
) -> Created<Employee> {
    let barbershop = owned_barbershop(&state.backend, &owner, id)?;
    created(management::create_employee(&state.backend, &barbershop, request)?)
}

async fn show_employee<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(owner): Extension<Owner>,
    Path((id, employee_id)): Path<(Uuid, Uuid)>,
) -> BookingResult<Json<Employee>> {
    let barbershop = owned_barbershop(&state.backend, &owner, id)?;
    Ok(Json(management::employee(
        &state.backend,
        &barbershop,
        employee_id,
    )?))
}

async fn update_employee<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(owner): Extension<Owner>,
    Path((id, employee_id)): Path<(Uuid, Uuid)>,
    Valid(Json(request)): Valid<Json<EmployeeRequest>>,
) -> BookingResult<Json<Employee>> {
    let barbershop = owned_barbershop(&state.backend, &owner, id)?;
    let employee =
        management::update_employee(&state.backend, &barbershop, employee_id, request)?;
    Ok(Json(employee))
}

async fn remove_employee<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(owner): Extension<Owner>,
    Path((id, employee_id)): Path<(Uuid, Uuid)>,
) -> BookingResult<StatusCode> {
    let barbershop = owned_barbershop(&state.backend, &owner, id)?;
    management::remove_employee(&state.backend, &barbershop, employee_id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_services<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(owner): Extension<Owner>,
    Path(id): Path<Uuid>,
    Query(query): Query<SearchQuery>,
) -> BookingResult<Json<Vec<Service>>> {
    let barbershop = owned_barbershop(&state.backend, &owner, id)?;
    let services = management::list_services(&state.backend, &barbershop, query.search.as_deref())?;
    Ok(Json(services))
}

async fn create_service<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(owner): Extension<Owner>,
    Path(id): Path<Uuid>,
    Valid(Json(request)): Valid<Json<ServiceRequest>>,
) -> Created<Service> {
    let barbershop = owned_barbershop(&state.backend, &owner, id)?;
    created(management::create_service(&state.backend, &barbershop, request)?)
}

async fn update_service<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(owner): Extension<Owner>,
    Path((id, service_id)): Path<(Uuid, Uuid)>,
    Valid(Json(request)): Valid<Json<ServiceRequest>>,
) -> BookingResult<Json<Service>> {
    let barbershop = owned_barbershop(&state.backend, &owner, id)?;
    let service = management::update_service(&state.backend, &barbershop, service_id, request)?;
    Ok(Json(service))
}

async fn remove_service<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(owner): Extension<Owner>,
    Path((id, service_id)): Path<(Uuid, Uuid)>,
) -> BookingResult<StatusCode> {
    let barbershop = owned_barbershop(&state.backend, &owner, id)?;
    management::remove_service(&state.backend, &barbershop, service_id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_working_hours<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(owner): Extension<Owner>,
    Path(id): Path<Uuid>,
) -> BookingResult<Json<Vec<WorkingHours>>> {
    let barbershop = owned_barbershop(&state.backend, &owner, id)?;
    Ok(Json(state.backend.working_hours(barbershop.id)?))
}

async fn create_working_hours<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(owner): Extension<Owner>,
    Path(id): Path<Uuid>,
    Valid(Json(request)): Valid<Json<WorkingHoursRequest>>,
) -> Created<WorkingHours> {
    let barbershop = owned_barbershop(&state.backend, &owner, id)?;
    created(management::create_working_hours(
        &state.backend,
        &barbershop,
        request,
    )?)
}

async fn update_working_hours<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(owner): Extension<Owner>,
    Path((id, working_hours_id)): Path<(Uuid, Uuid)>,
    Valid(Json(request)): Valid<Json<WorkingHoursRequest>>,
) -> BookingResult<Json<WorkingHours>> {
    let barbershop = owned_barbershop(&state.backend, &owner, id)?;
    Ok(Json(management::update_working_hours(
        &state.backend,
        &barbershop,
        working_hours_id,
        request,
    )?))
}

async fn remove_working_hours<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(owner): Extension<Owner>,
    Path((id, working_hours_id)): Path<(Uuid, Uuid)>,
) -> BookingResult<StatusCode> {
    let barbershop = owned_barbershop(&state.backend, &owner, id)?;
    management::remove_working_hours(&state.backend, &barbershop, working_hours_id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_employee_services<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(owner): Extension<Owner>,
    Path(id): Path<Uuid>,
) -> BookingResult<Json<Vec<EmployeeService>>> {
    let barbershop = owned_barbershop(&state.backend, &owner, id)?;
    Ok(Json(state.backend.employee_services(barbershop.id)?))
}

async fn assign_service<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(owner): Extension<Owner>,
    Path(id): Path<Uuid>,
    Valid(Json(request)): Valid<Json<EmployeeServiceRequest>>,
) -> Created<EmployeeService> {
    let barbershop = owned_barbershop(&state.backend, &owner, id)?;
    created(management::assign_service(&state.backend, &barbershop, request)?)
}

async fn unassign_service<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(owner): Extension<Owner>,
    Path((id, employee_service_id)): Path<(Uuid, Uuid)>,
) -> BookingResult<StatusCode> {
    let barbershop = owned_barbershop(&state.backend, &owner, id)?;
    management::unassign_service(&state.backend, &barbershop, employee_service_id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_expenses<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(owner): Extension<Owner>,
    Path(id): Path<Uuid>,
    Query(filter): Query<ExpenseFilter>,
) -> BookingResult<Json<Vec<Expense>>> {
    let barbershop = owned_barbershop(&state.backend, &owner, id)?;
    Ok(Json(management::list_expenses(
        &state.backend,
        &barbershop,
        &filter,
    )?))
}

async fn create_expense<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(owner): Extension<Owner>,
    Path(id): Path<Uuid>,
    Valid(Json(request)): Valid<Json<ExpenseRequest>>,
) -> Created<Expense> {
    let barbershop = owned_barbershop(&state.backend, &owner, id)?;
    created(management::create_expense(&state.backend, &barbershop, request)?)
}

async fn update_expense<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(owner): Extension<Owner>,
    Path((id, expense_id)): Path<(Uuid, Uuid)>,
    Valid(Json(request)): Valid<Json<ExpenseRequest>>,
) -> BookingResult<Json<Expense>> {
    let barbershop = owned_barbershop(&state.backend, &owner, id)?;
    let expense = management::update_expense(&state.backend, &barbershop, expense_id, request)?;
    Ok(Json(expense))
}

async fn remove_expense<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(owner): Extension<Owner>,
    Path((id, expense_id)): Path<(Uuid, Uuid)>,
) -> BookingResult<StatusCode> {
    let barbershop = owned_barbershop(&state.backend, &owner, id)?;
    management::remove_expense(&state.backend, &barbershop, expense_id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_inventory<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(owner): Extension<Owner>,
    Path(id): Path<Uuid>,
    Query(filter): Query<InventoryFilter>,
) -> BookingResult<Json<Vec<InventoryItem>>> {
    let barbershop = owned_barbershop(&state.backend, &owner, id)?;
    Ok(Json(management::list_inventory(
        &state.backend,
        &barbershop,
        &filter,
    )?))
}

async fn create_inventory_item<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(owner): Extension<Owner>,
    Path(id): Path<Uuid>,
    Valid(Json(request)): Valid<Json<InventoryRequest>>,
) -> Created<InventoryItem> {
    let barbershop = owned_barbershop(&state.backend, &owner, id)?;
    let today = state.clock.now().date();
    created(management::create_inventory_item(
        &state.backend,
        &barbershop,
        request,
        today,
    )?)
}

async fn update_inventory_item<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(owner): Extension<Owner>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
    Valid(Json(request)): Valid<Json<InventoryRequest>>,
) -> BookingResult<Json<InventoryItem>> {
    let barbershop = owned_barbershop(&state.backend, &owner, id)?;
    let today = state.clock.now().date();
    Ok(Json(management::update_inventory_item(
        &state.backend,
        &barbershop,
        item_id,
        request,
        today,
    )?))
}

async fn remove_inventory_item<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(owner): Extension<Owner>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> BookingResult<StatusCode> {
    let barbershop = owned_barbershop(&state.backend, &owner, id)?;
    management::remove_inventory_item(&state.backend, &barbershop, item_id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_appointments<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(owner): Extension<Owner>,
    Path(id): Path<Uuid>,
    Query(filter): Query<AppointmentFilter>,
) -> BookingResult<Json<Vec<AppointmentDetails>>> {
    let barbershop = owned_barbershop(&state.backend, &owner, id)?;
    Ok(Json(management::list_appointments(
        &state.backend,
        &barbershop,
        &filter,
    )?))
}

async fn set_appointment_status<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(owner): Extension<Owner>,
    Path((id, appointment_id)): Path<(Uuid, Uuid)>,
    Valid(Json(request)): Valid<Json<AppointmentStatusRequest>>,
) -> BookingResult<Json<Appointment>> {
    let barbershop = owned_barbershop(&state.backend, &owner, id)?;
    Ok(Json(change_appointment_status(
        &state.backend,
        &barbershop,
        appointment_id,
        request.status,
    )?))
}

/// Server-sent `appointment` events for every booking or status change of the barbershop.
async fn appointment_stream<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(owner): Extension<Owner>,
    Path(id): Path<Uuid>,
) -> BookingResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let barbershop_id = owned_barbershop(&state.backend, &owner, id)?.id;

    let events = state
        .backend
        .appointment_events()
        .filter_map(move |event| {
            let event = match event {
                Ok(appointment) if appointment.barbershop_id == barbershop_id => Event::default()
                    .event("appointment")
                    .json_data(&appointment)
                    .ok(),
                Ok(_) => None,
                Err(err) => {
                    warn!(?err, "Appointment stream lagged behind");
                    None
                }
            };
            future::ready(event.map(Ok))
        });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

async fn list_clients<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(owner): Extension<Owner>,
    Path(id): Path<Uuid>,
    Query(query): Query<SearchQuery>,
) -> BookingResult<Json<Vec<Client>>> {
    let barbershop = owned_barbershop(&state.backend, &owner, id)?;
    let clients = management::list_clients(&state.backend, &barbershop, query.search.as_deref())?;
    Ok(Json(clients))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::http::OWNER_TOKEN_HEADER;
    use crate::local_store::LocalStore;
    use crate::testutils::{seed_owner, seed_shop_with_staff, spawn_app, ShopFixture, PUBLIC_URL};
    use crate::types::AppointmentStatus;
    use reqwest::{Client as HttpClient, RequestBuilder};
    use serde_json::{json, Value};
    use std::time::Duration;
    use tokio::{task::JoinHandle, time::timeout};

    const NOW: &str = "2030-01-07 12:00";

    struct Session {
        server: JoinHandle<()>,
        url: String,
        token: String,
        http: HttpClient,
    }

    impl Session {
        fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
            self.http
                .request(method, format!("{}/management/barbershops{path}", self.url))
                .header(OWNER_TOKEN_HEADER, &self.token)
        }
    }

    async fn init() -> (Session, LocalStore, ShopFixture) {
        let store = LocalStore::default();
        let fixture = seed_shop_with_staff(&store);
        let (server, url) = spawn_app(store.clone(), NOW).await;
        let session = Session {
            server,
            url,
            token: fixture.owner.token.clone(),
            http: HttpClient::new(),
        };
        (session, store, fixture)
    }

    #[tokio::test]
    async fn test_create_and_update_barbershop() {
        let (session, _, _) = init().await;
        let body = json!({
            "name": "North Cuts",
            "address": "2 Side St",
            "phone": "+5511999990000",
            "email": "second@cuts.test",
        });

        let response = session
            .request(reqwest::Method::POST, "")
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED.as_u16());
        let barbershop: Barbershop = response.json().await.unwrap();
        assert_eq!(barbershop.slug, "north-cuts-2");
        assert!(barbershop.is_open);

        let link: BookingLink = session
            .request(reqwest::Method::GET, &format!("/{}/booking-link", barbershop.id))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(link.url, format!("{PUBLIC_URL}/booking/north-cuts-2"));

        let mut update = body.clone();
        update["name"] = json!("East Cuts");
        update["is_open"] = json!(false);
        let updated: Barbershop = session
            .request(reqwest::Method::PUT, &format!("/{}", barbershop.id))
            .json(&update)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(updated.name, "East Cuts");
        assert_eq!(updated.slug, "north-cuts-2");
        assert!(!updated.is_open);

        let mut invalid = body.clone();
        invalid["email"] = json!("nope");
        let response = session
            .request(reqwest::Method::POST, "")
            .json(&invalid)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST.as_u16());

        let shops: Vec<Barbershop> = session
            .request(reqwest::Method::GET, "")
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(shops.len(), 2);

        session.server.abort();
    }

    #[tokio::test]
    async fn test_foreign_barbershop_is_not_found() {
        let (session, store, fixture) = init().await;
        let intruder = seed_owner(&store);

        let response = session
            .http
            .get(format!(
                "{}/management/barbershops/{}/dashboard",
                session.url, fixture.barbershop.id
            ))
            .header(OWNER_TOKEN_HEADER, intruder.token)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND.as_u16());

        let response = session
            .request(
                reqwest::Method::GET,
                &format!("/{}/dashboard", fixture.barbershop.id),
            )
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK.as_u16());
        let summary: Value = response.json().await.unwrap();
        assert_eq!(summary["total_employees"], json!(1));
        assert_eq!(summary["total_clients"], json!(1));

        session.server.abort();
    }

    #[tokio::test]
    async fn test_employee_and_service_crud() {
        let (session, store, fixture) = init().await;
        let shop = format!("/{}", fixture.barbershop.id);

        let response = session
            .request(reqwest::Method::POST, &format!("{shop}/employees"))
            .json(&json!({
                "name": "Jane",
                "phone": "+5511988887777",
                "role": "hairdresser",
                "hire_date": "2029-05-01",
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED.as_u16());
        let jane: Employee = response.json().await.unwrap();
        assert!(jane.is_active);

        let found: Vec<Employee> = session
            .request(reqwest::Method::GET, &format!("{shop}/employees?search=jan"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(found, vec![jane.clone()]);

        let shown: Employee = session
            .request(reqwest::Method::GET, &format!("{shop}/employees/{}", jane.id))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(shown, jane);

        let response = session
            .request(
                reqwest::Method::GET,
                &format!("{shop}/employees/{}", Uuid::new_v4()),
            )
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND.as_u16());

        let response = session
            .request(reqwest::Method::POST, &format!("{shop}/services"))
            .json(&json!({
                "name": "Coloring",
                "price_cents": 8000,
                "duration_minutes": 3,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST.as_u16());

        let coloring: Service = session
            .request(reqwest::Method::POST, &format!("{shop}/services"))
            .json(&json!({
                "name": "Coloring",
                "price_cents": 8000,
                "duration_minutes": 90,
            }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        let response = session
            .request(reqwest::Method::POST, &format!("{shop}/employee-services"))
            .json(&json!({ "employee_id": jane.id, "service_id": coloring.id }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED.as_u16());

        let response = session
            .request(reqwest::Method::DELETE, &format!("{shop}/employees/{}", jane.id))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT.as_u16());
        assert_eq!(store.employee_services(fixture.barbershop.id).unwrap().len(), 1);

        let response = session
            .request(reqwest::Method::DELETE, &format!("{shop}/employees/{}", jane.id))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND.as_u16());

        session.server.abort();
    }

    #[tokio::test]
    async fn test_expense_and_inventory_filters() {
        let (session, _, fixture) = init().await;
        let shop = format!("/{}", fixture.barbershop.id);

        for (date, expense_type) in [("2030-01-02", "rent"), ("2030-01-05", "supplies")] {
            let response = session
                .request(reqwest::Method::POST, &format!("{shop}/expenses"))
                .json(&json!({
                    "description": "Monthly",
                    "amount_cents": 1000,
                    "date": date,
                    "expense_type": expense_type,
                }))
                .send()
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED.as_u16());
        }
        let expenses: Vec<Expense> = session
            .request(
                reqwest::Method::GET,
                &format!("{shop}/expenses?start_date=2030-01-03&expense_type=supplies"),
            )
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(expenses.len(), 1);

        let item: InventoryItem = session
            .request(reqwest::Method::POST, &format!("{shop}/inventory"))
            .json(&json!({
                "name": "Pomade",
                "quantity": 1,
                "reorder_level": 3,
                "unit_price_cents": 1500,
            }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(item.last_restocked.to_string(), "2030-01-07");

        let low: Vec<InventoryItem> = session
            .request(
                reqwest::Method::GET,
                &format!("{shop}/inventory?low_stock=true"),
            )
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(low, vec![item]);

        session.server.abort();
    }

    #[tokio::test]
    async fn test_appointment_status_and_stream() {
        let (session, store, fixture) = init().await;
        let shop = format!("/{}", fixture.barbershop.id);

        let response = session
            .request(reqwest::Method::GET, &format!("{shop}/appointments/stream"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK.as_u16());
        let mut events = response.bytes_stream();

        let appointment = crate::testutils::new_appointment(
            &fixture.barbershop,
            &fixture.client,
            &fixture.employee,
            &fixture.service,
            chrono::NaiveDate::from_ymd_opt(2030, 1, 8).unwrap(),
            crate::testutils::time("10:00"),
        );
        store.add_appointment(appointment.clone()).unwrap();

        let chunk = timeout(Duration::from_secs(1), events.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        let chunk = String::from_utf8(chunk.to_vec()).unwrap();
        assert!(chunk.contains("event: appointment"));
        assert!(chunk.contains(&appointment.id.to_string()));

        let response = session
            .request(
                reqwest::Method::PUT,
                &format!("{shop}/appointments/{}/status", appointment.id),
            )
            .json(&json!({ "status": "cancelled" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK.as_u16());

        let response = session
            .request(
                reqwest::Method::PUT,
                &format!("{shop}/appointments/{}/status", appointment.id),
            )
            .json(&json!({ "status": "completed" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT.as_u16());

        let listed: Vec<AppointmentDetails> = session
            .request(
                reqwest::Method::GET,
                &format!("{shop}/appointments?status=cancelled"),
            )
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].appointment.status, AppointmentStatus::Cancelled);
        assert_eq!(listed[0].client_name, fixture.client.name);

        let clients: Vec<Client> = session
            .request(reqwest::Method::GET, &format!("{shop}/clients"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(clients, vec![fixture.client.clone()]);

        session.server.abort();
    }
}
