use crate::backend::BarbershopBackend;
use crate::clock::Clock;
use crate::configuration::Configuration;
use crate::error::{BookingError, BookingResult};
use crate::management;
use crate::requests::RegisterOwnerRequest;
use crate::types::Owner;
use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{http::StatusCode, routing::post, Json, Router};
use axum_valid::Valid;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

mod booking_routes;
mod management_routes;

pub const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";
pub const OWNER_TOKEN_HEADER: &str = "x-owner-token";

#[derive(Clone)]
pub struct AppState<B: BarbershopBackend, C: Configuration> {
    pub backend: B,
    pub configuration: C,
    pub clock: Arc<dyn Clock>,
}

pub fn create_app<B: BarbershopBackend, C: Configuration>(
    backend: B,
    configuration: C,
    clock: Arc<dyn Clock>,
) -> Router {
    let state = AppState {
        backend,
        configuration,
        clock,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let owners = Router::new()
        .route("/owners", post(register_owner))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth::<B, C>,
        ));

    let management = management_routes::router().route_layer(middleware::from_fn_with_state(
        state.clone(),
        owner_auth::<B, C>,
    ));

    Router::new()
        .merge(booking_routes::router())
        .merge(management)
        .merge(owners)
        .with_state(state)
        .layer(cors)
}

fn header<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
    request
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
}

async fn admin_auth<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    request: Request,
    next: Next,
) -> Result<Response, BookingError> {
    let password = header(&request, ADMIN_PASSWORD_HEADER).map(str::to_owned);
    match password {
        Some(password) if password == state.configuration.admin_password() => {
            Ok(next.run(request).await)
        }
        Some(_) => Err(BookingError::Unauthorized("Wrong admin password".into())),
        None => Err(BookingError::Unauthorized("Missing credentials".into())),
    }
}

/// Resolves the owner token and hands the [`Owner`] to the handlers as an extension.
async fn owner_auth<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    mut request: Request,
    next: Next,
) -> Result<Response, BookingError> {
    let token = header(&request, OWNER_TOKEN_HEADER)
        .ok_or_else(|| BookingError::Unauthorized("Missing credentials".into()))?;
    let owner: Owner = state
        .backend
        .owner_by_token(token)?
        .ok_or_else(|| BookingError::Unauthorized("Unknown owner token".into()))?;

    request.extensions_mut().insert(owner);
    Ok(next.run(request).await)
}

async fn register_owner<B: BarbershopBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Valid(Json(request)): Valid<Json<RegisterOwnerRequest>>,
) -> BookingResult<(StatusCode, Json<Owner>)> {
    let owner = management::register_owner(&state.backend, request.username)?;
    Ok((StatusCode::CREATED, Json(owner)))
}
