use std::{sync::Arc, time::Duration};

use crate::{
    clock::{Clock, SystemClock},
    configuration::Configuration,
    configuration_handler::ConfigurationHandler,
    database_interface::DatabaseInterface,
    http::create_app,
    local_store::LocalStore,
};
use tokio::time::sleep;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod availability;
mod backend;
mod booking;
mod clock;
mod configuration;
mod configuration_handler;
mod dashboard;
mod database_interface;
mod error;
mod http;
mod local_store;
mod management;
mod requests;
mod schema;
mod seed;
mod slug;
#[cfg(test)]
mod testutils;
mod types;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("#######################");
    println!("# Barbershop Manager  #");
    println!("#######################");

    let configuration = ConfigurationHandler::parse_arguments();
    let clock = Arc::new(SystemClock);

    let address = format!("0.0.0.0:{}", configuration.port());
    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(?err, "Failed to bind {address}");
            return;
        }
    };
    println!("Accessible at:\n{address}");

    let app = if let Some(database_url) = configuration.database_url() {
        if configuration.seed_demo() {
            warn!("Demo seeding is only available with the in-memory backend");
        }
        let backend = loop {
            match DatabaseInterface::new(&database_url) {
                Ok(backend) => {
                    info!("Successfully connected to database");
                    break backend;
                }
                Err(err) => {
                    error!(?err, "Failed to establish database connection. Retry in 1 sec. You may want to restart without a database URL (in-memory data).");
                    sleep(Duration::from_secs(1)).await;
                }
            }
        };
        create_app(backend, configuration, clock)
    } else {
        info!("No database configured, data is kept in memory");
        let backend = LocalStore::default();
        if configuration.seed_demo() {
            match seed::seed_demo(&backend, clock.now().date()) {
                Ok((owner, barbershop)) => {
                    println!("Demo barbershop:\n/booking/{}", barbershop.slug);
                    println!("Demo owner token:\n{}", owner.token);
                }
                Err(err) => error!(%err, "Failed to seed demo data"),
            }
        }
        create_app(backend, configuration, clock)
    };

    if let Err(err) = axum::serve(listener, app).await {
        error!(?err, "Server stopped");
    }
}
