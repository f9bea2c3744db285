use crate::configuration::Configuration;
use chrono::Duration;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "barbershop_manager", about = "Barbershop booking and back-office service")]
pub struct ConfigurationHandler {
    /// Password required to register new barbershop owners
    #[arg(long, env = "ADMIN_PASSWORD", default_value = "123")]
    admin_password: String,

    /// Base URL clients use to reach the booking pages
    #[arg(long, env = "PUBLIC_URL", default_value = "http://localhost:3000")]
    public_url: String,

    /// PostgreSQL connection URL. Without it, data is kept in memory only
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[arg(short, long, env = "PORT", default_value = "3000")]
    port: String,

    /// Distance between two offered appointment slots
    #[arg(long, env = "SLOT_INTERVAL_MINUTES", default_value_t = 30, value_parser = clap::value_parser!(i64).range(5..=240))]
    slot_interval_minutes: i64,

    /// Insert an example barbershop on startup (in-memory backend only)
    #[arg(long, env = "SEED_DEMO")]
    seed_demo: bool,
}

impl ConfigurationHandler {
    pub fn parse_arguments() -> Self {
        if let Err(err) = dotenvy::dotenv() {
            tracing::debug!(%err, "No .env file loaded");
        }
        Self::parse()
    }
}

impl Configuration for ConfigurationHandler {
    fn admin_password(&self) -> String {
        self.admin_password.clone()
    }

    fn public_url(&self) -> String {
        self.public_url.trim_end_matches('/').to_string()
    }

    fn database_url(&self) -> Option<String> {
        self.database_url.clone().filter(|url| !url.is_empty())
    }

    fn port(&self) -> String {
        self.port.clone()
    }

    fn slot_interval(&self) -> Duration {
        Duration::minutes(self.slot_interval_minutes)
    }

    fn seed_demo(&self) -> bool {
        self.seed_demo
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let configuration = ConfigurationHandler::parse_from(["barbershop_manager"]);
        assert_eq!(configuration.port(), "3000");
        assert_eq!(configuration.slot_interval(), Duration::minutes(30));
        assert!(!configuration.seed_demo());
    }

    #[test]
    fn test_arguments() {
        let configuration = ConfigurationHandler::parse_from([
            "barbershop_manager",
            "--port",
            "8080",
            "--public-url",
            "https://cuts.example.com/",
            "--database-url",
            "postgres://localhost/barbershop",
            "--slot-interval-minutes",
            "15",
            "--seed-demo",
        ]);
        assert_eq!(configuration.port(), "8080");
        assert_eq!(configuration.public_url(), "https://cuts.example.com");
        assert_eq!(
            configuration.database_url().as_deref(),
            Some("postgres://localhost/barbershop")
        );
        assert_eq!(configuration.slot_interval(), Duration::minutes(15));
        assert!(configuration.seed_demo());
    }

    #[test]
    fn test_rejects_tiny_slot_interval() {
        ConfigurationHandler::try_parse_from(["barbershop_manager", "--slot-interval-minutes", "1"])
            .unwrap_err();
    }
}
