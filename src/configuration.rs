use chrono::Duration;

pub trait Configuration: Clone + Send + Sync + 'static {
    fn admin_password(&self) -> String;
    fn public_url(&self) -> String;
    fn database_url(&self) -> Option<String>;
    fn port(&self) -> String;
    fn slot_interval(&self) -> Duration;
    fn seed_demo(&self) -> bool;
}
