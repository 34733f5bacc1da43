pub mod app;
pub mod config;
pub mod services;

pub use app::{App, Session};
pub use config::{load, AppConfig};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
