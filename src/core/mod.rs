pub mod clock;
pub mod config;
pub mod error;
pub mod types;

pub use clock::{now_millis, Clock};
pub use config::GameConfig;
pub use error::{ActionError, ConfigError, FireError, PersistenceError, Resource, Result};
