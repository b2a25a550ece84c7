//! Command implementations.

pub mod analyze;
pub mod config;
pub mod extract;
pub mod schema;

pub use self::analyze::execute_analyze;
pub use self::config::execute_config;
pub use self::extract::execute_extract;
pub use self::schema::execute_schema;
