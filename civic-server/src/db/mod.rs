pub mod schema;
pub mod connection;
pub mod repositories;

pub use connection::{Database, DbPool};
