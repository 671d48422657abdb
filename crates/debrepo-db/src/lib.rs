pub mod connection;
pub mod error;
pub mod migration;
pub mod models;
pub mod schema;
pub mod store;

pub use connection::DbConnection;
pub use error::{DbError, Result};
