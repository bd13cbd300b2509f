pub mod connection;
pub mod models;
pub mod service;
pub mod store;

pub use connection::{DbPool, get_connection};
pub use models::*;
pub use store::{DuckDbStore, ProfileStore, StoreError};
