pub mod db;
pub mod models;
pub mod queries;
pub mod record;
pub mod schema;
pub mod time_serde;
pub mod value;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
