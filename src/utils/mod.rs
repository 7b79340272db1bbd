pub mod auth;
pub mod timezone;

pub use auth::AuthService;
pub use timezone::{local_midnight, parse_timezone};
