#![forbid(unsafe_code)]

pub mod auth;
pub mod error;
pub mod model;
pub mod results;
pub mod time;
pub mod verification;
pub mod wizard;

pub use error::Error;
pub use time::Clock;
