//! calculator-service - arithmetic operations over HTTP with structured request logging

pub mod config;
pub mod error;
pub mod types;

pub mod calc;
pub mod logging;
pub mod api;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
