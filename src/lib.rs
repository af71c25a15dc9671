#![doc = "The `taskdeck` library crate."]
#![doc = ""]
#![doc = "This crate contains the domain models, the authentication and authorization"]
#![doc = "core (password hashing, token issuance/verification, identity resolution,"]
#![doc = "role gating), the HTTP routing configuration, and error handling for the"]
#![doc = "TaskDeck application. It is used by the main binary (`main.rs`) to construct"]
#![doc = "and run the application."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;

pub use crate::config::Config;
pub use crate::error::AppError;
