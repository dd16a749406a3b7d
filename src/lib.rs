#![doc = "The `lazytodo` library crate."]
#![doc = ""]
#![doc = "Domain models, persistence, authentication, the ownership gate, business services"]
#![doc = "and routing for the lazy todo backend. The binary (`main.rs`) builds an `AppState`"]
#![doc = "from the environment and serves `routes::config` under `/api`."]

pub mod access;
pub mod auth;
pub mod config;
pub mod error;
pub mod mail;
pub mod models;
pub mod motivation;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

pub use crate::error::AppError;
pub use crate::state::AppState;
