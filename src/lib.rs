pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod context;
pub mod controllers;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod schema;
pub mod state;
pub mod types;

pub use routes::app;
pub use state::AppState;
