pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod ids;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
