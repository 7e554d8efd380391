pub mod api_client;
pub mod config;
pub mod models;
pub mod services;
pub mod ui;
