pub mod auth;
pub mod settings;
pub mod uploads;
pub mod views;
