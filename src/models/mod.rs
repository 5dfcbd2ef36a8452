pub mod app_state;
pub mod settings;
pub mod user;
pub mod views;
