pub mod handler;
pub mod manager;
