pub mod jwt;
pub mod links;
pub mod password;
pub mod tags;
