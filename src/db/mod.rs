pub mod connection;
pub mod lots;
