pub mod manager;
pub mod request;
