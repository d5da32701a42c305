pub mod errors;
pub mod locks;
pub mod models;
pub mod ports;
pub mod service;
