pub mod config;
pub mod error;
pub mod notion;
pub mod recipes;
pub mod server;
