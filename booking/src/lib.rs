pub mod admin;
pub mod config;
pub mod engine;
pub mod error;
