//! Vestry Utils - Shared helpers for Vestry services

pub mod config;

pub use config::{env_flag, env_or, load_env};
