//! Configuration for crawlgate
//!
//! This crate turns environment variables (optionally seeded from a `.env`
//! file) into a [`GatewayConfig`], and a config into one worker profile per
//! [`Workload`].

mod config;
mod loader;

pub use config::{GatewayConfig, Workload};
pub use loader::ConfigLoader;
