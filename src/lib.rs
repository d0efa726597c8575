//! Workforce Tour — onboarding tour engine.

pub mod config;
pub mod context;
pub mod error;
pub mod routes;
pub mod status;
pub mod storage;
pub mod tour;
