//! Seedgen library: renders a bulk auth-user SQL migration from a JSON
//! user manifest.
//!
//! The binary in `src/main.rs` is a thin clap front-end over
//! [`generator::generate`]; everything testable lives here.

pub mod config;
pub mod error;
pub mod generator;
pub mod manifest;
pub mod roles;
