//! Família Fin server: household expense tracking over a JSON REST API.

pub mod backend;
pub mod config;
