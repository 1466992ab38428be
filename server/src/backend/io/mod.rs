//! # IO Module
//!
//! Adapter layer between HTTP clients and the domain services. Requests are
//! decoded into `shared` DTOs, mapped to domain commands, and the results are
//! mapped back. Errors are translated to status codes in one place
//! ([`rest::error`]).

pub mod rest;
