//! Binary-only glue: configuration loading and the `tracing`-backed
//! `Topics` sink. Everything else lives in the `ess-*` library crates this
//! binary wires together.

pub mod config;
pub mod topics;
