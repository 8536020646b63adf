//! Core domain types.
//!
//! Config model, graph model, errors and constants shared by the converters
//! and the editor coordinator. Nothing in here performs I/O.

pub mod constants;
pub mod errors;
pub mod graph;
pub mod models;
