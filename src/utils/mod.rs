//! Utility functions and helpers.
//!
//! This module contains profile fingerprinting and structural graph validation.

pub mod fingerprint;
pub mod graph_validator;
