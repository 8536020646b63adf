//! Conversion engine.
//!
//! This module contains the pure converters between the declarative Guard
//! Profile and its graph form, plus the lenient decoder used at the boundary.

pub mod decode;
pub mod forward;
pub mod reverse;

pub use decode::{
    decode_profile, decode_profile_file, decode_profile_str, DecodeIssue, DecodedProfile,
};
pub use forward::{forward_convert, forward_convert_with_layout};
pub use reverse::reverse_convert;
