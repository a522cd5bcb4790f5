//! Request/response wire types.
//!
//! The JSON contract uses camelCase field names and UPPERCASE enum values
//! throughout; the serde attributes here and on the core types enforce that.

pub mod assets;
pub mod common;
pub mod tasks;
