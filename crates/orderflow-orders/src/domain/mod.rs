//! Wire schema, commands and normalization rules.

pub mod commands;
pub mod message;
pub mod normalizer;
