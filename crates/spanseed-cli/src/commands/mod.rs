//! Command implementations

pub mod common;
pub mod seed;
pub mod validate;
