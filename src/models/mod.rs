//! Core data models for extension conversion

pub mod manifest;
pub mod job;

pub use manifest::*;
pub use job::*;
