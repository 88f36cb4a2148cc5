#![forbid(unsafe_code)]

pub mod access;
pub mod common;
pub mod policy;

pub use common::{ContractViolation, ReasonCodeId, SchemaVersion, Validate};
