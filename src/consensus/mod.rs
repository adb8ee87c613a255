//! Chain integrity rules

pub mod validation;

pub use validation::{ChainIntegrityViolation, ChainValidator, ViolationKind};
