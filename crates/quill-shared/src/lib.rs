//! # Quill Shared
//!
//! Wire types of the Quill REST API.
//! Kept free of server dependencies so clients can reuse them.

pub mod dto;
pub mod response;

pub use response::{ErrorResponse, FieldProblem};
