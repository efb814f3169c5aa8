//! # Quill Core
//!
//! The domain layer of the Quill blog backend.
//! This crate contains the authorization and attribution rules with zero
//! infrastructure dependencies; storage and identity come in through ports.

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use error::DomainError;
