//! Core types and utilities for the Vela language compiler.
//!
//! This crate provides the source span model and the error type shared by
//! every compiler stage.

pub mod error;
pub mod span;

pub use error::{Error, Result};
pub use span::{Location, Span};
