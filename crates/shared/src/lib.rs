//! Lockgate Shared Types and Utilities
//!
//! This crate contains types, errors, and utilities shared across the lockgate workspace.

pub mod db;
pub mod error;
pub mod types;

pub use db::*;
pub use error::*;
pub use types::*;
