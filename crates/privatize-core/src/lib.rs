//! Core infrastructure for privatize.
//!
//! This crate provides the parts of the tool that do not depend on the
//! syntax tree:
//! - Error types and error codes
//! - Transformer configuration and its layered resolution
//! - JSON output types for CLI responses

pub mod config;
pub mod error;
pub mod output;
