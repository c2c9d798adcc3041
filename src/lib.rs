//! Privatize: prefix private TypeScript class members.
//!
//! A compile-time transform that renames every class field and method marked
//! `private` (and, when configured, every member tagged `@internal`) by
//! prepending a prefix, together with every property access the checker
//! resolves to one of them.
//!
//! The pieces:
//! - [`program::Program`] parses a set of files over one shared source map
//! - [`checker::Checker`] resolves property accesses to member declarations
//!   through lexical scopes
//! - [`transform::privatize_transformer`] builds the per-file rename transform
//! - [`cli`] wires them together for the `privatize` binary

// Core infrastructure - re-exported from privatize-core
pub use privatize_core::config;
pub use privatize_core::error;
pub use privatize_core::output;

pub mod checker;
pub mod program;
pub mod resolver;
pub mod transform;

// Front door
pub mod cli;

// Error bridges - converts syntax-tree errors to PrivatizeError
mod error_bridges;

pub use checker::Checker;
pub use program::Program;
pub use resolver::{Access, Declaration, DeclarationKind, Symbol, SymbolResolver};
pub use transform::{privatize_transformer, TransformationContext};
