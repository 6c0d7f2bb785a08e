//! Harsift library crate.
//!
//! Filters the entries of a HAR archive with a boolean expression tree plus
//! quick, tag and domain exclusions, and reshapes the survivors into a
//! trimmed archive or a compact text rendering.
//!
//! The stable, supported API surface is exposed via [`crate::api`] and
//! [`crate::prelude`]. Other modules back the CLI and may change more
//! frequently.

pub mod api;
pub mod prelude;

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod har;
pub mod store;
