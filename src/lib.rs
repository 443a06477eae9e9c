//! # mavis
//!
//! Command interpretation core for a chat bot.
//!
//! **Key features:**
//! - **Typed arguments** - `ArgType<T>` validates raw text against a pattern and
//!   coerces it asynchronously, with defaults, variable widths and alternatives
//! - **Command tree** - nested subcommands resolved case-insensitively, per-node
//!   admin/moderator gates, tokens split across argument slots before parsing
//! - **Typed handlers** - handlers receive a tuple of parsed values
//! - **Platform-agnostic** - directory lookups and replies go through traits
//!
//! The library provides a `#[derive(Choice)]` macro for keyword enums.
//!
//! ## Optional Features
//!
//! - `console` - `mavis-console` binary reading commands from stdin

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![allow(clippy::result_large_err)]

// Lets the derive macro's `::mavis::...` paths resolve inside this crate.
extern crate self as mavis;

// Re-export derive macro
pub use mavis_macros::Choice;

// ============================================================================
// Module Declarations
// ============================================================================

// Platform boundary
pub mod context;
pub mod directory;
pub mod notice;
pub mod platform;
pub mod reply;

// Configuration and errors
pub mod config;
pub mod error;

// Argument engine
pub mod args;

// Command tree and dispatch
pub mod bot;
pub mod builtin;
pub mod tree;

#[cfg(test)]
mod testing;

// ============================================================================
// Re-exports - Public API
// ============================================================================

// Arguments
pub use args::{ArgList, ArgType};

// Tree types
pub use tree::{CommandDef, CommandNode, CommandTree, NodeId};

// Entry point
pub use bot::{Bot, tokenize};

// Request context
pub use context::Context;
pub use directory::{Directory, StaticDirectory};
pub use notice::Notice;
pub use platform::{Channel, Guild, Id, Member, Message, Permissions, Role, User};
pub use reply::ReplyChannel;

// Configuration
pub use config::BotConfig;

// Error types
pub use error::{CommandError, RegistrationError, UserError};

// ============================================================================
// Library Metadata
// ============================================================================

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
