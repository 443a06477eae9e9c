//! Error types for command interpretation.
//!
//! Two kinds of failure flow through dispatch:
//! - [`UserError`]: expected, message-worthy failures (bad argument form,
//!   permission denied, lookup not found). Rendered to the caller as an error notice.
//! - Everything else in [`CommandError`]: unexpected failures, logged with full
//!   detail and shown to the caller in degraded form (`kind: message`).

use std::fmt;

use thiserror::Error;

use crate::platform::EntityKind;

/// Expected failure caused by what the caller typed or who the caller is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserError {
    /// Required argument received no tokens
    #[error("the required argument <{name}> is missing")]
    MissingArgument {
        /// Argument name
        name: String,
    },

    /// Raw text does not match the argument's pattern
    #[error("the argument {name} is not of the right form")]
    WrongForm {
        /// Argument name
        name: String,
    },

    /// Coercion failure with a specific message
    #[error("{0}")]
    Invalid(String),

    /// Numeric value outside `[from, to)`
    #[error("the value of {name} must be between {from} and {to}")]
    OutOfBounds {
        /// Argument name
        name: String,
        /// Inclusive lower bound
        from: String,
        /// Exclusive upper bound
        to: String,
    },

    /// Numeric magnitude over the absolute bound
    #[error("numbers are limited to {bound} in magnitude")]
    TooLarge {
        /// Rendered bound
        bound: String,
    },

    /// Value is not a member of the declared set
    #[error("the argument {name} must be one of: {choices}")]
    NotInChoices {
        /// Argument name
        name: String,
        /// Comma separated members
        choices: String,
    },

    /// Directory lookup found nothing
    #[error("the {kind} given as {name} does not exist")]
    NotFound {
        /// Entity kind looked up
        kind: EntityKind,
        /// Argument name
        name: String,
    },

    /// Fuzzy lookup matched several entities
    #[error("the {kind} search for \"{query}\" is not precise enough ({count} matches)")]
    Ambiguous {
        /// Entity kind looked up
        kind: EntityKind,
        /// Query text
        query: String,
        /// Number of matches
        count: usize,
    },

    /// Every alternative of an argument failed
    #[error("none of the possibilities for the argument worked{}", DisplayFailures(.0))]
    NoAlternative(Vec<UserError>),

    /// Tokens left over after every argument was satisfied
    #[error("too many arguments were given (at most {expected} expected){}", subcommand_hint(.has_subcommands))]
    TooManyArguments {
        /// Number of declared arguments
        expected: usize,
        /// Whether the resolved command has subcommands
        has_subcommands: bool,
    },

    /// Command refuses to run without arguments
    #[error("this command cannot be called without arguments")]
    ArgumentsRequired,

    /// Path given to help (or similar) names no command
    #[error("the command {0} does not exist")]
    UnknownCommand(String),

    /// Caller lacks the administrator capability
    #[error("only an administrator can use this command")]
    AdminOnly,

    /// Caller fails the moderation predicate
    #[error("you do not have permission to do this")]
    ModeratorOnly,

    /// Command needs a guild but the message came from a direct conversation
    #[error("this can only be used in a server")]
    NotInGuild,
}

fn subcommand_hint(has_subcommands: &bool) -> &'static str {
    if *has_subcommands {
        ", or this subcommand does not exist"
    } else {
        ""
    }
}

struct DisplayFailures<'a>(&'a Vec<UserError>);

impl fmt::Display for DisplayFailures<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for failure in self.0.iter() {
            write!(f, "\n- {}", failure)?;
        }
        Ok(())
    }
}

/// Failure of the directory lookup collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// No entity with this id
    #[error("{kind} {id} not found")]
    NotFound {
        /// Entity kind looked up
        kind: EntityKind,
        /// Requested id
        id: u64,
    },

    /// Lookup service could not answer
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

/// Failure of the reply channel collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not deliver reply: {0}")]
pub struct ReplyError(pub String);

/// Anything a command invocation can fail with.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Expected failure, shown as an error notice
    #[error(transparent)]
    User(#[from] UserError),

    /// Reply channel failure
    #[error(transparent)]
    Reply(#[from] ReplyError),

    /// Any other failure raised by a handler
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CommandError {
    /// Shorthand for a user error carrying a free-form message.
    pub fn user(message: impl Into<String>) -> Self {
        CommandError::User(UserError::Invalid(message.into()))
    }

    /// Label shown to the caller in front of a non-user error.
    pub fn kind(&self) -> &'static str {
        match self {
            CommandError::User(_) => "UserError",
            CommandError::Reply(_) => "ReplyError",
            CommandError::Internal(_) => "InternalError",
        }
    }

    /// Check whether this error is expected and message-worthy.
    pub fn is_user(&self) -> bool {
        matches!(self, CommandError::User(_))
    }
}

/// Command tree construction failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// Two siblings share a name (case-insensitive)
    #[error("duplicate subcommand {name} under {parent}")]
    DuplicateSibling {
        /// Full name of the parent node
        parent: String,
        /// Offending name
        name: String,
    },

    /// Command registered with an empty name
    #[error("command names cannot be empty (under {parent})")]
    EmptyName {
        /// Full name of the parent node
        parent: String,
    },

    /// Command name contains whitespace and could never be typed as one token
    #[error("command name {0:?} contains whitespace")]
    InvalidName(String),
}

/// Configuration loading failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("could not read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid TOML for [`BotConfig`](crate::config::BotConfig)
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Prefix would match every message
    #[error("the command prefix cannot be empty")]
    EmptyPrefix,
}
