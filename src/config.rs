//! Bot configuration.
//!
//! `BotConfig` carries the command prefix and the moderation allow-lists.
//! It is loaded from TOML once at startup and shared read-only afterwards.

use std::path::Path;

use serde::Deserialize;

use crate::platform::{Guild, Id, Member, Permissions};
use crate::error::ConfigError;

/// Prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = "+";

/// Absolute bound on integer arguments (default: 10^18).
pub const DEFAULT_INTEGER_BOUND: i64 = 1_000_000_000_000_000_000;

/// Bot configuration.
///
/// ```toml
/// prefix = "+"
/// moderator_roles = [123]
/// moderator_users = [456]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BotConfig {
    /// Text a message must start with to be treated as a command
    pub prefix: String,

    /// Roles whose members count as moderators
    pub moderator_roles: Vec<Id>,

    /// Users who count as moderators
    pub moderator_users: Vec<Id>,

    /// Absolute bound for [`ArgType::integer`](crate::args::ArgType::integer)
    pub integer_bound: i64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            moderator_roles: Vec::new(),
            moderator_users: Vec::new(),
            integer_bound: DEFAULT_INTEGER_BOUND,
        }
    }
}

impl BotConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: BotConfig = toml::from_str(text)?;
        config.validate()
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Builder method to replace the prefix. An empty prefix is ignored.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        if !prefix.is_empty() {
            self.prefix = prefix;
        }
        self
    }

    /// Builder method to add a moderator role.
    pub fn with_moderator_role(mut self, role: Id) -> Self {
        self.moderator_roles.push(role);
        self
    }

    /// Builder method to add a moderator user.
    pub fn with_moderator_user(mut self, user: Id) -> Self {
        self.moderator_users.push(user);
        self
    }

    /// Command prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.prefix.is_empty() {
            return Err(ConfigError::EmptyPrefix);
        }
        Ok(self)
    }

    /// Moderation predicate.
    ///
    /// A member moderates if they hold a moderator role, are listed as a
    /// moderator user, have the administrator permission, or own the guild.
    pub fn is_moderator(&self, member: &Member, guild: Option<&Guild>) -> bool {
        member
            .roles
            .iter()
            .any(|role| self.moderator_roles.contains(role))
            || self.moderator_users.contains(&member.user.id)
            || member.permissions.contains(Permissions::ADMINISTRATOR)
            || guild.is_some_and(|guild| guild.owner_id == member.user.id)
    }
}
