//! Directory lookup service.
//!
//! The `Directory` trait resolves ids to platform entities and exposes the
//! already-loaded caches used for fuzzy name lookups. Failures surface
//! immediately; nothing here retries.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::DirectoryError;
use crate::platform::{Channel, EntityKind, Id, Member, Role, User};

/// Entity lookups provided by the platform client.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Fetch a channel of `guild` by id.
    async fn channel(&self, guild: Id, id: Id) -> Result<Channel, DirectoryError>;

    /// Fetch a member of `guild` by user id.
    async fn member(&self, guild: Id, id: Id) -> Result<Member, DirectoryError>;

    /// Fetch a role of `guild` by id.
    async fn role(&self, guild: Id, id: Id) -> Result<Role, DirectoryError>;

    /// Users currently in the client cache.
    fn cached_users(&self) -> Vec<User>;

    /// Channels of `guild` currently in the client cache.
    fn cached_channels(&self, guild: Id) -> Vec<Channel>;

    /// Roles of `guild` currently in the client cache.
    fn cached_roles(&self, guild: Id) -> Vec<Role>;
}

/// In-memory directory with a fixed set of entities.
///
/// Intended for tests and the console harness. Every entity is "cached", and
/// id lookups answer from the same maps.
#[derive(Debug, Default, Clone)]
pub struct StaticDirectory {
    users: Vec<User>,
    members: HashMap<(Id, Id), Member>,
    channels: HashMap<Id, Vec<Channel>>,
    roles: HashMap<Id, Vec<Role>>,
}

impl StaticDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to add a cached user.
    pub fn with_user(mut self, user: User) -> Self {
        if !self.users.iter().any(|known| known.id == user.id) {
            self.users.push(user);
        }
        self
    }

    /// Builder method to add a guild member (its user is cached too).
    pub fn with_member(mut self, guild: Id, member: Member) -> Self {
        self = self.with_user(member.user.clone());
        self.members.insert((guild, member.user.id), member);
        self
    }

    /// Builder method to add a guild channel.
    pub fn with_channel(mut self, guild: Id, channel: Channel) -> Self {
        self.channels.entry(guild).or_default().push(channel);
        self
    }

    /// Builder method to add a guild role.
    pub fn with_role(mut self, guild: Id, role: Role) -> Self {
        self.roles.entry(guild).or_default().push(role);
        self
    }
}

#[async_trait]
impl Directory for StaticDirectory {
    async fn channel(&self, guild: Id, id: Id) -> Result<Channel, DirectoryError> {
        self.channels
            .get(&guild)
            .and_then(|channels| channels.iter().find(|channel| channel.id == id))
            .cloned()
            .ok_or(DirectoryError::NotFound {
                kind: EntityKind::Channel,
                id,
            })
    }

    async fn member(&self, guild: Id, id: Id) -> Result<Member, DirectoryError> {
        self.members
            .get(&(guild, id))
            .cloned()
            .ok_or(DirectoryError::NotFound {
                kind: EntityKind::Member,
                id,
            })
    }

    async fn role(&self, guild: Id, id: Id) -> Result<Role, DirectoryError> {
        self.roles
            .get(&guild)
            .and_then(|roles| roles.iter().find(|role| role.id == id))
            .cloned()
            .ok_or(DirectoryError::NotFound {
                kind: EntityKind::Role,
                id,
            })
    }

    fn cached_users(&self) -> Vec<User> {
        self.users.clone()
    }

    fn cached_channels(&self, guild: Id) -> Vec<Channel> {
        self.channels.get(&guild).cloned().unwrap_or_default()
    }

    fn cached_roles(&self, guild: Id) -> Vec<Role> {
        self.roles.get(&guild).cloned().unwrap_or_default()
    }
}
