//! Chat platform value types.
//!
//! Plain data handed to the core by the platform client. Nothing here performs
//! I/O; lookups go through [`Directory`](crate::directory::Directory).

use std::fmt;

/// Platform snowflake id.
pub type Id = u64;

/// Permission bit set of a guild member.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Permissions(u64);

impl Permissions {
    /// Administrator bit (`0x8`)
    pub const ADMINISTRATOR: Permissions = Permissions(0x8);

    /// No permissions.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Build from raw bits.
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Raw bits.
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Check whether every bit of `other` is set.
    pub const fn contains(self, other: Permissions) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Kind of entity resolved through the directory.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Guild channel
    Channel,
    /// Platform user
    User,
    /// Guild member
    Member,
    /// Guild role
    Role,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Channel => "channel",
            EntityKind::User => "user",
            EntityKind::Member => "member",
            EntityKind::Role => "role",
        })
    }
}

/// Platform user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// User id
    pub id: Id,

    /// Display tag used for name lookups (e.g. `anna#0001`)
    pub tag: String,

    /// Whether the account is a bot
    pub bot: bool,
}

impl User {
    /// Create a human user.
    pub fn new(id: Id, tag: impl Into<String>) -> Self {
        Self {
            id,
            tag: tag.into(),
            bot: false,
        }
    }

    /// Create a bot account.
    pub fn bot(id: Id, tag: impl Into<String>) -> Self {
        Self {
            bot: true,
            ..Self::new(id, tag)
        }
    }

    /// Mention syntax for this user.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

/// User seen as a member of one guild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Underlying user
    pub user: User,

    /// Role ids held in the guild
    pub roles: Vec<Id>,

    /// Effective guild permissions
    pub permissions: Permissions,
}

impl Member {
    /// Member with no roles and no permissions.
    pub fn new(user: User) -> Self {
        Self {
            user,
            roles: Vec::new(),
            permissions: Permissions::empty(),
        }
    }

    /// Builder method to add a role.
    pub fn with_role(mut self, role: Id) -> Self {
        self.roles.push(role);
        self
    }

    /// Builder method to set permissions.
    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = permissions;
        self
    }
}

/// Guild channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    /// Channel id
    pub id: Id,
    /// Channel name
    pub name: String,
}

impl Channel {
    /// Create a channel.
    pub fn new(id: Id, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Guild role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    /// Role id
    pub id: Id,
    /// Role name
    pub name: String,
}

impl Role {
    /// Create a role.
    pub fn new(id: Id, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Guild the message was posted in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Guild {
    /// Guild id
    pub id: Id,
    /// Owner's user id
    pub owner_id: Id,
}

/// Inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Author
    pub author: User,

    /// Author as a guild member (None in direct conversations)
    pub member: Option<Member>,

    /// Guild (None in direct conversations)
    pub guild: Option<Guild>,

    /// Source channel
    pub channel_id: Id,

    /// Raw content
    pub content: String,
}

impl Message {
    /// Direct (guild-less) message.
    pub fn direct(author: User, channel_id: Id, content: impl Into<String>) -> Self {
        Self {
            author,
            member: None,
            guild: None,
            channel_id,
            content: content.into(),
        }
    }

    /// Message posted in a guild channel by `member`.
    pub fn in_guild(guild: Guild, member: Member, channel_id: Id, content: impl Into<String>) -> Self {
        Self {
            author: member.user.clone(),
            member: Some(member),
            guild: Some(guild),
            channel_id,
            content: content.into(),
        }
    }
}
