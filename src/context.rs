//! Request context.
//!
//! A `Context` bundles everything one inbound message needs: the message itself,
//! the directory, the reply channel, the configuration and the command tree.
//! It is cheap to clone and is handed unchanged to coercions and handlers.

use std::sync::Arc;

use crate::config::BotConfig;
use crate::directory::Directory;
use crate::error::{ReplyError, UserError};
use crate::notice::Notice;
use crate::platform::{Guild, Id, Member, Message, Permissions, User};
use crate::reply::ReplyChannel;
use crate::tree::CommandTree;

/// Per-message capability bundle.
#[derive(Clone)]
pub struct Context {
    inner: Arc<Inner>,
}

struct Inner {
    message: Message,
    directory: Arc<dyn Directory>,
    replies: Arc<dyn ReplyChannel>,
    config: Arc<BotConfig>,
    tree: Arc<CommandTree>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("message", &self.inner.message)
            .field("directory", &"<dyn Directory>")
            .field("replies", &"<dyn ReplyChannel>")
            .finish_non_exhaustive()
    }
}

impl Context {
    /// Create a context for one inbound message.
    pub fn new(
        message: Message,
        directory: Arc<dyn Directory>,
        replies: Arc<dyn ReplyChannel>,
        config: Arc<BotConfig>,
        tree: Arc<CommandTree>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                message,
                directory,
                replies,
                config,
                tree,
            }),
        }
    }

    /// Inbound message.
    pub fn message(&self) -> &Message {
        &self.inner.message
    }

    /// Message author.
    pub fn author(&self) -> &User {
        &self.inner.message.author
    }

    /// Author as a guild member, if the message came from a guild.
    pub fn member(&self) -> Option<&Member> {
        self.inner.message.member.as_ref()
    }

    /// Guild the message came from.
    pub fn guild(&self) -> Option<&Guild> {
        self.inner.message.guild.as_ref()
    }

    /// Guild id, failing with a user error in direct conversations.
    pub fn guild_id(&self) -> Result<Id, UserError> {
        self.guild().map(|guild| guild.id).ok_or(UserError::NotInGuild)
    }

    /// Directory lookup service.
    pub fn directory(&self) -> &dyn Directory {
        self.inner.directory.as_ref()
    }

    /// Bot configuration.
    pub fn config(&self) -> &BotConfig {
        &self.inner.config
    }

    /// Command tree being dispatched.
    pub fn tree(&self) -> &CommandTree {
        &self.inner.tree
    }

    /// Check the administrator capability.
    pub fn is_admin(&self) -> bool {
        self.member()
            .is_some_and(|member| member.permissions.contains(Permissions::ADMINISTRATOR))
    }

    /// Check the moderation predicate (see [`BotConfig::is_moderator`]).
    pub fn is_moderator(&self) -> bool {
        self.member()
            .is_some_and(|member| self.config().is_moderator(member, self.guild()))
    }

    /// Reply with plain text.
    pub async fn send(&self, text: &str) -> Result<(), ReplyError> {
        self.inner.replies.send_text(text).await
    }

    /// Reply with a structured notice.
    pub async fn send_notice(&self, notice: &Notice) -> Result<(), ReplyError> {
        self.inner.replies.send_notice(notice).await
    }

    /// Reply with an error notice.
    pub async fn send_error(&self, message: &str) -> Result<(), ReplyError> {
        self.send_notice(&Notice::error(message)).await
    }

    /// Reply with a success notice.
    pub async fn send_success(&self, message: &str) -> Result<(), ReplyError> {
        self.send_notice(&Notice::success(message)).await
    }
}
