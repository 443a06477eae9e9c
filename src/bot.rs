//! Per-message entry point.
//!
//! [`Bot`] owns the read-only state shared by every message (configuration,
//! command tree, directory) and turns one inbound message into one dispatch.
//! It is the single place where failures are rendered for the caller:
//! user errors become an error notice, everything else is logged and shown as
//! `kind: message` text.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::{BotConfig, DEFAULT_PREFIX};
use crate::context::Context;
use crate::directory::Directory;
use crate::error::{CommandError, ReplyError};
use crate::platform::Message;
use crate::reply::ReplyChannel;
use crate::tree::CommandTree;

/// Split command text on runs of whitespace.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(String::from).collect()
}

/// Command interpreter bound to one tree and one directory.
#[derive(Clone)]
pub struct Bot {
    config: Arc<BotConfig>,
    tree: Arc<CommandTree>,
    directory: Arc<dyn Directory>,
}

impl Bot {
    /// Create a bot. The tree is frozen from here on.
    ///
    /// An empty prefix would address every message to the bot, so it is
    /// replaced by [`DEFAULT_PREFIX`].
    pub fn new(mut config: BotConfig, tree: CommandTree, directory: Arc<dyn Directory>) -> Self {
        if config.prefix.is_empty() {
            warn!(prefix = DEFAULT_PREFIX, "empty command prefix replaced");
            config.prefix = DEFAULT_PREFIX.to_string();
        }
        Self {
            config: Arc::new(config),
            tree: Arc::new(tree),
            directory,
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Command tree in use.
    pub fn tree(&self) -> &CommandTree {
        &self.tree
    }

    /// Command text of `message` (content after the prefix), or None when the
    /// message is not addressed to the bot.
    pub fn command_text<'m>(&self, message: &'m Message) -> Option<&'m str> {
        if message.author.bot {
            return None;
        }
        message.content.strip_prefix(self.config.prefix())
    }

    /// Handle one inbound message.
    ///
    /// Messages from bot accounts and messages without the prefix are ignored.
    /// Returns an error only when the failure reply itself could not be sent.
    pub async fn handle_message(
        &self,
        message: Message,
        replies: Arc<dyn ReplyChannel>,
    ) -> Result<(), ReplyError> {
        let Some(text) = self.command_text(&message) else {
            return Ok(());
        };
        let tokens = tokenize(text);

        let ctx = Context::new(
            message,
            self.directory.clone(),
            replies,
            self.config.clone(),
            self.tree.clone(),
        );

        match self.tree.dispatch(ctx.clone(), &tokens).await {
            Ok(()) => Ok(()),
            Err(CommandError::User(err)) => {
                debug!(author = ctx.author().id, error = %err, "command rejected");
                ctx.send_error(&err.to_string()).await
            }
            Err(err) => {
                warn!(author = ctx.author().id, error = ?err, "error while handling message");
                ctx.send(&format!("{}: {}", err.kind(), err)).await
            }
        }
    }
}

impl std::fmt::Debug for Bot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bot")
            .field("config", &self.config)
            .field("commands", &self.tree.len())
            .finish_non_exhaustive()
    }
}
