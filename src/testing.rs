//! Shared fixtures for unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::BotConfig;
use crate::context::Context;
use crate::directory::StaticDirectory;
use crate::error::ReplyError;
use crate::notice::Notice;
use crate::platform::{Channel, Guild, Id, Member, Message, Permissions, Role, User};
use crate::reply::ReplyChannel;
use crate::tree::CommandTree;

pub(crate) const GUILD: Guild = Guild { id: 1, owner_id: 100 };

/// One recorded reply.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Reply {
    Text(String),
    Notice(Notice),
}

/// Reply channel that records everything sent through it.
#[derive(Debug, Default)]
pub(crate) struct Transcript {
    replies: Mutex<Vec<Reply>>,
}

impl Transcript {
    pub(crate) fn replies(&self) -> Vec<Reply> {
        self.replies.lock().unwrap().clone()
    }

    pub(crate) fn texts(&self) -> Vec<String> {
        self.replies()
            .into_iter()
            .filter_map(|reply| match reply {
                Reply::Text(text) => Some(text),
                Reply::Notice(_) => None,
            })
            .collect()
    }

    pub(crate) fn notices(&self) -> Vec<Notice> {
        self.replies()
            .into_iter()
            .filter_map(|reply| match reply {
                Reply::Notice(notice) => Some(notice),
                Reply::Text(_) => None,
            })
            .collect()
    }
}

#[async_trait]
impl ReplyChannel for Transcript {
    async fn send_text(&self, text: &str) -> Result<(), ReplyError> {
        self.replies.lock().unwrap().push(Reply::Text(text.to_string()));
        Ok(())
    }

    async fn send_notice(&self, notice: &Notice) -> Result<(), ReplyError> {
        self.replies.lock().unwrap().push(Reply::Notice(notice.clone()));
        Ok(())
    }
}

/// Guild 1: members Anna (2) and Annabelle (3), channels general (20) and
/// random (21), roles staff (30) and members (31).
pub(crate) fn directory() -> StaticDirectory {
    StaticDirectory::new()
        .with_member(GUILD.id, Member::new(User::new(2, "Anna")))
        .with_member(GUILD.id, Member::new(User::new(3, "Annabelle")).with_role(30))
        .with_channel(GUILD.id, Channel::new(20, "general"))
        .with_channel(GUILD.id, Channel::new(21, "random"))
        .with_role(GUILD.id, Role::new(30, "staff"))
        .with_role(GUILD.id, Role::new(31, "members"))
}

/// Guild message from a member with no roles and no permissions.
pub(crate) fn guild_message(author: Id, content: &str) -> Message {
    let member = Member::new(User::new(author, format!("user{author}")));
    Message::in_guild(GUILD, member, 20, content)
}

/// Guild message from an administrator.
pub(crate) fn admin_message(content: &str) -> Message {
    let member =
        Member::new(User::new(4, "root")).with_permissions(Permissions::ADMINISTRATOR);
    Message::in_guild(GUILD, member, 20, content)
}

pub(crate) fn context_for(message: Message, transcript: Arc<Transcript>) -> Context {
    context_with(message, transcript, CommandTree::default(), BotConfig::default())
}

pub(crate) fn context_with(
    message: Message,
    transcript: Arc<Transcript>,
    tree: CommandTree,
    config: BotConfig,
) -> Context {
    Context::new(
        message,
        Arc::new(directory()),
        transcript,
        Arc::new(config),
        Arc::new(tree),
    )
}
