//! Test fixtures and utilities for mavis testing.
//!
//! Provides:
//! - `MockReplies`: reply channel capturing everything sent
//! - `BrokenReplies`: reply channel that always fails
//! - `test_directory()`: one guild with members, channels and roles
//! - `test_tree()`: command tree covering every argument family
//! - Message and context helpers for common test scenarios

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mavis::error::ReplyError;
use mavis::{
    ArgType, Bot, BotConfig, Channel, CommandDef, CommandError, CommandTree, Context, Guild,
    Member, Message, Notice, Permissions, ReplyChannel, Role, StaticDirectory, User, builtin,
};

// ============================================================================
// MockReplies - Capturing Reply Channel
// ============================================================================

/// One captured reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    /// Plain text
    Text(String),

    /// Structured notice
    Notice(Notice),
}

/// Reply channel collecting every reply in order.
#[derive(Debug, Default)]
pub struct MockReplies {
    sent: Mutex<Vec<Sent>>,
}

impl MockReplies {
    /// Create an empty channel.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Everything sent so far.
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    /// Plain text replies.
    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|sent| match sent {
                Sent::Text(text) => Some(text),
                Sent::Notice(_) => None,
            })
            .collect()
    }

    /// Notice replies.
    pub fn notices(&self) -> Vec<Notice> {
        self.sent()
            .into_iter()
            .filter_map(|sent| match sent {
                Sent::Notice(notice) => Some(notice),
                Sent::Text(_) => None,
            })
            .collect()
    }

    /// Check that nothing was sent.
    pub fn is_empty(&self) -> bool {
        self.sent.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl ReplyChannel for MockReplies {
    async fn send_text(&self, text: &str) -> Result<(), ReplyError> {
        self.sent.lock().unwrap().push(Sent::Text(text.to_string()));
        Ok(())
    }

    async fn send_notice(&self, notice: &Notice) -> Result<(), ReplyError> {
        self.sent.lock().unwrap().push(Sent::Notice(notice.clone()));
        Ok(())
    }
}

/// Reply channel whose every send fails.
#[derive(Debug)]
pub struct BrokenReplies;

#[async_trait]
impl ReplyChannel for BrokenReplies {
    async fn send_text(&self, _text: &str) -> Result<(), ReplyError> {
        Err(ReplyError("channel closed".to_string()))
    }
}

// ============================================================================
// Platform Fixtures
// ============================================================================

/// Test guild, owned by user 100.
pub const GUILD: Guild = Guild { id: 1, owner_id: 100 };

/// Channel messages are posted in.
pub const CHANNEL: u64 = 20;

/// Role configured as a moderator role.
pub const STAFF_ROLE: u64 = 30;

/// User listed as a moderator by id.
pub const TRUSTED_USER: u64 = 7;

/// Guild 1: members Anna (2), Annabelle (3) and Bob (5); channels general
/// (20), random (21) and general-chat (22); roles staff (30) and members (31).
pub fn test_directory() -> StaticDirectory {
    StaticDirectory::new()
        .with_member(GUILD.id, Member::new(User::new(2, "Anna")))
        .with_member(GUILD.id, Member::new(User::new(3, "Annabelle")))
        .with_member(GUILD.id, Member::new(User::new(5, "Bob")))
        .with_channel(GUILD.id, Channel::new(20, "general"))
        .with_channel(GUILD.id, Channel::new(21, "random"))
        .with_channel(GUILD.id, Channel::new(22, "general-chat"))
        .with_role(GUILD.id, Role::new(STAFF_ROLE, "staff"))
        .with_role(GUILD.id, Role::new(31, "members"))
}

/// Prefix `+`, staff role and user 7 as moderators.
pub fn test_config() -> BotConfig {
    BotConfig::default()
        .with_moderator_role(STAFF_ROLE)
        .with_moderator_user(TRUSTED_USER)
}

/// Guild message from `member`.
pub fn message_from(member: Member, content: &str) -> Message {
    Message::in_guild(GUILD, member, CHANNEL, content)
}

/// Guild message from a member with no roles or permissions.
pub fn member_message(id: u64, content: &str) -> Message {
    message_from(Member::new(User::new(id, format!("user{}", id))), content)
}

/// Guild message from a holder of the staff role.
pub fn staff_message(content: &str) -> Message {
    message_from(Member::new(User::new(8, "mod")).with_role(STAFF_ROLE), content)
}

/// Guild message from an administrator.
pub fn admin_message(content: &str) -> Message {
    message_from(
        Member::new(User::new(9, "admin")).with_permissions(Permissions::ADMINISTRATOR),
        content,
    )
}

/// Direct message outside any guild.
pub fn direct_message(content: &str) -> Message {
    Message::direct(User::new(2, "Anna"), 99, content)
}

// ============================================================================
// Test Tree
// ============================================================================

/// Shapes accepted by the `draw` command.
#[derive(Debug, Copy, Clone, PartialEq, Eq, mavis::Choice)]
pub enum Shape {
    /// Round
    Circle,
    /// Four sides
    Square,
    /// Three sides
    Triangle,
}

async fn echo(ctx: Context, (text,): (String,)) -> Result<(), CommandError> {
    ctx.send(&text).await?;
    Ok(())
}

async fn add(ctx: Context, (a, b): (i64, i64)) -> Result<(), CommandError> {
    ctx.send(&(a + b).to_string()).await?;
    Ok(())
}

async fn draw(ctx: Context, (shape, size): (Shape, i64)) -> Result<(), CommandError> {
    use mavis::args::Choice;
    ctx.send(&format!("{} of size {}", shape.as_str(), size)).await?;
    Ok(())
}

async fn kick(ctx: Context, (who, reason): (User, Option<String>)) -> Result<(), CommandError> {
    let reason = reason.unwrap_or_else(|| "none".to_string());
    ctx.send_success(&format!("kicked {} ({})", who.tag, reason)).await?;
    Ok(())
}

async fn purge(ctx: Context, (count,): (i64,)) -> Result<(), CommandError> {
    ctx.send(&format!("purged {}", count)).await?;
    Ok(())
}

async fn topic(ctx: Context, (channel, text): (Channel, String)) -> Result<(), CommandError> {
    ctx.send(&format!("#{}: {}", channel.name, text)).await?;
    Ok(())
}

async fn crash(_ctx: Context, (): ()) -> Result<(), CommandError> {
    Err(anyhow::anyhow!("handler exploded").into())
}

/// Command tree used by the integration tests.
///
/// ```text
/// help [command...]
/// echo <text...>            requires args
/// add <a> <b>
/// draw <shape> (size)
/// topic <channel> <text...> channel by mention, id or name
/// crash                     fails with an internal error
/// mod                       namespace
///   kick <who> (reason...)  moderator; who by mention or name
///   purge <count>           admin
/// ```
pub fn test_tree() -> CommandTree {
    CommandTree::builder()
        .command(builtin::help())
        .command(
            CommandDef::new("echo", (ArgType::string("text").extend(0),), echo)
                .help("Repeat the text")
                .requires_args(),
        )
        .command(CommandDef::new("add", (ArgType::integer("a"), ArgType::integer("b")), add).help("Add two numbers"))
        .command(
            CommandDef::new(
                "draw",
                (ArgType::<Shape>::choice_of("shape"), ArgType::range("size", 1, 10).default(3)),
                draw,
            )
            .help("Draw a shape"),
        )
        .command(
            CommandDef::new(
                "topic",
                (
                    ArgType::channel("channel").or(ArgType::channel_name("channel")),
                    ArgType::string("text").extend(0),
                ),
                topic,
            )
            .help("Set a topic"),
        )
        .command(CommandDef::new("crash", (), crash))
        .command(
            CommandDef::namespace("mod")
                .help("Moderation tools")
                .subcommand(
                    CommandDef::new(
                        "kick",
                        (
                            ArgType::mention("who").map(|member: Member| member.user).or(ArgType::username("who")),
                            ArgType::string("reason").extend(0).optional(),
                        ),
                        kick,
                    )
                    .help("Kick someone")
                    .moderator(),
                )
                .subcommand(
                    CommandDef::new("purge", (ArgType::range("count", 1, 101),), purge)
                        .help("Delete messages")
                        .admin(),
                ),
        )
        .build()
        .unwrap()
}

// ============================================================================
// Helpers
// ============================================================================

/// Bot over the test tree, directory and configuration.
pub fn test_bot() -> Bot {
    Bot::new(test_config(), test_tree(), Arc::new(test_directory()))
}

/// Context for `message` over the test fixtures, with its capturing channel.
pub fn test_context(message: Message) -> (Context, Arc<MockReplies>) {
    let replies = MockReplies::new();
    let ctx = Context::new(
        message,
        Arc::new(test_directory()),
        replies.clone(),
        Arc::new(test_config()),
        Arc::new(test_tree()),
    );
    (ctx, replies)
}

/// Run one message through the test bot and return what it replied.
pub async fn run(message: Message) -> Arc<MockReplies> {
    let replies = MockReplies::new();
    test_bot().handle_message(message, replies.clone()).await.unwrap();
    replies
}
