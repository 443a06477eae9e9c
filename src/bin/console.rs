//! Console harness for mavis
//!
//! Reads one message per line from stdin and prints replies to stdout. Lines
//! are posted by an administrator in a single simulated guild, so every command
//! of the sample tree is reachable.
//!
//! To run:
//! ```bash
//! cargo run --bin mavis-console --features console -- [config.toml]
//! ```
//!
//! Set `RUST_LOG=mavis=debug` to see dispatch decisions.

use std::sync::Arc;

use async_trait::async_trait;
use mavis::{
    ArgType, Bot, BotConfig, Channel, CommandDef, CommandError, CommandTree, Context, Guild,
    Member, Message, Permissions, ReplyChannel, Role, StaticDirectory, User,
    builtin,
    error::ReplyError,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

// =============================================================================
// Simulated Platform
// =============================================================================

const GUILD: Guild = Guild { id: 1, owner_id: 1 };
const CHANNEL: u64 = 10;

struct Stdout;

#[async_trait]
impl ReplyChannel for Stdout {
    async fn send_text(&self, text: &str) -> Result<(), ReplyError> {
        println!("{}", text);
        Ok(())
    }
}

fn directory() -> StaticDirectory {
    StaticDirectory::new()
        .with_member(GUILD.id, console_member())
        .with_member(GUILD.id, Member::new(User::new(2, "anna#0001")))
        .with_member(GUILD.id, Member::new(User::new(3, "annabelle#0002")))
        .with_channel(GUILD.id, Channel::new(CHANNEL, "general"))
        .with_channel(GUILD.id, Channel::new(11, "random"))
        .with_role(GUILD.id, Role::new(20, "staff"))
}

fn console_member() -> Member {
    Member::new(User::new(1, "console#0000")).with_permissions(Permissions::ADMINISTRATOR)
}

// =============================================================================
// Sample Commands
// =============================================================================

async fn ping(ctx: Context, (): ()) -> Result<(), CommandError> {
    ctx.send("pong").await?;
    Ok(())
}

async fn echo(ctx: Context, (text,): (String,)) -> Result<(), CommandError> {
    ctx.send(&text).await?;
    Ok(())
}

async fn roll(ctx: Context, (sides, times): (i64, i64)) -> Result<(), CommandError> {
    ctx.send(&format!("rolling {}d{}", times, sides)).await?;
    Ok(())
}

async fn warn(ctx: Context, (who, reason): (Member, Option<String>)) -> Result<(), CommandError> {
    let reason = reason.unwrap_or_else(|| "no reason given".to_string());
    ctx.send_success(&format!("{} was warned: {}", who.user.mention(), reason))
        .await?;
    Ok(())
}

async fn topic(ctx: Context, (channel, text): (Channel, String)) -> Result<(), CommandError> {
    ctx.send_success(&format!("topic of #{} set to {}", channel.name, text))
        .await?;
    Ok(())
}

fn tree() -> Result<CommandTree, mavis::RegistrationError> {
    CommandTree::builder()
        .command(builtin::help())
        .command(CommandDef::new("ping", (), ping).help("Check that the bot answers"))
        .command(
            CommandDef::new("echo", (ArgType::string("text").extend(0),), echo)
                .help("Repeat the text")
                .requires_args(),
        )
        .command(
            CommandDef::new(
                "roll",
                (
                    ArgType::range("sides", 2, 101),
                    ArgType::range("times", 1, 11).default(1),
                ),
                roll,
            )
            .help("Roll dice"),
        )
        .command(
            CommandDef::namespace("mod")
                .help("Moderation tools")
                .subcommand(
                    CommandDef::new(
                        "warn",
                        (
                            ArgType::mention("member").or(ArgType::username("member").map(Member::new)),
                            ArgType::string("reason").extend(0).optional(),
                        ),
                        warn,
                    )
                    .help("Warn a member")
                    .moderator(),
                )
                .subcommand(
                    CommandDef::new(
                        "topic",
                        (
                            ArgType::channel("channel").or(ArgType::channel_name("channel")),
                            ArgType::string("text").extend(0),
                        ),
                        topic,
                    )
                    .help("Set a channel topic")
                    .admin(),
                ),
        )
        .build()
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => BotConfig::load(&path)?,
        None => BotConfig::default(),
    };
    let prefix = config.prefix().to_string();

    let bot = Bot::new(config, tree()?, Arc::new(directory()));
    let replies: Arc<dyn ReplyChannel> = Arc::new(Stdout);
    println!("mavis console ({} commands), try {}help", bot.tree().len(), prefix);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let message = Message::in_guild(GUILD, console_member(), CHANNEL, line);
        bot.handle_message(message, replies.clone()).await?;
    }

    Ok(())
}
