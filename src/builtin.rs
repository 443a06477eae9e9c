//! Built-in commands.

use chrono::Utc;

use crate::args::ArgType;
use crate::context::Context;
use crate::error::{CommandError, UserError};
use crate::tree::CommandDef;

/// `help [command...]`: reply with the help page of a command.
///
/// Without arguments the root page is shown, listing every top-level command.
pub fn help() -> CommandDef {
    CommandDef::new("help", (ArgType::text("command").extend(0).optional(),), show_help)
        .help("Show the help page of a command")
        .long_help("Show how to call a command and list its subcommands")
}

async fn show_help(ctx: Context, (path,): (Option<String>,)) -> Result<(), CommandError> {
    let path = path.unwrap_or_default();
    let tokens: Vec<&str> = path.split_whitespace().collect();
    let prefix = ctx.config().prefix();
    let tree = ctx.tree();

    let (id, rest) = tree.resolve(&tokens);
    if !rest.is_empty() {
        return Err(UserError::UnknownCommand(format!("{}{}", prefix, tokens.join(" "))).into());
    }

    let notice = tree.help_notice(id, prefix).with_timestamp(Utc::now());
    ctx.send_notice(&notice).await?;
    Ok(())
}
