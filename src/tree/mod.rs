//! Command tree data structures.
//!
//! Commands are declared as nested [`CommandDef`]s and frozen into a
//! [`CommandTree`], an arena of [`CommandNode`]s addressed by [`NodeId`].
//! Parents are stored as indices; the root is a synthetic, unnamed namespace.
//!
//! Dispatch walks the longest prefix of tokens naming nested children
//! (case-insensitive), checks the resolved node's own permission flags, splits
//! the remaining tokens across its argument slots and runs the handler.
//!
//! # Example
//!
//! ```rust,ignore
//! let tree = CommandTree::builder()
//!     .command(CommandDef::new("echo", (ArgType::string("text").extend(0),), echo))
//!     .command(
//!         CommandDef::namespace("mod")
//!             .moderator()
//!             .subcommand(CommandDef::new("ban", (ArgType::mention("who"),), ban)),
//!     )
//!     .build()?;
//! ```

use std::fmt;
use std::future::Future;

use futures::future::BoxFuture;
use tracing::{debug, info};

use crate::args::ArgList;
use crate::args::list::{Allocation, allocate};
use crate::context::Context;
use crate::error::{CommandError, RegistrationError, UserError};
use crate::notice::{HELP_COLOR, Notice};

/// Stable handle of a node inside one [`CommandTree`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Synthetic root of every tree.
    pub const ROOT: NodeId = NodeId(0);
}

/// Type-erased argument list plus handler.
///
/// `overflow` is the too-many-arguments failure computed during allocation;
/// it is reported only after every slot parsed successfully.
trait Invoke: Send + Sync {
    fn widths(&self) -> Vec<i32>;

    fn usage(&self) -> Vec<String>;

    fn invoke(
        &self,
        ctx: Context,
        slots: Vec<String>,
        overflow: Option<UserError>,
    ) -> BoxFuture<'_, Result<(), CommandError>>;
}

struct Typed<A, F> {
    args: A,
    handler: F,
}

impl<A, F, Fut> Invoke for Typed<A, F>
where
    A: ArgList,
    F: Fn(Context, A::Output) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), CommandError>> + Send + 'static,
{
    fn widths(&self) -> Vec<i32> {
        self.args.widths()
    }

    fn usage(&self) -> Vec<String> {
        self.args.usage()
    }

    fn invoke(
        &self,
        ctx: Context,
        slots: Vec<String>,
        overflow: Option<UserError>,
    ) -> BoxFuture<'_, Result<(), CommandError>> {
        Box::pin(async move {
            let values = self.args.parse_all(slots, &ctx).await?;
            if let Some(err) = overflow {
                return Err(err.into());
            }
            (self.handler)(ctx, values).await
        })
    }
}

/// Handler of namespace-only nodes.
struct Namespace;

impl Invoke for Namespace {
    fn widths(&self) -> Vec<i32> {
        Vec::new()
    }

    fn usage(&self) -> Vec<String> {
        Vec::new()
    }

    fn invoke(
        &self,
        _ctx: Context,
        _slots: Vec<String>,
        overflow: Option<UserError>,
    ) -> BoxFuture<'_, Result<(), CommandError>> {
        Box::pin(async move {
            match overflow {
                Some(err) => Err(err.into()),
                None => Ok(()),
            }
        })
    }
}

/// Declarative command definition, consumed by [`TreeBuilder`].
pub struct CommandDef {
    name: String,
    help: String,
    long_help: String,
    requires_args: bool,
    admin: bool,
    moderator: bool,
    invoke: Box<dyn Invoke>,
    children: Vec<CommandDef>,
}

impl CommandDef {
    /// Command taking `args` and running `handler` with the parsed tuple.
    pub fn new<A, F, Fut>(name: impl Into<String>, args: A, handler: F) -> Self
    where
        A: ArgList,
        F: Fn(Context, A::Output) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CommandError>> + Send + 'static,
    {
        Self::with_invoke(name.into(), Box::new(Typed { args, handler }))
    }

    /// Node that only groups subcommands; invoking it does nothing.
    pub fn namespace(name: impl Into<String>) -> Self {
        Self::with_invoke(name.into(), Box::new(Namespace))
    }

    fn with_invoke(name: String, invoke: Box<dyn Invoke>) -> Self {
        Self {
            name,
            help: String::new(),
            long_help: String::new(),
            requires_args: false,
            admin: false,
            moderator: false,
            invoke,
            children: Vec::new(),
        }
    }

    /// One-line help shown in the parent's subcommand list.
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// Detailed help shown on the command's own help page.
    pub fn long_help(mut self, long_help: impl Into<String>) -> Self {
        self.long_help = long_help.into();
        self
    }

    /// Reject invocations with no tokens left after the command path.
    pub fn requires_args(mut self) -> Self {
        self.requires_args = true;
        self
    }

    /// Restrict to callers with the administrator capability.
    pub fn admin(mut self) -> Self {
        self.admin = true;
        self
    }

    /// Restrict to callers passing the moderation predicate.
    pub fn moderator(mut self) -> Self {
        self.moderator = true;
        self
    }

    /// Add a subcommand.
    pub fn subcommand(mut self, child: CommandDef) -> Self {
        self.children.push(child);
        self
    }
}

impl fmt::Debug for CommandDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDef")
            .field("name", &self.name)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

/// One registered command or namespace.
pub struct CommandNode {
    name: String,
    help: String,
    long_help: String,
    requires_args: bool,
    admin: bool,
    moderator: bool,
    invoke: Box<dyn Invoke>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl CommandNode {
    /// Command name (empty for the root).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// One-line help.
    pub fn help(&self) -> &str {
        &self.help
    }

    /// Detailed help, falling back to the one-line help.
    pub fn long_help(&self) -> &str {
        if self.long_help.is_empty() {
            &self.help
        } else {
            &self.long_help
        }
    }

    /// Whether invocations need at least one argument token.
    pub fn requires_args(&self) -> bool {
        self.requires_args
    }

    /// Whether the administrator capability is required.
    pub fn is_admin_only(&self) -> bool {
        self.admin
    }

    /// Whether the moderation predicate is required.
    pub fn is_moderator_only(&self) -> bool {
        self.moderator
    }

    /// Parent node (None for the root).
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in registration order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Check if this node has subcommands.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Token width of each argument slot.
    pub fn widths(&self) -> Vec<i32> {
        self.invoke.widths()
    }

    /// Check this node's own permission flags; ancestors are not consulted.
    pub fn check_permissions(&self, ctx: &Context) -> Result<(), UserError> {
        if self.admin && !ctx.is_admin() {
            return Err(UserError::AdminOnly);
        }
        if self.moderator && !ctx.is_moderator() {
            return Err(UserError::ModeratorOnly);
        }
        Ok(())
    }
}

impl fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandNode")
            .field("name", &self.name)
            .field("admin", &self.admin)
            .field("moderator", &self.moderator)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

/// Collects top-level definitions and validates them into a [`CommandTree`].
#[derive(Debug, Default)]
pub struct TreeBuilder {
    commands: Vec<CommandDef>,
}

impl TreeBuilder {
    /// Add a top-level command.
    pub fn command(mut self, def: CommandDef) -> Self {
        self.commands.push(def);
        self
    }

    /// Freeze the definitions.
    ///
    /// Fails on empty names, names containing whitespace and case-insensitive
    /// duplicates among siblings.
    pub fn build(self) -> Result<CommandTree, RegistrationError> {
        let mut tree = CommandTree::default();
        for def in self.commands {
            tree.insert(NodeId::ROOT, def)?;
        }
        info!(commands = tree.len(), "command tree loaded");
        Ok(tree)
    }
}

/// Immutable command tree.
pub struct CommandTree {
    nodes: Vec<CommandNode>,
}

impl Default for CommandTree {
    /// Tree holding only the synthetic root.
    fn default() -> Self {
        Self {
            nodes: vec![CommandNode {
                name: String::new(),
                help: String::new(),
                long_help: String::new(),
                requires_args: false,
                admin: false,
                moderator: false,
                invoke: Box::new(Namespace),
                parent: None,
                children: Vec::new(),
            }],
        }
    }
}

impl fmt::Debug for CommandTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.nodes).finish()
    }
}

impl CommandTree {
    /// Start declaring a tree.
    pub fn builder() -> TreeBuilder {
        TreeBuilder::default()
    }

    fn insert(&mut self, parent: NodeId, def: CommandDef) -> Result<NodeId, RegistrationError> {
        if def.name.is_empty() {
            return Err(RegistrationError::EmptyName {
                parent: self.full_name(parent, ""),
            });
        }
        if def.name.chars().any(char::is_whitespace) {
            return Err(RegistrationError::InvalidName(def.name));
        }
        if self.find_child(parent, &def.name).is_some() {
            return Err(RegistrationError::DuplicateSibling {
                parent: self.full_name(parent, ""),
                name: def.name,
            });
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(CommandNode {
            name: def.name,
            help: def.help,
            long_help: def.long_help,
            requires_args: def.requires_args,
            admin: def.admin,
            moderator: def.moderator,
            invoke: def.invoke,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);

        for child in def.children {
            self.insert(id, child)?;
        }
        Ok(id)
    }

    /// Root node id.
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Node by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by another tree.
    pub fn node(&self, id: NodeId) -> &CommandNode {
        &self.nodes[id.0]
    }

    /// Node by id, or None if `id` is out of range.
    pub fn get(&self, id: NodeId) -> Option<&CommandNode> {
        self.nodes.get(id.0)
    }

    /// Number of registered commands, excluding the root.
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Check if no command is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every registered command, depth-first in registration order.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack: Vec<NodeId> = self.node(NodeId::ROOT).children.iter().rev().copied().collect();
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            stack.extend(self.node(id).children.iter().rev().copied());
            Some(id)
        })
    }

    /// Find a child of `parent` by name (case-insensitive, Unicode lowercase).
    pub fn find_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        let key = name.to_lowercase();
        self.node(parent)
            .children
            .iter()
            .copied()
            .find(|&child| self.node(child).name.to_lowercase() == key)
    }

    /// Walk the longest prefix of `tokens` that names nested children.
    ///
    /// Returns the deepest node reached and the tokens left after it.
    pub fn resolve<'t, S: AsRef<str>>(&self, tokens: &'t [S]) -> (NodeId, &'t [S]) {
        let mut current = NodeId::ROOT;
        let mut rest = tokens;
        while let Some((first, tail)) = rest.split_first() {
            match self.find_child(current, first.as_ref()) {
                Some(child) => {
                    current = child;
                    rest = tail;
                }
                None => break,
            }
        }
        (current, rest)
    }

    /// Resolve `tokens` and invoke the resulting node.
    pub async fn dispatch<S: AsRef<str>>(&self, ctx: Context, tokens: &[S]) -> Result<(), CommandError> {
        let (id, rest) = self.resolve(tokens);
        debug!(
            command = %self.full_name(id, ctx.config().prefix()),
            remaining = rest.len(),
            "resolved command"
        );
        self.invoke(id, ctx, rest).await
    }

    /// Invoke node `id` with the tokens left after its path.
    pub async fn invoke<S: AsRef<str>>(
        &self,
        id: NodeId,
        ctx: Context,
        tokens: &[S],
    ) -> Result<(), CommandError> {
        let node = self.node(id);
        if node.requires_args && tokens.is_empty() {
            return Err(UserError::ArgumentsRequired.into());
        }
        node.check_permissions(&ctx)?;

        let widths = node.invoke.widths();
        let tokens: Vec<String> = tokens.iter().map(|t| t.as_ref().to_string()).collect();
        let Allocation { slots, leftover } = allocate(&widths, &tokens);
        let overflow = (!leftover.is_empty()).then(|| UserError::TooManyArguments {
            expected: widths.len(),
            has_subcommands: node.has_children(),
        });

        node.invoke.invoke(ctx, slots, overflow).await
    }

    /// Names on the path from the root to `id`.
    pub fn path(&self, id: NodeId) -> Vec<&str> {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id);
            if node.parent.is_some() {
                names.push(node.name.as_str());
            }
            current = node.parent;
        }
        names.reverse();
        names
    }

    /// Prefix followed by the space-separated path, e.g. `+mod ban`.
    pub fn full_name(&self, id: NodeId, prefix: &str) -> String {
        format!("{}{}", prefix, self.path(id).join(" "))
    }

    /// Usage line: bold full name, argument slots, `***(...)***` when the node
    /// has subcommands.
    pub fn usage(&self, id: NodeId, prefix: &str) -> String {
        let node = self.node(id);
        let mut parts = vec![format!("**{}**", self.full_name(id, prefix))];
        parts.extend(node.invoke.usage());
        if node.has_children() {
            parts.push("***(...)***".to_string());
        }
        parts.join(" ")
    }

    /// Help page of node `id`.
    pub fn help_notice(&self, id: NodeId, prefix: &str) -> Notice {
        let node = self.node(id);
        let mut body = format!("{}\n\n{}\n\n", self.usage(id, prefix), node.long_help());
        if node.requires_args {
            body.push_str("This command cannot be called without arguments\n\n");
        }
        if node.has_children() {
            let lines: Vec<String> = node
                .children
                .iter()
                .map(|&child| {
                    let child_node = self.node(child);
                    let staff = if child_node.admin || child_node.moderator {
                        " (staff)"
                    } else {
                        ""
                    };
                    format!("{} | {}{}", self.usage(child, prefix), child_node.help, staff)
                })
                .collect();
            body.push_str(&lines.join("\n"));
        } else {
            body.push_str("This command has no subcommands");
        }
        Notice::new(body).with_title("Help").with_color(HELP_COLOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::ArgType;
    use crate::config::BotConfig;
    use crate::testing::{Transcript, admin_message, context_with, guild_message};
    use std::sync::Arc;

    async fn echo(ctx: Context, (text,): (String,)) -> Result<(), CommandError> {
        ctx.send(&text).await?;
        Ok(())
    }

    async fn add(ctx: Context, (a, b): (i64, i64)) -> Result<(), CommandError> {
        ctx.send(&(a + b).to_string()).await?;
        Ok(())
    }

    async fn ban(ctx: Context, (who,): (String,)) -> Result<(), CommandError> {
        ctx.send(&format!("banned {}", who)).await?;
        Ok(())
    }

    async fn pair(ctx: Context, (first, second): (String, String)) -> Result<(), CommandError> {
        ctx.send(&format!("{}|{}", first, second)).await?;
        Ok(())
    }

    fn tree() -> CommandTree {
        CommandTree::builder()
            .command(
                CommandDef::new("echo", (ArgType::string("text").extend(0),), echo)
                    .help("Repeat the text")
                    .requires_args(),
            )
            .command(CommandDef::new("add", (ArgType::integer("a"), ArgType::integer("b")), add))
            .command(
                CommandDef::new(
                    "pair",
                    (ArgType::string("first").extend(2), ArgType::string("second").extend(-1)),
                    pair,
                ),
            )
            .command(
                CommandDef::namespace("mod")
                    .help("Moderation")
                    .subcommand(CommandDef::new("Ban", (ArgType::string("who"),), ban).moderator().help("Ban someone"))
                    .subcommand(CommandDef::namespace("purge").admin()),
            )
            .build()
            .unwrap()
    }

    async fn run(message: crate::platform::Message) -> (Result<(), CommandError>, Arc<Transcript>) {
        let tree = Arc::new(tree());
        let transcript = Arc::new(Transcript::default());
        let tokens: Vec<String> = message.content[1..].split_whitespace().map(String::from).collect();
        let ctx = context_with(message, transcript.clone(), CommandTree::default(), BotConfig::default());
        let result = tree.dispatch(ctx, &tokens).await;
        (result, transcript)
    }

    #[test]
    fn test_build_counts_and_iterates() {
        let tree = tree();
        assert_eq!(tree.len(), 6);
        let names: Vec<&str> = tree.iter().map(|id| tree.node(id).name()).collect();
        assert_eq!(names, vec!["echo", "add", "pair", "mod", "Ban", "purge"]);
    }

    #[test]
    fn test_empty_tree() {
        let tree = CommandTree::builder().build().unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.iter().count(), 0);
    }

    #[test]
    fn test_duplicate_siblings_rejected() {
        let result = CommandTree::builder()
            .command(CommandDef::namespace("mod").subcommand(CommandDef::namespace("ban")).subcommand(CommandDef::namespace("BAN")))
            .build();
        assert_eq!(
            result.unwrap_err(),
            RegistrationError::DuplicateSibling {
                parent: "mod".into(),
                name: "BAN".into(),
            }
        );
    }

    #[test]
    fn test_non_ascii_names_fold_case() {
        let tree = CommandTree::builder()
            .command(CommandDef::namespace("Équipe").subcommand(CommandDef::namespace("Liste")))
            .build()
            .unwrap();
        let tokens = ["équipe", "LISTE"];
        let (id, rest) = tree.resolve(&tokens);
        assert_eq!(tree.full_name(id, ""), "Équipe Liste");
        assert!(rest.is_empty());

        let result = CommandTree::builder()
            .command(CommandDef::namespace("Équipe"))
            .command(CommandDef::namespace("équipe"))
            .build();
        assert_eq!(
            result.unwrap_err(),
            RegistrationError::DuplicateSibling {
                parent: "".into(),
                name: "équipe".into(),
            }
        );
    }

    #[test]
    fn test_invalid_names_rejected() {
        let result = CommandTree::builder().command(CommandDef::namespace("")).build();
        assert!(matches!(result, Err(RegistrationError::EmptyName { .. })));

        let result = CommandTree::builder().command(CommandDef::namespace("two words")).build();
        assert_eq!(result.unwrap_err(), RegistrationError::InvalidName("two words".into()));
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let tree = tree();
        let tokens = ["MOD", "ban", "someone"];
        let (id, rest) = tree.resolve(&tokens);
        assert_eq!(tree.node(id).name(), "Ban");
        assert_eq!(rest, &["someone"]);
        assert_eq!(tree.full_name(id, "+"), "+mod Ban");
    }

    #[test]
    fn test_resolve_stops_at_unknown_token() {
        let tree = tree();
        let tokens = ["echo", "hello", "world"];
        let (id, rest) = tree.resolve(&tokens);
        assert_eq!(tree.node(id).name(), "echo");
        assert_eq!(rest, &["hello", "world"]);

        let tokens = ["nothing"];
        let (id, rest) = tree.resolve(&tokens);
        assert_eq!(id, tree.root());
        assert_eq!(rest, &["nothing"]);
    }

    #[tokio::test]
    async fn test_echo_joins_remaining_tokens() {
        let (result, transcript) = run(guild_message(2, "+echo hello world")).await;
        assert!(result.is_ok());
        assert_eq!(transcript.texts(), vec!["hello world"]);
    }

    #[tokio::test]
    async fn test_requires_args() {
        let (result, transcript) = run(guild_message(2, "+echo")).await;
        assert!(matches!(result, Err(CommandError::User(UserError::ArgumentsRequired))));
        assert!(transcript.replies().is_empty());
    }

    #[tokio::test]
    async fn test_leftover_tokens_fail_after_parsing() {
        let (result, transcript) = run(guild_message(2, "+pair a b c d")).await;
        assert!(matches!(
            result,
            Err(CommandError::User(UserError::TooManyArguments {
                expected: 2,
                has_subcommands: false,
            }))
        ));
        assert!(transcript.replies().is_empty());

        // the reserving slot leaves one token, so three tokens starve it
        let (result, _) = run(guild_message(2, "+pair a b c")).await;
        assert!(matches!(
            result,
            Err(CommandError::User(UserError::MissingArgument { .. }))
        ));
    }

    #[tokio::test]
    async fn test_argument_errors_win_over_leftovers() {
        let (result, _) = run(guild_message(2, "+add 1 x 3")).await;
        assert!(matches!(
            result,
            Err(CommandError::User(UserError::WrongForm { .. }))
        ));
    }

    #[tokio::test]
    async fn test_unknown_subcommand_hint() {
        let (result, _) = run(guild_message(2, "+mod kick someone")).await;
        let err = result.unwrap_err();
        assert!(err.to_string().ends_with("or this subcommand does not exist"));
    }

    #[tokio::test]
    async fn test_moderator_leaf_under_open_namespace() {
        let (result, transcript) = run(guild_message(2, "+mod ban anna")).await;
        assert!(matches!(result, Err(CommandError::User(UserError::ModeratorOnly))));
        assert!(transcript.replies().is_empty());

        let (result, transcript) = run(admin_message("+mod ban anna")).await;
        assert!(result.is_ok());
        assert_eq!(transcript.texts(), vec!["banned anna"]);
    }

    #[tokio::test]
    async fn test_admin_gate() {
        let (result, _) = run(guild_message(2, "+mod purge")).await;
        assert!(matches!(result, Err(CommandError::User(UserError::AdminOnly))));

        let (result, _) = run(admin_message("+mod purge")).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_namespace_is_noop() {
        let (result, transcript) = run(guild_message(2, "+mod")).await;
        assert!(result.is_ok());
        assert!(transcript.replies().is_empty());
    }

    #[test]
    fn test_usage() {
        let tree = tree();
        let tokens = ["pair"];
        let (pair, _) = tree.resolve(&tokens);
        assert_eq!(tree.usage(pair, "+"), "**+pair** *<first>* *<second>*");

        let tokens = ["mod"];
        let (namespace, _) = tree.resolve(&tokens);
        assert_eq!(tree.usage(namespace, "+"), "**+mod** ***(...)***");
    }

    #[test]
    fn test_help_notice() {
        let tree = tree();
        let tokens = ["mod"];
        let (namespace, _) = tree.resolve(&tokens);
        let notice = tree.help_notice(namespace, "!");
        assert_eq!(notice.title.as_deref(), Some("Help"));
        assert_eq!(notice.color, HELP_COLOR);
        assert_eq!(
            notice.body,
            "**!mod** ***(...)***\n\nModeration\n\n\
             **!mod Ban** *<who>* | Ban someone (staff)\n\
             **!mod purge** |  (staff)"
        );

        let tokens = ["echo"];
        let (echo, _) = tree.resolve(&tokens);
        let notice = tree.help_notice(echo, "+");
        assert_eq!(
            notice.body,
            "**+echo** *<text>*\n\nRepeat the text\n\n\
             This command cannot be called without arguments\n\n\
             This command has no subcommands"
        );
    }
}
