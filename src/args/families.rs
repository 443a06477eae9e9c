//! Built-in argument families.
//!
//! | Family | Pattern | Extra failure |
//! |---|---|---|
//! | [`string`](ArgType::string) | any non-empty text | - |
//! | [`integer`](ArgType::integer) | optional sign + digits | magnitude over the bound |
//! | [`range`](ArgType::range), [`float_range`](ArgType::float_range) | number | outside `[from, to)` |
//! | [`choice`](ArgType::choice), [`choice_of`](ArgType::choice_of) | any non-empty text | not a member |
//! | [`channel`](ArgType::channel), [`mention`](ArgType::mention), [`role`](ArgType::role) | mention syntax or bare id | not found |
//! | [`username`](ArgType::username), [`channel_name`](ArgType::channel_name), [`role_name`](ArgType::role_name) | any non-empty text | not found, ambiguous |

use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::args::ArgType;
use crate::error::{DirectoryError, UserError};
use crate::platform::{Channel, EntityKind, Id, Member, Role, User};

/// Absolute bound on float arguments.
pub const FLOAT_BOUND: f64 = 1e20;

static ANY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^.+$").expect("valid pattern"));
static LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^.+\..+$").expect("valid pattern"));
static INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?\d+$").expect("valid pattern"));
static FLOAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+(\.\d*)?$").expect("valid pattern"));
static CHANNEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<#\d+>$|^\d+$").expect("valid pattern"));
static MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<@!?\d+>$|^\d+$").expect("valid pattern"));
static ROLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<@&\d+>$|^\d+$").expect("valid pattern"));

/// Closed set of keywords parsed by [`ArgType::choice_of`].
///
/// Usually derived with `#[derive(Choice)]`.
pub trait Choice: Copy + Send + Sync + 'static {
    /// Accepted spellings, in declaration order.
    const VARIANTS: &'static [&'static str];

    /// Parse a spelling (case-sensitive).
    fn from_str(s: &str) -> Option<Self>
    where
        Self: Sized;

    /// Spelling of this value.
    fn as_str(&self) -> &'static str;
}

/// Escape characters the chat platform treats as markup.
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '*' | '_' | '~' | '`' | '|' | '>') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Fuzzy name lookup.
///
/// Keeps candidates whose key contains `query` case-insensitively. If exactly
/// one of them equals `query` case-insensitively, only that one is returned.
pub fn find_like<T, F>(query: &str, candidates: impl IntoIterator<Item = T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    let needle = query.to_lowercase();
    let mut matches: Vec<T> = candidates
        .into_iter()
        .filter(|candidate| key(candidate).to_lowercase().contains(&needle))
        .collect();

    let exact: Vec<usize> = matches
        .iter()
        .enumerate()
        .filter(|&(_, candidate)| key(candidate).to_lowercase() == needle)
        .map(|(index, _)| index)
        .collect();

    if let &[index] = exact.as_slice() {
        return vec![matches.swap_remove(index)];
    }
    matches
}

fn single<T>(mut matches: Vec<T>, kind: EntityKind, name: &str, query: &str) -> Result<T, UserError> {
    match matches.len() {
        1 => Ok(matches.remove(0)),
        0 => Err(UserError::NotFound {
            kind,
            name: name.to_string(),
        }),
        count => Err(UserError::Ambiguous {
            kind,
            query: query.to_string(),
            count,
        }),
    }
}

fn lookup_error(kind: EntityKind, name: &str, error: DirectoryError) -> UserError {
    match error {
        DirectoryError::NotFound { .. } => UserError::NotFound {
            kind,
            name: name.to_string(),
        },
        other => UserError::Invalid(other.to_string()),
    }
}

/// Extract the id from mention syntax (`<#1>`, `<@!1>`, `<@&1>`) or a bare id.
fn snowflake(raw: &str, kind: EntityKind, name: &str) -> Result<Id, UserError> {
    raw.trim_matches(|c: char| !c.is_ascii_digit())
        .parse()
        .map_err(|_| UserError::NotFound {
            kind,
            name: name.to_string(),
        })
}

fn parse_integer(raw: &str, bound: i64) -> Result<i64, UserError> {
    let too_large = || UserError::TooLarge {
        bound: bound.to_string(),
    };
    let n: i64 = raw.parse().map_err(|_| too_large())?;
    if n.unsigned_abs() > bound.unsigned_abs() {
        return Err(too_large());
    }
    Ok(n)
}

impl ArgType<String> {
    /// Free text; reserved markup characters are escaped.
    pub fn string(name: impl Into<String>) -> Self {
        ArgType::custom(name, "string", ANY.clone(), |raw, _ctx| async move {
            Ok(escape_markdown(&raw))
        })
    }

    /// Free text taken verbatim.
    pub fn text(name: impl Into<String>) -> Self {
        ArgType::custom(name, "text", ANY.clone(), |raw, _ctx| async move { Ok(raw) })
    }

    /// Anything that looks like a link (`something.something`).
    pub fn link(name: impl Into<String>) -> Self {
        ArgType::custom(name, "url", LINK.clone(), |raw, _ctx| async move { Ok(raw) })
    }

    /// One of `values` (case-sensitive).
    pub fn choice(name: impl Into<String>, values: &[&str]) -> Self {
        let name = name.into();
        let label = name.clone();
        let values: Arc<[String]> = values.iter().map(|value| value.to_string()).collect();
        ArgType::custom(name, "string", ANY.clone(), move |raw, _ctx| {
            let result = if values.contains(&raw) {
                Ok(raw)
            } else {
                Err(UserError::NotInChoices {
                    name: label.clone(),
                    choices: values.join(","),
                })
            };
            async move { result }
        })
    }
}

impl<E: Choice> ArgType<E> {
    /// One of the spellings of `E` (case-sensitive).
    pub fn choice_of(name: impl Into<String>) -> Self {
        let name = name.into();
        let label = name.clone();
        ArgType::custom(name, "string", ANY.clone(), move |raw, _ctx| {
            let result = E::from_str(&raw).ok_or_else(|| UserError::NotInChoices {
                name: label.clone(),
                choices: E::VARIANTS.join(","),
            });
            async move { result }
        })
    }
}

impl ArgType<i64> {
    /// Integer bounded in magnitude by the configured
    /// [`integer_bound`](crate::config::BotConfig::integer_bound).
    pub fn integer(name: impl Into<String>) -> Self {
        ArgType::custom(name, "integer", INTEGER.clone(), |raw, ctx| {
            let result = parse_integer(&raw, ctx.config().integer_bound);
            async move { result }
        })
    }

    /// Integer bounded by `bound` in magnitude.
    pub fn integer_bounded(name: impl Into<String>, bound: i64) -> Self {
        ArgType::custom(name, "integer", INTEGER.clone(), move |raw, _ctx| {
            let result = parse_integer(&raw, bound);
            async move { result }
        })
    }

    /// Integer in `[from, to)`.
    pub fn range(name: impl Into<String>, from: i64, to: i64) -> Self {
        let name = name.into();
        let label = name.clone();
        ArgType::custom(name, "integer", INTEGER.clone(), move |raw, _ctx| {
            let out_of_bounds = || UserError::OutOfBounds {
                name: label.clone(),
                from: from.to_string(),
                to: to.to_string(),
            };
            let result = match raw.parse::<i64>() {
                Ok(n) if (from..to).contains(&n) => Ok(n),
                _ => Err(out_of_bounds()),
            };
            async move { result }
        })
    }
}

impl ArgType<f64> {
    /// Decimal number bounded by [`FLOAT_BOUND`] in magnitude.
    pub fn float(name: impl Into<String>) -> Self {
        ArgType::custom(name, "float", FLOAT.clone(), |raw, _ctx| {
            let result = match raw.parse::<f64>() {
                Ok(n) if n.abs() <= FLOAT_BOUND => Ok(n),
                _ => Err(UserError::TooLarge {
                    bound: "10^20".to_string(),
                }),
            };
            async move { result }
        })
    }

    /// Decimal number in `[from, to)`.
    pub fn float_range(name: impl Into<String>, from: f64, to: f64) -> Self {
        let name = name.into();
        let label = name.clone();
        ArgType::custom(name, "float", FLOAT.clone(), move |raw, _ctx| {
            let result = match raw.parse::<f64>() {
                Ok(n) if n >= from && n < to => Ok(n),
                _ => Err(UserError::OutOfBounds {
                    name: label.clone(),
                    from: from.to_string(),
                    to: to.to_string(),
                }),
            };
            async move { result }
        })
    }
}

impl ArgType<Channel> {
    /// Channel by `<#id>` mention or bare id.
    pub fn channel(name: impl Into<String>) -> Self {
        let name = name.into();
        let label = name.clone();
        ArgType::custom(name, "channel", CHANNEL.clone(), move |raw, ctx| {
            let label = label.clone();
            async move {
                let guild = ctx.guild_id()?;
                let id = snowflake(&raw, EntityKind::Channel, &label)?;
                ctx.directory()
                    .channel(guild, id)
                    .await
                    .map_err(|e| lookup_error(EntityKind::Channel, &label, e))
            }
        })
    }

    /// Channel by fuzzy name among the guild's cached channels.
    pub fn channel_name(name: impl Into<String>) -> Self {
        let name = name.into();
        let label = name.clone();
        ArgType::custom(name, "channel", ANY.clone(), move |raw, ctx| {
            let result = ctx.guild_id().and_then(|guild| {
                let candidates = ctx.directory().cached_channels(guild);
                let matches = find_like(&raw, candidates, |channel| channel.name.as_str());
                single(matches, EntityKind::Channel, &label, &raw)
            });
            async move { result }
        })
    }
}

impl ArgType<Member> {
    /// Guild member by `<@id>` / `<@!id>` mention or bare id.
    pub fn mention(name: impl Into<String>) -> Self {
        let name = name.into();
        let label = name.clone();
        ArgType::custom(name, "mention", MENTION.clone(), move |raw, ctx| {
            let label = label.clone();
            async move {
                let guild = ctx.guild_id()?;
                let id = snowflake(&raw, EntityKind::Member, &label)?;
                ctx.directory()
                    .member(guild, id)
                    .await
                    .map_err(|e| lookup_error(EntityKind::Member, &label, e))
            }
        })
    }
}

impl ArgType<User> {
    /// User by fuzzy tag among cached users.
    pub fn username(name: impl Into<String>) -> Self {
        let name = name.into();
        let label = name.clone();
        ArgType::custom(name, "username", ANY.clone(), move |raw, ctx| {
            let candidates = ctx.directory().cached_users();
            let matches = find_like(&raw, candidates, |user| user.tag.as_str());
            let result = single(matches, EntityKind::User, &label, &raw);
            async move { result }
        })
    }
}

impl ArgType<Role> {
    /// Role by `<@&id>` mention or bare id.
    pub fn role(name: impl Into<String>) -> Self {
        let name = name.into();
        let label = name.clone();
        ArgType::custom(name, "role", ROLE.clone(), move |raw, ctx| {
            let label = label.clone();
            async move {
                let guild = ctx.guild_id()?;
                let id = snowflake(&raw, EntityKind::Role, &label)?;
                ctx.directory()
                    .role(guild, id)
                    .await
                    .map_err(|e| lookup_error(EntityKind::Role, &label, e))
            }
        })
    }

    /// Role by fuzzy name among the guild's cached roles.
    pub fn role_name(name: impl Into<String>) -> Self {
        let name = name.into();
        let label = name.clone();
        ArgType::custom(name, "role", ANY.clone(), move |raw, ctx| {
            let result = ctx.guild_id().and_then(|guild| {
                let candidates = ctx.directory().cached_roles(guild);
                let matches = find_like(&raw, candidates, |role| role.name.as_str());
                single(matches, EntityKind::Role, &label, &raw)
            });
            async move { result }
        })
    }
}
