//! Typed argument coercion.
//!
//! An [`ArgType`] is one named slot of a command signature. It validates raw
//! text against a pattern, then converts it asynchronously into a value of its
//! declared type. Slots can be optional, carry a default, consume a variable
//! number of tokens, and list alternatives tried against the same text.
//!
//! Built-in families (string, integer, range, choice, channel, ...) live in
//! [`families`]; tuples of slots are parsed together through [`ArgList`].
//!
//! # Example
//!
//! ```rust,ignore
//! let target = ArgType::channel("target")
//!     .or(ArgType::channel_name("target"))
//!     .optional();
//! let count = ArgType::range("count", 1, 100).default(10);
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{self, BoxFuture, join_all};
use regex::Regex;

use crate::context::Context;
use crate::error::UserError;

pub mod families;
pub mod list;

pub use families::{Choice, escape_markdown, find_like};
pub use list::ArgList;

/// Values an argument can produce.
pub trait ArgValue: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> ArgValue for T {}

/// Future returned by a coercion.
pub type CoerceFuture<T> = BoxFuture<'static, Result<T, UserError>>;

type Coerce<T> = Arc<dyn Fn(String, Context) -> CoerceFuture<T> + Send + Sync>;

/// Named, typed, validated argument slot.
///
/// Builder methods consume the value and return a new one, so a slot shared
/// between two commands has to be cloned explicitly.
pub struct ArgType<T> {
    name: String,
    kind: &'static str,
    pattern: Regex,
    coerce: Coerce<T>,
    fallback: Option<T>,
    width: i32,
    alternatives: Vec<ArgType<T>>,
}

impl<T: ArgValue> Clone for ArgType<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            kind: self.kind,
            pattern: self.pattern.clone(),
            coerce: Arc::clone(&self.coerce),
            fallback: self.fallback.clone(),
            width: self.width,
            alternatives: self.alternatives.clone(),
        }
    }
}

impl<T> fmt::Debug for ArgType<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgType")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("pattern", &self.pattern.as_str())
            .field("optional", &self.fallback.is_some())
            .field("width", &self.width)
            .field("alternatives", &self.alternatives.len())
            .finish()
    }
}

/// Usage rendering: `*<name>*` when required, `*(name)*` when optional.
impl<T> fmt::Display for ArgType<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fallback.is_some() {
            write!(f, "*({})*", self.name)
        } else {
            write!(f, "*<{}>*", self.name)
        }
    }
}

impl<T: ArgValue> ArgType<T> {
    /// Create a custom argument type.
    ///
    /// `kind` is a short label for the family (e.g. `"integer"`), `pattern` is
    /// checked against the raw text before `coerce` runs.
    pub fn custom<F, Fut>(name: impl Into<String>, kind: &'static str, pattern: Regex, coerce: F) -> Self
    where
        F: Fn(String, Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, UserError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            kind,
            pattern,
            coerce: Arc::new(move |raw, ctx| coerce(raw, ctx).boxed()),
            fallback: None,
            width: 1,
            alternatives: Vec::new(),
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Family label.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Validation pattern.
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// Token width (see [`extend`](Self::extend)).
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Whether empty input yields the default instead of failing.
    pub fn is_optional(&self) -> bool {
        self.fallback.is_some()
    }

    /// Value returned for empty input, if optional.
    pub fn fallback(&self) -> Option<&T> {
        self.fallback.as_ref()
    }

    /// Number of alternatives tried after this one.
    pub fn alternative_count(&self) -> usize {
        self.alternatives.len()
    }

    /// Make the argument optional: empty input yields `None`.
    pub fn optional(self) -> ArgType<Option<T>> {
        self.map(Some).default(None)
    }

    /// Set the default value; this also makes the argument optional.
    pub fn default(mut self, value: T) -> Self {
        self.fallback = Some(value);
        self
    }

    /// Set how many tokens this argument consumes.
    ///
    /// A positive width takes exactly that many tokens. Zero or a negative
    /// width takes everything left except `|width|` tokens reserved for the
    /// arguments declared after it.
    pub fn extend(mut self, width: i32) -> Self {
        self.width = width;
        self
    }

    /// Add an alternative tried against the same text when this one fails.
    ///
    /// Alternatives keep declaration order; the alternative's own alternatives
    /// are appended after it.
    pub fn or(mut self, mut alternative: ArgType<T>) -> Self {
        let nested = std::mem::take(&mut alternative.alternatives);
        self.alternatives.push(alternative);
        self.alternatives.extend(nested);
        self
    }

    /// Convert the produced value.
    ///
    /// Applies to the coercion, the default and every alternative, which lets
    /// arguments of different families be joined with [`or`](Self::or).
    pub fn map<U, F>(self, f: F) -> ArgType<U>
    where
        U: ArgValue,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        self.map_shared(Arc::new(f))
    }

    fn map_shared<U: ArgValue>(self, f: Arc<dyn Fn(T) -> U + Send + Sync>) -> ArgType<U> {
        let coerce = self.coerce;
        let convert = Arc::clone(&f);
        ArgType {
            name: self.name,
            kind: self.kind,
            pattern: self.pattern,
            coerce: Arc::new(move |raw, ctx| {
                let convert = Arc::clone(&convert);
                coerce(raw, ctx).map(move |result| result.map(|value| convert(value))).boxed()
            }),
            fallback: self.fallback.map(|value| f(value)),
            width: self.width,
            alternatives: self
                .alternatives
                .into_iter()
                .map(|alternative| alternative.map_shared(Arc::clone(&f)))
                .collect(),
        }
    }

    /// Parse raw text into a typed value.
    ///
    /// Empty text yields the default when optional and fails otherwise, without
    /// running any coercion. Non-empty text is tried against this argument and
    /// every alternative concurrently; the earliest declared success wins.
    /// When every branch fails, a single branch's error is returned as is and
    /// several are aggregated into [`UserError::NoAlternative`].
    pub async fn parse(&self, raw: &str, ctx: &Context) -> Result<T, UserError> {
        if raw.is_empty() {
            return self.fallback.clone().ok_or_else(|| UserError::MissingArgument {
                name: self.name.clone(),
            });
        }

        let branches = std::iter::once(self)
            .chain(&self.alternatives)
            .map(|branch| branch.attempt(raw, ctx));
        let results = join_all(branches).await;

        let mut failures = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(value) => return Ok(value),
                Err(e) => failures.push(e),
            }
        }

        match failures.len() {
            1 => Err(failures.remove(0)),
            _ => Err(UserError::NoAlternative(failures)),
        }
    }

    /// Run this branch alone: pattern check, then coercion.
    fn attempt(&self, raw: &str, ctx: &Context) -> CoerceFuture<T> {
        if !self.pattern.is_match(raw) {
            return future::ready(Err(UserError::WrongForm {
                name: self.name.clone(),
            }))
            .boxed();
        }
        (self.coerce)(raw.to_string(), ctx.clone())
    }
}
