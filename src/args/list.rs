//! Argument lists.
//!
//! A command's signature is a tuple of [`ArgType`]s. [`ArgList`] is implemented
//! for tuples of up to eight slots and turns the raw text allocated to each slot
//! into a tuple of typed values, parsing every slot concurrently.

use futures::future::BoxFuture;

use crate::args::{ArgType, ArgValue};
use crate::context::Context;
use crate::error::UserError;

/// Ordered signature of a command.
pub trait ArgList: Send + Sync + 'static {
    /// Typed tuple handed to the handler
    type Output: Send + 'static;

    /// Token width of each slot, in declaration order.
    fn widths(&self) -> Vec<i32>;

    /// Usage fragment of each slot, in declaration order.
    fn usage(&self) -> Vec<String>;

    /// Parse one raw string per slot.
    ///
    /// `raws` holds exactly one entry per slot. When several slots fail, the
    /// error of the earliest declared one is returned.
    fn parse_all<'a>(
        &'a self,
        raws: Vec<String>,
        ctx: &'a Context,
    ) -> BoxFuture<'a, Result<Self::Output, UserError>>;
}

impl ArgList for () {
    type Output = ();

    fn widths(&self) -> Vec<i32> {
        Vec::new()
    }

    fn usage(&self) -> Vec<String> {
        Vec::new()
    }

    fn parse_all<'a>(
        &'a self,
        _raws: Vec<String>,
        _ctx: &'a Context,
    ) -> BoxFuture<'a, Result<Self::Output, UserError>> {
        Box::pin(async { Ok(()) })
    }
}

impl<A: ArgValue> ArgList for (ArgType<A>,) {
    type Output = (A,);

    fn widths(&self) -> Vec<i32> {
        vec![self.0.width()]
    }

    fn usage(&self) -> Vec<String> {
        vec![self.0.to_string()]
    }

    fn parse_all<'a>(
        &'a self,
        raws: Vec<String>,
        ctx: &'a Context,
    ) -> BoxFuture<'a, Result<Self::Output, UserError>> {
        Box::pin(async move {
            let a = raws.into_iter().next().unwrap_or_default();
            Ok((self.0.parse(&a, ctx).await?,))
        })
    }
}

macro_rules! arg_list {
    ($($ty:ident $raw:ident $idx:tt),+) => {
        impl<$($ty: ArgValue),+> ArgList for ($(ArgType<$ty>,)+) {
            type Output = ($($ty,)+);

            fn widths(&self) -> Vec<i32> {
                vec![$(self.$idx.width()),+]
            }

            fn usage(&self) -> Vec<String> {
                vec![$(self.$idx.to_string()),+]
            }

            fn parse_all<'a>(
                &'a self,
                raws: Vec<String>,
                ctx: &'a Context,
            ) -> BoxFuture<'a, Result<Self::Output, UserError>> {
                Box::pin(async move {
                    let mut raws = raws.into_iter();
                    $(let $raw = raws.next().unwrap_or_default();)+
                    let ($($raw,)+) = futures::join!($(self.$idx.parse(&$raw, ctx)),+);
                    Ok(($($raw?,)+))
                })
            }
        }
    };
}

arg_list!(A a 0, B b 1);
arg_list!(A a 0, B b 1, C c 2);
arg_list!(A a 0, B b 1, C c 2, D d 3);
arg_list!(A a 0, B b 1, C c 2, D d 3, E e 4);
arg_list!(A a 0, B b 1, C c 2, D d 3, E e 4, F f 5);
arg_list!(A a 0, B b 1, C c 2, D d 3, E e 4, F f 5, G g 6);
arg_list!(A a 0, B b 1, C c 2, D d 3, E e 4, F f 5, G g 6, H h 7);

/// Token partition computed before any coercion runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// Raw text of each slot (taken tokens joined by single spaces)
    pub slots: Vec<String>,

    /// Tokens no slot consumed
    pub leftover: Vec<String>,
}

/// Partition `tokens` across slots of the given widths, left to right.
///
/// A positive width takes that many tokens from the front. A width `w <= 0`
/// takes `remaining + w` tokens, leaving `|w|` for later slots; `0` takes
/// everything left.
pub fn allocate(widths: &[i32], tokens: &[String]) -> Allocation {
    let mut remaining = tokens;
    let mut slots = Vec::with_capacity(widths.len());

    for &width in widths {
        let wanted = if width > 0 {
            width as usize
        } else {
            remaining.len().saturating_sub(width.unsigned_abs() as usize)
        };
        let (taken, rest) = remaining.split_at(wanted.min(remaining.len()));
        slots.push(taken.join(" "));
        remaining = rest;
    }

    Allocation {
        slots,
        leftover: remaining.to_vec(),
    }
}
