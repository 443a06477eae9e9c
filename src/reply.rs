//! Reply channel abstraction.
//!
//! The `ReplyChannel` trait is the outbound side of a request: commands answer
//! through it with plain text or structured notices.

use async_trait::async_trait;

use crate::error::ReplyError;
use crate::notice::Notice;

/// Platform-agnostic outbound channel.
#[async_trait]
pub trait ReplyChannel: Send + Sync {
    /// Send plain text.
    async fn send_text(&self, text: &str) -> Result<(), ReplyError>;

    /// Send a structured notice.
    ///
    /// Default implementation renders the notice as text with [`render_notice`].
    /// Override when the platform has a native rich format.
    async fn send_notice(&self, notice: &Notice) -> Result<(), ReplyError> {
        self.send_text(&render_notice(notice)).await
    }
}

/// Plain text rendering of a notice: author, title, body, one per line.
pub fn render_notice(notice: &Notice) -> String {
    let mut lines = Vec::new();
    if let Some(author) = &notice.author {
        lines.push(author.as_str());
    }
    if let Some(title) = &notice.title {
        lines.push(title.as_str());
    }
    lines.push(notice.body.as_str());
    lines.join("\n")
}
