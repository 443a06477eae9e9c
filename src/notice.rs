//! Structured reply notices.
//!
//! `Notice` is the structured alternative to a plain text reply: title, author
//! line, colour, body and timestamp. Error and success notices have fixed styling.

use chrono::{DateTime, Utc};

/// Colour of error notices.
pub const ERROR_COLOR: u32 = 0xff0000;

/// Colour of success notices.
pub const SUCCESS_COLOR: u32 = 0x00ff00;

/// Colour of help notices.
pub const HELP_COLOR: u32 = 150;

/// Structured reply with optional title, author line and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    /// Title line
    pub title: Option<String>,

    /// Author line shown above the title
    pub author: Option<String>,

    /// Side colour (RGB)
    pub color: u32,

    /// Body text
    pub body: String,

    /// Timestamp shown in the footer
    pub timestamp: Option<DateTime<Utc>>,
}

impl Notice {
    /// Create a plain notice with the given body and no decorations.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            title: None,
            author: None,
            color: 0,
            body: body.into(),
            timestamp: None,
        }
    }

    /// Error notice: red, author "Error!", bold body, timestamped now.
    pub fn error(message: &str) -> Self {
        Self::new(format!("**{}**", message))
            .with_author("Error!")
            .with_color(ERROR_COLOR)
            .with_timestamp(Utc::now())
    }

    /// Success notice: green, author "Success!", bold body, timestamped now.
    pub fn success(message: &str) -> Self {
        Self::new(format!("**{}**", message))
            .with_author("Success!")
            .with_color(SUCCESS_COLOR)
            .with_timestamp(Utc::now())
    }

    /// Builder method to set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builder method to set the author line.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Builder method to set the colour.
    pub fn with_color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    /// Builder method to set the timestamp.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}
