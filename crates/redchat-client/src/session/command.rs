//! In-chat commands

use crate::input::EXIT_LINE;

const WHO_LINE: &str = "/who";

/// An input line, interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// `/exit`: leave the chat
    Exit,
    /// `/who`: list online identities
    Who,
    /// Anything else is a chat line
    Say(&'a str),
}

impl<'a> Command<'a> {
    /// Interpret a line. Commands match exactly; anything else, including
    /// unknown slash-prefixed text, is chat.
    #[must_use]
    pub fn parse(line: &'a str) -> Self {
        match line {
            EXIT_LINE => Self::Exit,
            WHO_LINE => Self::Who,
            text => Self::Say(text),
        }
    }
}
