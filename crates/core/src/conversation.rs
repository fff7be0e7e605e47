//! Conversation-related types.

use std::fmt::{self, Display};

/// Who authored a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// The person typing queries.
    User,
    /// The model answering them.
    Assistant,
}

impl Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        })
    }
}

/// One role-tagged message in the visible log.
///
/// Turns are immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Turn {
    role: Role,
    content: String,
}

impl Turn {
    /// Creates a turn typed by the user.
    #[inline]
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates a turn answered by the model.
    #[inline]
    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Returns the author of this turn.
    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the text of this turn.
    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Represents a conversation: the chronological, append-only log of turns
/// for one session.
#[derive(Clone, Default, Debug)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    /// Appends a turn at the end of the log.
    #[inline]
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Returns all turns, oldest first.
    #[inline]
    pub fn all(&self) -> &[Turn] {
        &self.turns
    }

    /// Returns the number of turns.
    #[inline]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Returns `true` if nothing has been said yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
