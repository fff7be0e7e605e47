//! Plain terminal rendering of the chat page.

use std::fmt::Write as _;

use owo_colors::OwoColorize;
use scout_core::{Role, Turn};

/// Title shown at the top of the page.
pub const TITLE: &str = "🌐 Universal AI Agent";

/// Caption shown under the title.
pub const CAPTION: &str =
    "Blazing Fast Cloud AI • Real-time Web Search • Mobile Ready";

/// Placeholder of the input line.
pub const INPUT_HINT: &str = "Ask me anything...";

/// Status shown while the web search runs.
pub const SEARCHING_STATUS: &str = "🔍 Searching the web for the latest info...";

/// Status shown once the search is over and the model is answering.
pub const SYNTHESIZING_STATUS: &str = "Synthesizing answer...";

/// Glyph trailing an answer that is still streaming.
pub const CURSOR: char = '▌';

const BAR_CHAR: &str = "▎";
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
// Steps back onto the cursor glyph and clears to the end of the line, which
// also works when the glyph sits in the last column.
const ERASE_CURSOR: &str = "\x1b[1D\x1b[K";

/// Renders the title and caption.
pub fn banner() -> String {
    format!("{}\n{}\n", TITLE.bold(), CAPTION.bright_black())
}

/// Renders the label that opens a turn of `role`.
pub fn turn_prefix(role: Role) -> String {
    match role {
        Role::User => format!("{}🧑 ", BAR_CHAR.bright_green()),
        Role::Assistant => format!("{}🤖 ", BAR_CHAR.bright_cyan()),
    }
}

/// Renders one finished turn, followed by a blank line.
pub fn turn(turn: &Turn) -> String {
    let mut out = turn_prefix(turn.role());
    match turn.role() {
        Role::User => {
            let _ = write!(out, "{}", turn.content().bold());
        }
        Role::Assistant => out.push_str(turn.content()),
    }
    out.push_str("\n\n");
    out
}

/// Clears the screen and renders the whole page: banner, then every turn
/// top to bottom.
pub fn page(turns: &[Turn]) -> String {
    let mut out = String::from(CLEAR_SCREEN);
    out.push_str(&banner());
    out.push('\n');
    for t in turns {
        out.push_str(&turn(t));
    }
    out
}

/// Renders an inference failure shown inline under the answer.
pub fn inference_error(message: &str) -> String {
    format!("{}\n", format!("Groq Error: {message}").bright_red())
}

/// Paints a growing answer in place, keeping a [`CURSOR`] after the text
/// while the answer is incomplete.
///
/// Each call returns the bytes to write to the terminal. Since every
/// snapshot extends the previous one, only the new suffix is written.
#[derive(Debug, Default)]
pub struct AnswerPainter {
    painted: usize,
    cursor_shown: bool,
    finished: bool,
}

impl AnswerPainter {
    /// Returns the output that brings the screen from the previous
    /// snapshot to `answer`.
    pub fn paint(&mut self, answer: &str) -> String {
        let mut out = String::new();
        if self.finished {
            return out;
        }
        if self.cursor_shown {
            out.push_str(ERASE_CURSOR);
        }
        // Snapshots only grow, but never slice in the middle of a char.
        let suffix = answer.get(self.painted..).unwrap_or_default();
        out.push_str(suffix);
        out.push(CURSOR);
        self.painted = answer.len();
        self.cursor_shown = true;
        out
    }

    /// Returns the output that removes the cursor and ends the line.
    ///
    /// Later calls return nothing.
    pub fn finish(&mut self) -> String {
        if self.finished {
            return String::new();
        }
        self.finished = true;
        let mut out = String::new();
        if self.cursor_shown {
            out.push_str(ERASE_CURSOR);
        }
        out.push('\n');
        out
    }
}
