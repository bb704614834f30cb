//! Incremental parser separating a model's delimited reasoning sub-stream
//! from the visible answer.
//!
//! States move one way: `pending → {in_think → visible, visible}`. Once
//! visible, a later opening marker is ordinary answer text. Each fragment is
//! inspected on its own, so a marker split across a fragment boundary is not
//! detected — matching the upstream emitters, which send markers whole.

const OPEN_MARKER: &str = "<think>";
const CLOSE_MARKER: &str = "</think>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThinkState {
    Pending,
    InThink,
    Visible,
}

#[derive(Debug)]
pub struct ThinkParser {
    state: ThinkState,
    reasoning: String,
    answer: String,
}

impl Default for ThinkParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ThinkParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ThinkState::Pending,
            reasoning: String::new(),
            answer: String::new(),
        }
    }

    /// Feed one fragment; returns the text that became visible from it.
    pub fn push(&mut self, fragment: &str) -> String {
        match self.state {
            ThinkState::Pending => {
                let trimmed = fragment.trim_start();
                if let Some(rest) = trimmed.strip_prefix(OPEN_MARKER) {
                    self.state = ThinkState::InThink;
                    self.consume_in_think(rest)
                } else {
                    self.state = ThinkState::Visible;
                    self.answer.push_str(fragment);
                    fragment.to_owned()
                }
            }
            ThinkState::InThink => self.consume_in_think(fragment),
            ThinkState::Visible => {
                self.answer.push_str(fragment);
                fragment.to_owned()
            }
        }
    }

    fn consume_in_think(&mut self, fragment: &str) -> String {
        if let Some(idx) = fragment.find(CLOSE_MARKER) {
            self.reasoning.push_str(&fragment[..idx]);
            self.state = ThinkState::Visible;
            let visible = &fragment[idx + CLOSE_MARKER.len()..];
            self.answer.push_str(visible);
            visible.to_owned()
        } else {
            self.reasoning.push_str(fragment);
            String::new()
        }
    }

    #[must_use]
    pub fn state(&self) -> ThinkState {
        self.state
    }

    /// Hidden reasoning accumulated so far.
    #[must_use]
    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }

    /// Visible answer accumulated so far.
    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }
}
