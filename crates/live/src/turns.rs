//! Turn buffering
//!
//! Transcript deltas stream in piecemeal for both sides of the exchange.
//! They accumulate here and commit as exactly one user entry and one model
//! entry when the server marks the turn complete, after which both buffers
//! are empty again.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Model,
}

/// One committed history entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub text: String,
}

/// Accumulates transcript deltas and commits them per turn
#[derive(Debug, Default)]
pub struct TurnBuffer {
    input: String,
    output: String,
    history: Vec<TranscriptEntry>,
}

impl TurnBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_input(&mut self, delta: &str) {
        self.input.push_str(delta);
    }

    pub fn push_output(&mut self, delta: &str) {
        self.output.push_str(delta);
    }

    /// Current partial user transcript
    pub fn partial_input(&self) -> &str {
        &self.input
    }

    /// Current partial model transcript
    pub fn partial_output(&self) -> &str {
        &self.output
    }

    /// Commit the buffered deltas as one user turn and one model turn.
    ///
    /// An empty side commits as empty text; the only no-op is both sides
    /// empty. Returns the committed pair, and leaves both buffers empty.
    pub fn commit(&mut self) -> Option<(TranscriptEntry, TranscriptEntry)> {
        let input = std::mem::take(&mut self.input);
        let output = std::mem::take(&mut self.output);
        let input = input.trim().to_string();
        let output = output.trim().to_string();

        if input.is_empty() && output.is_empty() {
            return None;
        }

        let user = TranscriptEntry { speaker: Speaker::User, text: input };
        let model = TranscriptEntry { speaker: Speaker::Model, text: output };
        self.history.push(user.clone());
        self.history.push(model.clone());
        Some((user, model))
    }

    pub fn history(&self) -> &[TranscriptEntry] {
        &self.history
    }

    /// Drop uncommitted deltas, keeping committed history
    pub fn clear_partials(&mut self) {
        self.input.clear();
        self.output.clear();
    }

    /// Drop partial deltas and history
    pub fn reset(&mut self) {
        self.clear_partials();
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deltas_concatenate_and_commit_as_one_pair() {
        let mut buffer = TurnBuffer::new();
        buffer.push_input("kya ");
        buffer.push_input("bhaav hai");
        buffer.push_output("Aaj ka ");
        buffer.push_output("bhaav 1400 hai");

        let (user, model) = buffer.commit().unwrap();
        assert_eq!(user.text, "kya bhaav hai");
        assert_eq!(model.text, "Aaj ka bhaav 1400 hai");
        assert_eq!(buffer.history().len(), 2);
        assert!(buffer.partial_input().is_empty());
        assert!(buffer.partial_output().is_empty());
    }

    #[test]
    fn one_sided_turn_commits_both_entries() {
        let mut buffer = TurnBuffer::new();
        buffer.push_output("Namaste!");
        let (user, model) = buffer.commit().unwrap();
        assert_eq!(user.text, "");
        assert_eq!(model.text, "Namaste!");
        assert_eq!(buffer.history().len(), 2);
    }

    #[test]
    fn both_empty_commit_is_noop() {
        let mut buffer = TurnBuffer::new();
        assert!(buffer.commit().is_none());
        assert!(buffer.history().is_empty());
    }

    #[test]
    fn successive_turns_append_in_order() {
        let mut buffer = TurnBuffer::new();
        buffer.push_input("first");
        buffer.commit().unwrap();
        buffer.push_input("second");
        buffer.commit().unwrap();

        let history = buffer.history();
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].text, "first");
        assert_eq!(history[2].text, "second");
        assert_eq!(history[1].speaker, Speaker::Model);
    }

    #[test]
    fn reset_clears_everything() {
        let mut buffer = TurnBuffer::new();
        buffer.push_input("partial");
        buffer.push_output("partial");
        buffer.commit().unwrap();
        buffer.push_input("dangling");
        buffer.reset();
        assert!(buffer.history().is_empty());
        assert!(buffer.partial_input().is_empty());
    }
}
