use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Longest file name the save prompt accepts.
pub const MAX_PATH_LEN: usize = 63;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confirmation {
	Confirmed,
	Declined,
	QuitRequested,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextInput {
	Accepted(String),
	Cancelled,
	QuitRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notice {
	Acknowledged,
	QuitRequested,
}

/// Modal dialogs owned by the presentation layer.
///
/// Calls block until the user answers. Engines only branch on the returned
/// outcome and never look at how it was obtained.
pub trait Prompter {
	fn confirm(&mut self, message: &str) -> Confirmation;
	fn prompt_text(&mut self, label: &str, initial: &str, max_len: usize) -> TextInput;
	fn notify(&mut self, message: &str) -> Notice;
}

/// One canned answer for [`ScriptedPrompter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Answer {
	Confirm(Confirmation),
	Text(TextInput),
	Notice(Notice),
}

/// Answers prompts from a queue and records every message it was shown.
///
/// When the queue runs dry it declines confirmations, cancels text prompts
/// and acknowledges notices. An answer of the wrong kind is treated the same way.
#[derive(Debug, Default, Clone)]
pub struct ScriptedPrompter {
	answers: VecDeque<Answer>,
	pub seen: Vec<String>,
}

impl ScriptedPrompter {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_answers(answers: impl IntoIterator<Item = Answer>) -> Self {
		Self { answers: answers.into_iter().collect(), seen: Vec::new() }
	}

	pub fn push(&mut self, answer: Answer) {
		self.answers.push_back(answer);
	}

	pub fn remaining(&self) -> usize {
		self.answers.len()
	}

	pub fn saw(&self, needle: &str) -> bool {
		self.seen.iter().any(|m| m.contains(needle))
	}
}

impl Prompter for ScriptedPrompter {
	fn confirm(&mut self, message: &str) -> Confirmation {
		self.seen.push(message.to_string());
		match self.answers.pop_front() {
			Some(Answer::Confirm(c)) => c,
			_ => Confirmation::Declined,
		}
	}

	fn prompt_text(&mut self, label: &str, _initial: &str, max_len: usize) -> TextInput {
		self.seen.push(label.to_string());
		match self.answers.pop_front() {
			Some(Answer::Text(TextInput::Accepted(text))) => {
				TextInput::Accepted(text.chars().take(max_len).collect())
			}
			Some(Answer::Text(other)) => other,
			_ => TextInput::Cancelled,
		}
	}

	fn notify(&mut self, message: &str) -> Notice {
		self.seen.push(message.to_string());
		match self.answers.pop_front() {
			Some(Answer::Notice(n)) => n,
			_ => Notice::Acknowledged,
		}
	}
}
