//! Recently used commit messages.
//!
//! Owned by whoever drives the commit prompt; there is no shared list.

use std::collections::VecDeque;
use std::path::PathBuf;

pub const DEFAULT_CAPACITY: usize = 10;
const TEASER_LEN: usize = 25;
const COMMENT_PREFIX: &str = ":";

#[derive(Debug, Clone)]
pub struct RecentMessages {
    messages: VecDeque<String>,
    capacity: usize,
}

impl RecentMessages {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Most recent first.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(String::as_str)
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.messages.get(idx).map(String::as_str)
    }

    /// Remembers a message that was used for a commit.
    ///
    /// Blank messages and ones already in the list are ignored.
    pub fn record(&mut self, message: &str) -> bool {
        if self.capacity == 0 || message.trim().is_empty() {
            return false;
        }
        if self.messages.iter().any(|m| m == message) {
            return false;
        }
        self.messages.push_front(message.to_string());
        self.messages.truncate(self.capacity);
        true
    }

    /// Short previews for a chooser, same order as `messages`.
    pub fn teasers(&self) -> Vec<String> {
        self.messages.iter().map(|m| teaser(m)).collect()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl Default for RecentMessages {
    fn default() -> Self {
        Self::new()
    }
}

fn teaser(message: &str) -> String {
    if message.chars().count() <= TEASER_LEN {
        return message.to_string();
    }
    let mut out: String = message.chars().take(TEASER_LEN).collect();
    out.push_str("...");
    out
}

fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with(COMMENT_PREFIX)
}

/// Seed text for the commit prompt: a comment header listing the files being
/// committed, then room for the message.
pub fn default_message(files: &[PathBuf]) -> String {
    let rule = format!("{} {}", COMMENT_PREFIX, "-".repeat(40));
    let mut lines = vec![
        rule.clone(),
        format!(
            "{} Lines beginning with `{}' are removed automatically",
            COMMENT_PREFIX, COMMENT_PREFIX
        ),
        format!("{} Modified Files:", COMMENT_PREFIX),
    ];
    for file in files {
        lines.push(format!("{}\t{}", COMMENT_PREFIX, file.display()));
    }
    lines.push(rule);
    lines.push(String::new());
    lines.push(String::new());
    lines.join("\n")
}

/// The message as entered, without comment lines.
pub fn message_body(text: &str) -> String {
    text.trim()
        .replace("\r\n", "\n")
        .split('\n')
        .filter(|line| !is_comment(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Replaces the message part of `text`, keeping its comment header.
pub fn replace_body(text: &str, message: &str) -> String {
    let normalized = text.trim().replace("\r\n", "\n");
    let header: Vec<&str> = normalized
        .split('\n')
        .filter(|line| line.trim().starts_with(COMMENT_PREFIX))
        .collect();
    format!("{}\n{}", header.join("\n"), message)
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/commit_history.rs"]
mod tests;
