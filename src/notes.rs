//! Notes renderer: rebuild section structure from the free-text `notes` field.
//!
//! The model writes notes as plain lines using a small, closed set of section
//! labels (see [`crate::prompts::NOTES_SECTION_LABELS`]). This module turns
//! those lines back into typed blocks using only line-level cues.
//!
//! ## Grammar
//!
//! One pass, line by line, two states (`Normal`, `InSubstitutions`) and a
//! single pending buffer of substitution items. Each line is classified by
//! the first rule that matches:
//!
//! 1. blank → flush the pending list (if in list state), emit a spacer
//! 2. starts with `substitutions:` (any case) → flush, enter list state,
//!    emit the header, queue pipe-separated items from the rest of the line
//! 3. ends with `:` → flush, leave list state, emit the line as a header
//! 4. in list state → queue the line's pipe-separated items
//! 5. otherwise → paragraph
//!
//! The pending buffer is also flushed at end of input. A blank line does not
//! leave list state; only a header does.

use crate::prompts::SUBSTITUTIONS_LABEL;
use serde::{Deserialize, Serialize};

/// One "Ingredient: description" bullet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    pub ingredient: String,
    pub description: String,
}

impl Substitution {
    /// Split a raw item on its first colon.
    ///
    /// With no colon the whole item is the ingredient and the description
    /// is empty.
    pub fn from_raw(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((ingredient, description)) => Self {
                ingredient: ingredient.trim().to_string(),
                description: description.trim().to_string(),
            },
            None => Self {
                ingredient: raw.trim().to_string(),
                description: String::new(),
            },
        }
    }
}

/// A typed block of rendered notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NoteBlock {
    SectionHeader { text: String },
    Paragraph { text: String },
    BlankSpacer,
    SubstitutionList { items: Vec<Substitution> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    InSubstitutions,
}

struct Segmenter {
    state: State,
    pending: Vec<String>,
    blocks: Vec<NoteBlock>,
}

impl Segmenter {
    fn new() -> Self {
        Self {
            state: State::Normal,
            pending: Vec::new(),
            blocks: Vec::new(),
        }
    }

    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let items = self
            .pending
            .drain(..)
            .map(|raw| Substitution::from_raw(&raw))
            .collect();
        self.blocks.push(NoteBlock::SubstitutionList { items });
    }

    fn queue_items(&mut self, text: &str) {
        self.pending.extend(
            text.split('|')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        );
    }

    fn line(&mut self, line: &str) {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            if self.state == State::InSubstitutions {
                self.flush();
            }
            self.blocks.push(NoteBlock::BlankSpacer);
            return;
        }

        if let Some(rest) = strip_substitutions_label(trimmed) {
            self.flush();
            self.state = State::InSubstitutions;
            self.blocks.push(NoteBlock::SectionHeader {
                text: SUBSTITUTIONS_LABEL.to_string(),
            });
            self.queue_items(rest);
            return;
        }

        if trimmed.ends_with(':') {
            self.flush();
            self.state = State::Normal;
            self.blocks.push(NoteBlock::SectionHeader {
                text: line.to_string(),
            });
            return;
        }

        if self.state == State::InSubstitutions {
            self.queue_items(trimmed);
            return;
        }

        self.blocks.push(NoteBlock::Paragraph {
            text: line.to_string(),
        });
    }

    fn finish(mut self) -> Vec<NoteBlock> {
        self.flush();
        self.blocks
    }
}

/// If `trimmed` starts with the substitutions label (any case), return the
/// text after it.
fn strip_substitutions_label(trimmed: &str) -> Option<&str> {
    let label_len = SUBSTITUTIONS_LABEL.len();
    let prefix = trimmed.get(..label_len)?;
    if prefix.eq_ignore_ascii_case(SUBSTITUTIONS_LABEL) {
        Some(&trimmed[label_len..])
    } else {
        None
    }
}

/// Segment a notes string into typed blocks.
pub fn parse_notes(notes: &str) -> Vec<NoteBlock> {
    let mut segmenter = Segmenter::new();
    for line in notes.lines() {
        segmenter.line(line);
    }
    segmenter.finish()
}

/// Render blocks as Markdown-flavoured text for terminal or page display.
///
/// Headers become bold label lines, spacers become empty lines and
/// substitution lists become `- Ingredient: description` bullets.
pub fn render_blocks(blocks: &[NoteBlock]) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(blocks.len());
    for block in blocks {
        match block {
            NoteBlock::SectionHeader { text } => lines.push(format!("**{}**", text.trim())),
            NoteBlock::Paragraph { text } => lines.push(text.clone()),
            NoteBlock::BlankSpacer => lines.push(String::new()),
            NoteBlock::SubstitutionList { items } => {
                for item in items {
                    if item.description.is_empty() {
                        lines.push(format!("- {}", item.ingredient));
                    } else {
                        lines.push(format!("- {}: {}", item.ingredient, item.description));
                    }
                }
            }
        }
    }
    lines.join("\n")
}

/// Parse and render in one step.
pub fn render_notes(notes: &str) -> String {
    render_blocks(&parse_notes(notes))
}
