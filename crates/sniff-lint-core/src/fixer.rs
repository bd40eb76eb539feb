//! Transactional edits against a token stream.
//!
//! Rules never touch the stream they are reading. Edits are queued in a
//! [`Changeset`] and land in the [`Fixer`]'s per-token content table; the
//! engine renders that table to text and re-tokenizes between passes.

use crate::token::TokenStream;

/// A primitive edit addressed by stream index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Replace the token's text.
    Replace {
        /// Target index.
        index: usize,
        /// New text.
        text: String,
    },
    /// Insert text in front of the token.
    InsertBefore {
        /// Target index.
        index: usize,
        /// Inserted text.
        text: String,
    },
    /// Insert text behind the token.
    InsertAfter {
        /// Target index.
        index: usize,
        /// Inserted text.
        text: String,
    },
    /// Remove the token's text.
    Remove {
        /// Target index.
        index: usize,
    },
}

impl Edit {
    /// Stream index this edit targets.
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            Self::Replace { index, .. }
            | Self::InsertBefore { index, .. }
            | Self::InsertAfter { index, .. }
            | Self::Remove { index } => *index,
        }
    }
}

/// Ordered group of edits applied all-or-nothing.
///
/// Obtained from [`Fixer::begin_changeset`] and consumed by
/// [`Fixer::end_changeset`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use = "a changeset does nothing until passed to `end_changeset`"]
pub struct Changeset {
    edits: Vec<Edit>,
}

impl Changeset {
    /// Queues a replacement.
    pub fn replace(&mut self, index: usize, text: impl Into<String>) -> &mut Self {
        self.edits.push(Edit::Replace {
            index,
            text: text.into(),
        });
        self
    }

    /// Queues an insertion in front of a token.
    pub fn insert_before(&mut self, index: usize, text: impl Into<String>) -> &mut Self {
        self.edits.push(Edit::InsertBefore {
            index,
            text: text.into(),
        });
        self
    }

    /// Queues an insertion behind a token.
    pub fn insert_after(&mut self, index: usize, text: impl Into<String>) -> &mut Self {
        self.edits.push(Edit::InsertAfter {
            index,
            text: text.into(),
        });
        self
    }

    /// Queues a removal.
    pub fn remove(&mut self, index: usize) -> &mut Self {
        self.edits.push(Edit::Remove { index });
        self
    }

    /// Queued edits in order.
    #[must_use]
    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    /// Number of queued edits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Returns true if nothing was queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}

/// Reason a changeset was rejected. Never fatal to a run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChangesetConflict {
    /// The fixer runs in report-only mode.
    #[error("fixer is disabled")]
    Disabled,
    /// An edit targets an index outside the stream.
    #[error("edit targets index {index} outside the stream of {len} tokens")]
    OutOfBounds {
        /// Offending index.
        index: usize,
        /// Stream length.
        len: usize,
    },
    /// Two edits in the same changeset target the same index.
    #[error("two edits target index {index}")]
    Overlap {
        /// Offending index.
        index: usize,
    },
    /// An earlier changeset in this pass already edited the index.
    #[error("index {index} was already fixed in this pass")]
    AlreadyFixed {
        /// Offending index.
        index: usize,
    },
}

/// Per-pass fix session for one stream.
#[derive(Debug, Clone)]
pub struct Fixer {
    contents: Vec<String>,
    touched: Vec<bool>,
    enabled: bool,
    applied: usize,
    edits: usize,
    rejected: usize,
}

impl Fixer {
    /// Starts a session over `stream`. A disabled fixer rejects every
    /// changeset.
    #[must_use]
    pub fn new(stream: &TokenStream, enabled: bool) -> Self {
        Self {
            contents: stream.iter().map(|t| t.text.clone()).collect(),
            touched: vec![false; stream.len()],
            enabled,
            applied: 0,
            edits: 0,
            rejected: 0,
        }
    }

    /// Returns true if edits may be applied.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Opens an empty changeset.
    pub fn begin_changeset(&self) -> Changeset {
        Changeset::default()
    }

    /// Validates and applies a changeset.
    ///
    /// # Errors
    ///
    /// Returns the first conflict found; nothing is applied in that case.
    pub fn end_changeset(&mut self, changeset: Changeset) -> Result<usize, ChangesetConflict> {
        let result = self.validate(&changeset);
        if let Err(conflict) = &result {
            self.rejected += 1;
            tracing::debug!(%conflict, edits = changeset.len(), "changeset rejected");
            return Err(conflict.clone());
        }

        let mut edits = changeset.edits;
        edits.sort_by_key(|e| std::cmp::Reverse(e.index()));
        let count = edits.len();
        for edit in edits {
            let index = edit.index();
            match edit {
                Edit::Replace { text, .. } => self.contents[index] = text,
                Edit::InsertBefore { text, .. } => self.contents[index].insert_str(0, &text),
                Edit::InsertAfter { text, .. } => self.contents[index].push_str(&text),
                Edit::Remove { .. } => self.contents[index].clear(),
            }
            self.touched[index] = true;
        }
        if count > 0 {
            self.applied += 1;
            self.edits += count;
        }
        Ok(count)
    }

    fn validate(&self, changeset: &Changeset) -> Result<(), ChangesetConflict> {
        if !self.enabled {
            return Err(ChangesetConflict::Disabled);
        }
        let len = self.contents.len();
        let mut seen = Vec::with_capacity(changeset.len());
        for edit in &changeset.edits {
            let index = edit.index();
            if index >= len {
                return Err(ChangesetConflict::OutOfBounds { index, len });
            }
            if seen.contains(&index) {
                return Err(ChangesetConflict::Overlap { index });
            }
            if self.touched[index] {
                return Err(ChangesetConflict::AlreadyFixed { index });
            }
            seen.push(index);
        }
        Ok(())
    }

    /// Applies a single replacement as its own changeset.
    ///
    /// # Errors
    ///
    /// See [`Fixer::end_changeset`].
    pub fn replace_token(
        &mut self,
        index: usize,
        text: impl Into<String>,
    ) -> Result<usize, ChangesetConflict> {
        let mut changeset = self.begin_changeset();
        changeset.replace(index, text);
        self.end_changeset(changeset)
    }

    /// Current text at `index`, including edits applied this pass.
    #[must_use]
    pub fn current_content(&self, index: usize) -> Option<&str> {
        self.contents.get(index).map(String::as_str)
    }

    /// Number of changesets applied this pass.
    #[must_use]
    pub fn applied_count(&self) -> usize {
        self.applied
    }

    /// Number of primitive edits applied this pass.
    #[must_use]
    pub fn edit_count(&self) -> usize {
        self.edits
    }

    /// Number of changesets rejected this pass.
    #[must_use]
    pub fn rejected_count(&self) -> usize {
        self.rejected
    }

    /// Renders the edited source.
    #[must_use]
    pub fn render(&self) -> String {
        self.contents.concat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Token, TokenKind};

    fn stream() -> TokenStream {
        TokenStream::new(vec![
            Token::new(TokenKind::Variable, "$a", 1, 1),
            Token::new(TokenKind::Whitespace, "  ", 1, 3),
            Token::new(TokenKind::Operator, "=", 1, 5),
            Token::new(TokenKind::Whitespace, " ", 1, 6),
            Token::new(TokenKind::Number, "1", 1, 7),
            Token::new(TokenKind::Semicolon, ";", 1, 8),
        ])
    }

    #[test]
    fn applies_all_edit_kinds() {
        let mut fixer = Fixer::new(&stream(), true);
        let mut cs = fixer.begin_changeset();
        cs.replace(1, " ").insert_before(4, "(").insert_after(4, ")").remove(5);
        assert_eq!(
            fixer.end_changeset(cs),
            Err(ChangesetConflict::Overlap { index: 4 })
        );

        let mut cs = fixer.begin_changeset();
        cs.replace(1, " ").insert_before(4, "-").remove(5);
        assert_eq!(fixer.end_changeset(cs), Ok(3));
        assert_eq!(fixer.render(), "$a = -1");
        assert_eq!(fixer.applied_count(), 1);
        assert_eq!(fixer.edit_count(), 3);
    }

    #[test]
    fn rejected_changeset_leaves_text_untouched() {
        let mut fixer = Fixer::new(&stream(), true);
        let mut cs = fixer.begin_changeset();
        cs.replace(1, " ").replace(1, "");
        assert!(fixer.end_changeset(cs).is_err());
        assert_eq!(fixer.render(), "$a  = 1;");
        assert_eq!(fixer.applied_count(), 0);
        assert_eq!(fixer.rejected_count(), 1);
    }

    #[test]
    fn out_of_bounds_is_rejected() {
        let mut fixer = Fixer::new(&stream(), true);
        assert_eq!(
            fixer.replace_token(99, "x"),
            Err(ChangesetConflict::OutOfBounds { index: 99, len: 7 })
        );
    }

    #[test]
    fn second_edit_in_pass_is_rejected() {
        let mut fixer = Fixer::new(&stream(), true);
        assert_eq!(fixer.replace_token(1, " "), Ok(1));
        assert_eq!(
            fixer.replace_token(1, ""),
            Err(ChangesetConflict::AlreadyFixed { index: 1 })
        );
        assert_eq!(fixer.current_content(1), Some(" "));
    }

    #[test]
    fn disabled_fixer_rejects() {
        let mut fixer = Fixer::new(&stream(), false);
        assert_eq!(fixer.replace_token(1, " "), Err(ChangesetConflict::Disabled));
        assert_eq!(fixer.render(), "$a  = 1;");
    }

    #[test]
    fn empty_changeset_is_not_counted() {
        let mut fixer = Fixer::new(&stream(), true);
        let cs = fixer.begin_changeset();
        assert_eq!(fixer.end_changeset(cs), Ok(0));
        assert_eq!(fixer.applied_count(), 0);
    }
}
