//! The clarification sub-flow entered on ambiguous answers.

/// One span of input that matched several values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contested {
    /// The input text, verbatim.
    pub text: String,
    /// Names of the competing values, in declaration order.
    pub candidates: Vec<String>,
}

/// Transient state while the user picks among candidates.
///
/// Contested spans are asked about one at a time. Values resolved without
/// conflict and words nobody matched are carried along so the final commit
/// includes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClarificationContext {
    current: Contested,
    pending: Vec<Contested>,
    resolved: Vec<String>,
    unmatched: Vec<String>,
}

/// What remains after one contested span is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Another span still needs an answer.
    More(ClarificationContext),
    /// Every span is resolved.
    Done {
        /// All resolved value names, in resolution order.
        resolved: Vec<String>,
        /// Words nobody matched.
        unmatched: Vec<String>,
    },
}

impl ClarificationContext {
    /// Creates a context; `None` when nothing is contested.
    #[must_use]
    pub fn new(
        resolved: Vec<String>,
        contested: Vec<Contested>,
        unmatched: Vec<String>,
    ) -> Option<Self> {
        let mut contested = contested.into_iter();
        let current = contested.next()?;
        Some(Self {
            current,
            pending: contested.collect(),
            resolved,
            unmatched,
        })
    }

    /// The span being asked about.
    #[must_use]
    pub fn current(&self) -> &Contested {
        &self.current
    }

    /// Values already settled.
    #[must_use]
    pub fn resolved(&self) -> &[String] {
        &self.resolved
    }

    /// Words nobody matched.
    #[must_use]
    pub fn unmatched(&self) -> &[String] {
        &self.unmatched
    }

    /// Records the user's pick for the current span.
    #[must_use]
    pub fn resolve(mut self, choice: String) -> Resolution {
        if !self.resolved.contains(&choice) {
            self.resolved.push(choice);
        }
        if self.pending.is_empty() {
            Resolution::Done {
                resolved: self.resolved,
                unmatched: self.unmatched,
            }
        } else {
            self.current = self.pending.remove(0);
            Resolution::More(self)
        }
    }
}
