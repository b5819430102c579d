use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Input kind of a form question. Classification happens before option
/// extraction: a native dropdown wins over toggle controls, mutually
/// exclusive toggles win over independent ones, everything else is free
/// text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Text,
    Select,
    Radio,
    Checkbox,
}

impl QuestionKind {
    /// Kinds whose answers must be a member of the allowed values.
    pub fn is_constrained(&self) -> bool {
        matches!(self, QuestionKind::Select | QuestionKind::Radio)
    }
}

/// One form field on the current step, as scraped from the live page.
///
/// Ephemeral: descriptors are produced per step and discarded once the step
/// is executed. `id` is only stable within the step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionDescriptor {
    /// Identifier local to the step (element id/name, or a synthesized
    /// positional id).
    pub id: String,

    /// Human-visible prompt text, preferring the bound label over raw
    /// attributes.
    pub prompt: String,

    pub kind: QuestionKind,

    /// Allowed values; empty for free text.
    #[serde(default)]
    pub options: Vec<String>,

    /// Whether the platform marks this question required.
    #[serde(default)]
    pub required: bool,

    /// CSS selector for the control, used by the step executor.
    pub selector: String,
}

impl QuestionDescriptor {
    /// Resolve an external answer against the allowed values: exact match
    /// first, then case-insensitive corrected to canonical casing. `None`
    /// when the value is not a member (or the question is unconstrained).
    pub fn canonical_option(&self, value: &str) -> Option<&str> {
        if let Some(exact) = self.options.iter().find(|o| o.as_str() == value) {
            return Some(exact);
        }
        self.options
            .iter()
            .find(|o| o.eq_ignore_ascii_case(value))
            .map(|o| o.as_str())
    }

    /// Platform-appropriate default for a constrained question.
    pub fn first_option(&self) -> Option<&str> {
        self.options.first().map(|o| o.as_str())
    }
}

/// Resolved answers for one step, keyed by question id. Insertion order is
/// preserved so answers are applied in the order questions appear on the
/// page.
pub type AnswerSet = IndexMap<String, String>;
