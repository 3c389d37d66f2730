//! Bidirectional code ↔ label lookup for enumerated columns.

use std::collections::HashMap;

use crate::records::LabeledEnum;

/// Maps stable codes to display labels and resolves typed text back to a code.
///
/// Built once per column when a table schema is constructed, so filter
/// invocations never search option lists.
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    by_code: HashMap<&'static str, &'static str>,
    /// Lowercased label and code pairs, in declaration order.
    entries: Vec<(String, &'static str)>,
}

impl LabelTable {
    /// Build from `(code, label)` pairs.
    pub fn new(pairs: impl IntoIterator<Item = (&'static str, &'static str)>) -> Self {
        let mut table = Self::default();
        for (code, label) in pairs {
            table.by_code.insert(code, label);
            table.entries.push((label.to_lowercase(), code));
        }
        table
    }

    /// Build from every variant of a labeled enum.
    pub fn from_enum<E: LabeledEnum>() -> Self {
        Self::new(E::ALL.iter().map(|v| (v.code(), v.label())))
    }

    /// Display label for a code.
    pub fn label(&self, code: &str) -> Option<&'static str> {
        self.by_code.get(code).copied()
    }

    /// Resolve typed text to a code.
    ///
    /// Tries, case-insensitively: an exact label, an exact code, then a label
    /// prefix shared by exactly one option. Ambiguous or unknown text resolves
    /// to `None`.
    pub fn resolve(&self, text: &str) -> Option<&'static str> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        if let Some((_, code)) = self.entries.iter().find(|(label, _)| *label == needle) {
            return Some(*code);
        }
        if let Some(code) = self.by_code.keys().copied().find(|code| *code == needle) {
            return Some(code);
        }
        let mut prefixed = self
            .entries
            .iter()
            .filter(|(label, _)| label.starts_with(&needle));
        match (prefixed.next(), prefixed.next()) {
            (Some((_, code)), None) => Some(*code),
            _ => None,
        }
    }

    /// `(code, label)` pairs in declaration order.
    pub fn options(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.entries
            .iter()
            .filter_map(|(_, code)| self.label(code).map(|label| (*code, label)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
