use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Free-text answers keyed by zero-based question index.
///
/// Last write per index wins. Nothing here is persisted; answers leave the
/// store only as an [`AnswerSnapshot`] when the session is completed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerStore {
    answers: BTreeMap<usize, String>,
}

impl AnswerStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_answer(&mut self, index: usize, text: impl Into<String>) {
        self.answers.insert(index, text.into());
    }

    /// Stored text for `index`, or `""` when nothing was written.
    #[must_use]
    pub fn answer(&self, index: usize) -> &str {
        self.answers.get(&index).map_or("", String::as_str)
    }

    /// Number of indices whose trimmed text is non-empty.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers
            .values()
            .filter(|text| !text.trim().is_empty())
            .count()
    }

    /// Freeze the non-blank answers for submission.
    #[must_use]
    pub fn snapshot(&self) -> AnswerSnapshot {
        AnswerSnapshot(
            self.answers
                .iter()
                .filter(|(_, text)| !text.trim().is_empty())
                .map(|(index, text)| (*index, text.clone()))
                .collect(),
        )
    }
}

/// Immutable copy of the answers submitted at completion.
///
/// Serializes as a JSON object keyed by the stringified index
/// (`{"0": "...", "2": "..."}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSnapshot(BTreeMap<usize, String>);

impl AnswerSnapshot {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(&index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.0.iter().map(|(index, text)| (*index, text.as_str()))
    }

    /// Answers aligned to `question_count` slots, with `""` for gaps.
    #[must_use]
    pub fn aligned(&self, question_count: usize) -> Vec<String> {
        (0..question_count)
            .map(|index| self.get(index).unwrap_or_default().to_owned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins() {
        let mut store = AnswerStore::new();
        store.set_answer(0, "first");
        store.set_answer(0, "second");
        assert_eq!(store.answer(0), "second");
        assert_eq!(store.answered_count(), 1);
    }

    #[test]
    fn missing_answer_is_empty() {
        let store = AnswerStore::new();
        assert_eq!(store.answer(7), "");
        assert_eq!(store.answered_count(), 0);
    }

    #[test]
    fn whitespace_does_not_count_as_answered() {
        let mut store = AnswerStore::new();
        store.set_answer(0, "   ");
        store.set_answer(1, "\n\t");
        store.set_answer(2, " real answer ");
        assert_eq!(store.answered_count(), 1);

        store.set_answer(2, "  ");
        assert_eq!(store.answered_count(), 0);
    }

    #[test]
    fn snapshot_keeps_only_non_blank_answers() {
        let mut store = AnswerStore::new();
        store.set_answer(0, "a");
        store.set_answer(1, " ");
        store.set_answer(2, "c");
        store.set_answer(4, "e");

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.get(1), None);
        assert_eq!(
            snapshot.aligned(5),
            vec!["a", "", "c", "", "e"]
        );
    }

    #[test]
    fn snapshot_serializes_with_string_keys() {
        let mut store = AnswerStore::new();
        store.set_answer(0, "zero");
        store.set_answer(2, "two");

        let json = serde_json::to_value(store.snapshot()).unwrap();
        assert_eq!(json, serde_json::json!({"0": "zero", "2": "two"}));
    }
}
