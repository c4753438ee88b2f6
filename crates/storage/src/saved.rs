use std::sync::Arc;

use interview_core::model::{SavedInterviewRecord, SessionId, append_unique, contains_session};
use tokio::sync::Mutex;
use tracing::debug;

use crate::repository::{KeyValueStore, StorageError, read_json, write_json};

/// Key under which the saved-interview collection lives.
pub const SAVED_INTERVIEWS_KEY: &str = "savedInterviews";

/// Typed access to the collection of saved interviews, deduplicated by session id.
///
/// All read-modify-write cycles on one `SavedInterviews` (and its clones) are
/// serialized, so a check-then-append can never interleave with another.
/// Views over one backend should come from `Storage::saved_interviews` so they
/// share that lock.
#[derive(Clone)]
pub struct SavedInterviews {
    store: Arc<dyn KeyValueStore>,
    write_lock: Arc<Mutex<()>>,
}

impl SavedInterviews {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// All saved records, oldest first. An absent key is an empty collection.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read or holds malformed data.
    pub async fn list(&self) -> Result<Vec<SavedInterviewRecord>, StorageError> {
        Ok(read_json(self.store.as_ref(), SAVED_INTERVIEWS_KEY)
            .await?
            .unwrap_or_default())
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    pub async fn contains(&self, session_id: &SessionId) -> Result<bool, StorageError> {
        Ok(contains_session(&self.list().await?, session_id))
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    pub async fn get(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<SavedInterviewRecord>, StorageError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|record| &record.session_id == session_id))
    }

    /// Append `record` unless its session id is already stored.
    ///
    /// Returns `true` if the record was written, `false` if it was a duplicate.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the collection cannot be read or written back.
    pub async fn insert_unique(&self, record: SavedInterviewRecord) -> Result<bool, StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.list().await?;
        let session_id = record.session_id.clone();
        if !append_unique(&mut records, record) {
            debug!(session_id = %session_id, "interview already saved; skipping write");
            return Ok(false);
        }
        write_json(self.store.as_ref(), SAVED_INTERVIEWS_KEY, &records).await?;
        debug!(session_id = %session_id, total = records.len(), "saved interview recorded");
        Ok(true)
    }

    /// Delete the record for `session_id`. Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the collection cannot be read or written back.
    pub async fn remove(&self, session_id: &SessionId) -> Result<bool, StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.list().await?;
        let before = records.len();
        records.retain(|record| &record.session_id != session_id);
        if records.len() == before {
            return Ok(false);
        }
        write_json(self.store.as_ref(), SAVED_INTERVIEWS_KEY, &records).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryKeyValueStore, Storage};
    use async_trait::async_trait;
    use serde_json::Value;
    use interview_core::model::{AnswerStore, DEFAULT_JOB_ROLE, FeedbackReport};
    use interview_core::time::fixed_now;

    fn feedback(summary: &str) -> FeedbackReport {
        serde_json::from_value(serde_json::json!({
            "overallScore": 6,
            "summary": summary
        }))
        .unwrap()
    }

    fn record(id: &str, summary: &str) -> SavedInterviewRecord {
        let mut answers = AnswerStore::new();
        answers.set_answer(0, "my answer");
        SavedInterviewRecord {
            session_id: SessionId::new(id),
            questions: vec!["Why us?".into()],
            answers: answers.snapshot(),
            feedback: feedback(summary),
            completed_at: fixed_now(),
            duration: 30,
            company_name: "Acme".into(),
            job_description: "Build APIs".into(),
            job_role: DEFAULT_JOB_ROLE.into(),
            saved_to_profile: true,
        }
    }

    fn saved() -> SavedInterviews {
        SavedInterviews::new(Arc::new(InMemoryKeyValueStore::new()))
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        assert!(saved().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn saving_twice_keeps_one_record() {
        let saved = saved();
        assert!(saved.insert_unique(record("abc", "first")).await.unwrap());
        assert!(!saved.insert_unique(record("abc", "second")).await.unwrap());

        let records = saved.list().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].feedback.summary, "first");
    }

    #[tokio::test]
    async fn concurrent_saves_for_one_session_write_once() {
        let saved = saved();
        let (a, b) = tokio::join!(
            saved.insert_unique(record("race", "a")),
            saved.insert_unique(record("race", "b")),
        );
        assert_ne!(a.unwrap(), b.unwrap());
        assert_eq!(saved.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn remove_drops_only_matching_session() {
        let saved = saved();
        saved.insert_unique(record("a", "x")).await.unwrap();
        saved.insert_unique(record("b", "y")).await.unwrap();

        assert!(saved.remove(&SessionId::new("a")).await.unwrap());
        assert!(!saved.remove(&SessionId::new("a")).await.unwrap());
        assert!(!saved.contains(&SessionId::new("a")).await.unwrap());
        assert!(saved.get(&SessionId::new("b")).await.unwrap().is_some());
    }

    /// Yields on every read so two writers interleave between read and write.
    struct YieldingStore(InMemoryKeyValueStore);

    #[async_trait]
    impl KeyValueStore for YieldingStore {
        async fn read(&self, key: &str) -> Result<Option<Value>, StorageError> {
            tokio::task::yield_now().await;
            self.0.read(key).await
        }

        async fn write(&self, key: &str, value: Value) -> Result<(), StorageError> {
            self.0.write(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.0.remove(key).await
        }
    }

    #[tokio::test]
    async fn views_from_one_storage_share_the_write_lock() {
        let storage = Storage::new(Arc::new(YieldingStore(InMemoryKeyValueStore::new())));
        let first = storage.saved_interviews();
        let second = storage.clone().saved_interviews();

        let (a, b) = tokio::join!(
            first.insert_unique(record("shared", "first")),
            second.insert_unique(record("shared", "second")),
        );
        assert_ne!(a.unwrap(), b.unwrap());
        assert_eq!(storage.saved_interviews().list().await.unwrap().len(), 1);
    }
}
