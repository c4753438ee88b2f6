use std::sync::Arc;

use interview_core::model::{AnswerStore, DEFAULT_JOB_ROLE, SavedInterviewRecord, SessionId};
use interview_core::time::fixed_now;
use storage::repository::{KeyValueStore, Storage};
use storage::sqlite::SqliteRepository;
use storage::{SAVED_INTERVIEWS_KEY, SavedInterviews};

fn build_record(id: &str, summary: &str) -> SavedInterviewRecord {
    let mut answers = AnswerStore::new();
    answers.set_answer(0, "I led the migration.");
    answers.set_answer(2, "Through code review.");
    SavedInterviewRecord {
        session_id: SessionId::new(id),
        questions: vec!["Q1".into(), "Q2".into(), "Q3".into()],
        answers: answers.snapshot(),
        feedback: serde_json::from_value(serde_json::json!({
            "overallScore": 8,
            "summary": summary,
            "strengths": ["Ownership"],
        }))
        .unwrap(),
        completed_at: fixed_now(),
        duration: 30,
        company_name: "Acme".into(),
        job_description: "Backend engineer".into(),
        job_role: DEFAULT_JOB_ROLE.into(),
        saved_to_profile: true,
    }
}

#[tokio::test]
async fn sqlite_kv_round_trips_and_overwrites() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    // migrations are idempotent
    repo.migrate().await.expect("migrate twice");

    assert_eq!(repo.read("missing").await.unwrap(), None);

    repo.write("k", serde_json::json!({"a": 1})).await.unwrap();
    repo.write("k", serde_json::json!({"a": 2})).await.unwrap();
    assert_eq!(
        repo.read("k").await.unwrap(),
        Some(serde_json::json!({"a": 2}))
    );

    repo.remove("k").await.unwrap();
    assert_eq!(repo.read("k").await.unwrap(), None);
}

#[tokio::test]
async fn sqlite_saved_interviews_dedup_by_session_id() {
    let storage = Storage::sqlite("sqlite:file:memdb_saved_dedup?mode=memory&cache=shared")
        .await
        .expect("storage");
    let saved = storage.saved_interviews();

    assert!(saved.insert_unique(build_record("abc", "original")).await.unwrap());
    assert!(!saved.insert_unique(build_record("abc", "newer")).await.unwrap());
    assert!(saved.insert_unique(build_record("def", "other")).await.unwrap());

    let records = saved.list().await.unwrap();
    assert_eq!(records.len(), 2);
    let abc = saved.get(&SessionId::new("abc")).await.unwrap().unwrap();
    assert_eq!(abc.feedback.summary, "original");
    assert_eq!(abc.answers.len(), 2);
}

#[tokio::test]
async fn records_written_by_one_handle_are_visible_to_another() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_saved_shared?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    let kv: Arc<dyn KeyValueStore> = Arc::new(repo.clone());

    SavedInterviews::new(Arc::clone(&kv))
        .insert_unique(build_record("abc", "x"))
        .await
        .unwrap();

    let raw = repo.read(SAVED_INTERVIEWS_KEY).await.unwrap().unwrap();
    assert_eq!(raw.as_array().map(Vec::len), Some(1));
    assert_eq!(raw[0]["sessionId"], "abc");
    assert!(SavedInterviews::new(kv).contains(&SessionId::new("abc")).await.unwrap());
}
