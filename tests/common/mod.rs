#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use secrecy::SecretString;
use tokio::sync::RwLock;

use study_mentor::{
    config::Config,
    errors::{AppError, AppResult},
    models::{
        domain::{ChatMessage, ChatThread, CorrectAnswer, ExamRecord, FeedbackRecord, QuestionKind},
        dto::api::{ExamSetting, GeneratedQuestion, GradeResponseItem, GradingRequest, SubmittedAnswer},
    },
    repositories::{ChatRepository, ExamRepository, FeedbackRepository},
    services::{
        backend_client::{ExamBackend, UploadFile},
        blob_store::BlobStore,
    },
};

pub const TEST_SECRET: &str = "integration_test_secret_key_0123456789";

pub fn test_config(snapshot_path: &str) -> Config {
    Config {
        api_base_url: "http://127.0.0.1:8000".to_string(),
        blob_base_url: "http://127.0.0.1:9199/bucket".to_string(),
        mongo_conn_string: "mongodb://localhost:27017".to_string(),
        mongo_db_name: "study-mentor-test".to_string(),
        exams_collection: "exams".to_string(),
        feedbacks_collection: "feedbacks".to_string(),
        chats_collection: "chats".to_string(),
        snapshot_path: snapshot_path.to_string(),
        web_server_host: "127.0.0.1".to_string(),
        web_server_port: 8080,
        auth_jwt_secret: SecretString::from(TEST_SECRET.to_string()),
        max_upload_bytes: 1024,
        history_page_size: 15,
    }
}

#[derive(Default)]
pub struct InMemoryExamRepository {
    records: RwLock<HashMap<(String, String), ExamRecord>>,
    pub fail_deletes: AtomicBool,
}

impl InMemoryExamRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, record: ExamRecord) {
        let key = (record.user_id.clone(), record.id.clone());
        self.records.write().await.insert(key, record);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl ExamRepository for InMemoryExamRepository {
    async fn find_by_id(&self, user_id: &str, id: &str) -> AppResult<Option<ExamRecord>> {
        let records = self.records.read().await;
        Ok(records.get(&(user_id.to_string(), id.to_string())).cloned())
    }

    async fn list_by_user(&self, user_id: &str) -> AppResult<Vec<ExamRecord>> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn upsert(&self, record: ExamRecord) -> AppResult<ExamRecord> {
        self.insert(record.clone()).await;
        Ok(record)
    }

    async fn delete(&self, user_id: &str, id: &str) -> AppResult<bool> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError("exams partition unavailable".to_string()));
        }
        let mut records = self.records.write().await;
        Ok(records.remove(&(user_id.to_string(), id.to_string())).is_some())
    }
}

#[derive(Default)]
pub struct InMemoryFeedbackRepository {
    records: RwLock<HashMap<(String, String), FeedbackRecord>>,
    pub fail_deletes: AtomicBool,
}

impl InMemoryFeedbackRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, user_id: &str, id: &str) -> Option<FeedbackRecord> {
        let records = self.records.read().await;
        records.get(&(user_id.to_string(), id.to_string())).cloned()
    }
}

#[async_trait]
impl FeedbackRepository for InMemoryFeedbackRepository {
    async fn upsert(&self, record: FeedbackRecord) -> AppResult<FeedbackRecord> {
        let key = (record.user_id.clone(), record.id.clone());
        self.records.write().await.insert(key, record.clone());
        Ok(record)
    }

    async fn delete(&self, user_id: &str, id: &str) -> AppResult<bool> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError("feedbacks partition unavailable".to_string()));
        }
        let mut records = self.records.write().await;
        Ok(records.remove(&(user_id.to_string(), id.to_string())).is_some())
    }
}

#[derive(Default)]
pub struct InMemoryChatRepository {
    threads: RwLock<Vec<ChatThread>>,
}

impl InMemoryChatRepository {
    pub fn with_thread(id: &str, email: &str) -> Self {
        Self {
            threads: RwLock::new(vec![ChatThread {
                id: id.to_string(),
                email: email.to_string(),
                messages: Vec::new(),
            }]),
        }
    }

    pub async fn messages(&self, id: &str) -> Vec<ChatMessage> {
        let threads = self.threads.read().await;
        threads
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.messages.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatRepository for InMemoryChatRepository {
    async fn find_thread_id_by_email(&self, email: &str) -> AppResult<Option<String>> {
        let threads = self.threads.read().await;
        Ok(threads.iter().find(|t| t.email == email).map(|t| t.id.clone()))
    }

    async fn append_message(&self, thread_id: &str, message: ChatMessage) -> AppResult<bool> {
        let mut threads = self.threads.write().await;
        match threads.iter_mut().find(|t| t.id == thread_id) {
            Some(thread) => {
                thread.messages.push(message);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Generates a fixed exam and grades by comparing against the correct answers.
#[derive(Default)]
pub struct FakeExamBackend {
    pub generate_calls: AtomicUsize,
    pub grade_calls: AtomicUsize,
    pub fail_grading: AtomicBool,
}

impl FakeExamBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

pub fn generated_questions() -> Vec<GeneratedQuestion> {
    vec![
        GeneratedQuestion {
            case: QuestionKind::Choice,
            question: "Which organelle produces most of the cell's ATP?".to_string(),
            choices: Some(vec![
                "1. Nucleus".to_string(),
                "2. Mitochondria".to_string(),
                "3. Ribosome".to_string(),
                "4. Golgi apparatus".to_string(),
            ]),
            correct_answer: CorrectAnswer::Ordinal(2),
            explanation: Some("Mitochondria host oxidative phosphorylation.".to_string()),
            intent: Some("Organelle functions".to_string()),
        },
        GeneratedQuestion {
            case: QuestionKind::FreeText,
            question: "Name the green pigment that absorbs light in plants.".to_string(),
            choices: None,
            correct_answer: CorrectAnswer::Text("Chlorophyll".to_string()),
            explanation: Some("Chlorophyll absorbs red and blue light.".to_string()),
            intent: None,
        },
        GeneratedQuestion {
            case: QuestionKind::Choice,
            question: "Which molecule carries amino acids to the ribosome?".to_string(),
            choices: Some(vec![
                "1. mRNA".to_string(),
                "2. tRNA".to_string(),
                "3. rRNA".to_string(),
            ]),
            correct_answer: CorrectAnswer::Ordinal(2),
            explanation: None,
            intent: Some("Translation".to_string()),
        },
    ]
}

#[async_trait]
impl ExamBackend for FakeExamBackend {
    async fn generate_exam(
        &self,
        _file: &UploadFile,
        _setting: &ExamSetting,
        bearer: &str,
    ) -> AppResult<Vec<GeneratedQuestion>> {
        if bearer.is_empty() {
            return Err(AppError::Transport("401 from generation service".to_string()));
        }
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        Ok(generated_questions())
    }

    async fn grade_exam(
        &self,
        request: &GradingRequest,
        _bearer: &str,
    ) -> AppResult<Vec<GradeResponseItem>> {
        self.grade_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_grading.load(Ordering::SeqCst) {
            return Err(AppError::Transport("grading service unreachable".to_string()));
        }

        Ok(request
            .results
            .iter()
            .map(|item| {
                let is_correct = match (&item.correct_answer, &item.user_answer) {
                    (CorrectAnswer::Ordinal(c), SubmittedAnswer::Ordinal(u)) => c == u,
                    (CorrectAnswer::Text(c), SubmittedAnswer::Text(u)) => {
                        c.trim().eq_ignore_ascii_case(u.trim())
                    }
                    _ => false,
                };
                GradeResponseItem {
                    index: item.index,
                    is_correct,
                    feedback: Some(format!("Review: {}", item.question)),
                }
            })
            .collect())
    }
}

#[derive(Default)]
pub struct FakeBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl FakeBlobStore {
    pub async fn put(&self, path: &str, bytes: Vec<u8>) {
        self.blobs.write().await.insert(path.to_string(), bytes);
    }

    pub async fn contains(&self, path: &str) -> bool {
        self.blobs.read().await.contains_key(path)
    }
}

#[async_trait]
impl BlobStore for FakeBlobStore {
    async fn download(&self, path: &str, _bearer: &str) -> AppResult<Option<Vec<u8>>> {
        Ok(self.blobs.read().await.get(path).cloned())
    }

    async fn delete(&self, path: &str, _bearer: &str) -> AppResult<()> {
        self.blobs.write().await.remove(path);
        Ok(())
    }
}
