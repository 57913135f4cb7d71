use std::sync::Arc;

use crate::{
    auth::{JwtService, SessionContext},
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        ChatRepository, ExamRepository, FeedbackRepository, MongoChatRepository,
        MongoExamRepository, MongoFeedbackRepository,
    },
    services::{
        backend_client::{ExamBackend, HttpExamBackend},
        blob_store::{BlobStore, HttpBlobStore},
        chat_service::ChatService,
        exam_session_service::ExamSessionService,
        grading_service::GradingService,
        history_service::HistoryService,
        record_service::ExamRecordService,
        snapshot_store::{FileSnapshotStore, SnapshotStore},
        upload_service::UploadService,
    },
};

/// The collaborators the services are built from.
pub struct AppDependencies {
    pub exams: Arc<dyn ExamRepository>,
    pub feedbacks: Arc<dyn FeedbackRepository>,
    pub chats: Arc<dyn ChatRepository>,
    pub backend: Arc<dyn ExamBackend>,
    pub blobs: Arc<dyn BlobStore>,
    pub snapshots: Arc<dyn SnapshotStore>,
}

#[derive(Clone)]
pub struct AppState {
    pub session: SessionContext,
    pub jwt_service: Arc<JwtService>,
    pub upload_service: Arc<UploadService>,
    pub exam_session_service: Arc<ExamSessionService>,
    pub history_service: Arc<HistoryService>,
    pub chat_service: Arc<ChatService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let exams = Arc::new(MongoExamRepository::new(&db, &config.exams_collection));
        exams.ensure_indexes().await?;
        let feedbacks = Arc::new(MongoFeedbackRepository::new(&db, &config.feedbacks_collection));
        feedbacks.ensure_indexes().await?;
        let chats = Arc::new(MongoChatRepository::new(&db, &config.chats_collection));
        chats.ensure_indexes().await?;

        let dependencies = AppDependencies {
            exams,
            feedbacks,
            chats,
            backend: Arc::new(HttpExamBackend::new(&config.api_base_url)),
            blobs: Arc::new(HttpBlobStore::new(&config.blob_base_url)),
            snapshots: Arc::new(FileSnapshotStore::new(&config.snapshot_path)),
        };

        Self::from_parts(config, dependencies).await
    }

    /// Wires the services and restores the exam from the snapshot store.
    pub async fn from_parts(config: Config, deps: AppDependencies) -> AppResult<Self> {
        let records = Arc::new(ExamRecordService::new(deps.exams, deps.feedbacks));

        let exam_session_service = Arc::new(ExamSessionService::new(
            deps.snapshots,
            GradingService::new(deps.backend.clone()),
            records.clone(),
        ));
        exam_session_service.restore().await?;

        Ok(Self {
            session: SessionContext::new(),
            jwt_service: Arc::new(JwtService::new(&config.auth_jwt_secret)),
            upload_service: Arc::new(UploadService::new(
                deps.backend,
                deps.blobs,
                config.max_upload_bytes,
            )),
            exam_session_service,
            history_service: Arc::new(HistoryService::new(records, config.history_page_size)),
            chat_service: Arc::new(ChatService::new(deps.chats)),
            config: Arc::new(config),
        })
    }
}
