pub mod backend_client;
pub mod blob_store;
pub mod chat_service;
pub mod exam_session_service;
pub mod grading_service;
pub mod history_service;
pub mod record_service;
pub mod snapshot_store;
pub mod upload_service;
