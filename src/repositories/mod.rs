pub mod chat_repository;
pub mod exam_repository;
pub mod feedback_repository;

pub use chat_repository::{ChatRepository, MongoChatRepository};
pub use exam_repository::{ExamRepository, MongoExamRepository};
pub use feedback_repository::{FeedbackRepository, MongoFeedbackRepository};

#[cfg(test)]
pub use chat_repository::MockChatRepository;
#[cfg(test)]
pub use exam_repository::MockExamRepository;
#[cfg(test)]
pub use feedback_repository::MockFeedbackRepository;
