pub mod chat;
pub mod exam_record;
pub mod grade;
pub mod question;
pub mod session_snapshot;
pub use chat::{ChatMessage, ChatThread};
pub use exam_record::{ExamRecord, FeedbackRecord};
pub use grade::{Correctness, GradeResult};
pub use question::{Answer, CorrectAnswer, Question, QuestionKind};
pub use session_snapshot::{ExamPhase, SessionSnapshot, SubmissionPackage};
