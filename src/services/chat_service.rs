use std::sync::Arc;

use crate::{
    auth::Session,
    errors::{AppError, AppResult},
    models::domain::{Answer, ChatMessage, Question},
    repositories::ChatRepository,
};

const BLANK: &str = "(blank)";

/// The message handed to the study chatbot when the user asks about a question.
pub fn build_discussion_prompt(question: &Question, answer: Option<&Answer>) -> String {
    let choices = if question.is_choice() && !question.choices.is_empty() {
        question.choices.join(" / ")
    } else {
        BLANK.to_string()
    };
    let my_answer = answer
        .map(|a| a.display_for(question))
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(|| BLANK.to_string());

    format!(
        "Question: {}\nChoices: {}\nCorrect answer: {}\nMy answer: {}\n\
         Compare the correct answer with my answer and explain in detail.",
        question.prompt, choices, question.correct_answer, my_answer
    )
}

pub struct ChatService {
    chats: Arc<dyn ChatRepository>,
}

impl ChatService {
    pub fn new(chats: Arc<dyn ChatRepository>) -> Self {
        Self { chats }
    }

    /// Appends a discussion prompt to the user's chat thread and returns the
    /// thread id with the message sent.
    pub async fn discuss(
        &self,
        session: &Session,
        question: &Question,
        answer: Option<&Answer>,
    ) -> AppResult<(String, ChatMessage)> {
        let thread_id = self
            .chats
            .find_thread_id_by_email(&session.email)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("No chat thread for {}", session.email))
            })?;

        let message = ChatMessage::outgoing_from_user(build_discussion_prompt(question, answer));
        if !self.chats.append_message(&thread_id, message.clone()).await? {
            return Err(AppError::NotFound(format!("Chat thread '{}' not found", thread_id)));
        }

        log::info!("Queued discussion of question {} in thread {}", question.id + 1, thread_id);
        Ok((thread_id, message))
    }
}
