use async_trait::async_trait;
use mongodb::{
    bson::{doc, to_bson},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::AppResult,
    models::domain::{ChatMessage, ChatThread},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatRepository: Send + Sync {
    async fn find_thread_id_by_email(&self, email: &str) -> AppResult<Option<String>>;
    /// Returns `false` when the thread no longer exists.
    async fn append_message(&self, thread_id: &str, message: ChatMessage) -> AppResult<bool>;
}

pub struct MongoChatRepository {
    collection: Collection<ChatThread>,
}

impl MongoChatRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for chats collection");

        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().name("email_idx".to_string()).build())
            .build();

        self.collection.create_index(email_index).await?;
        Ok(())
    }
}

#[async_trait]
impl ChatRepository for MongoChatRepository {
    async fn find_thread_id_by_email(&self, email: &str) -> AppResult<Option<String>> {
        let thread = self.collection.find_one(doc! { "email": email }).await?;
        Ok(thread.map(|t| t.id))
    }

    async fn append_message(&self, thread_id: &str, message: ChatMessage) -> AppResult<bool> {
        let message = to_bson(&message)?;
        let result = self
            .collection
            .update_one(
                doc! { "id": thread_id },
                doc! { "$push": { "messages": message } },
            )
            .await?;

        log::debug!("Appended message to chat thread {}", thread_id);
        Ok(result.matched_count > 0)
    }
}
