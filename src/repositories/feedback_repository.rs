use async_trait::async_trait;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{db::Database, errors::AppResult, models::domain::FeedbackRecord};

/// Companion grade documents, one per exam record with the same id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    async fn upsert(&self, record: FeedbackRecord) -> AppResult<FeedbackRecord>;
    async fn delete(&self, user_id: &str, id: &str) -> AppResult<bool>;
}

pub struct MongoFeedbackRepository {
    collection: Collection<FeedbackRecord>,
}

impl MongoFeedbackRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for feedbacks collection");

        let owner_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("user_feedback_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(owner_index).await?;
        Ok(())
    }
}

#[async_trait]
impl FeedbackRepository for MongoFeedbackRepository {
    async fn upsert(&self, record: FeedbackRecord) -> AppResult<FeedbackRecord> {
        self.collection
            .replace_one(doc! { "user_id": &record.user_id, "id": &record.id }, &record)
            .upsert(true)
            .await?;
        Ok(record)
    }

    async fn delete(&self, user_id: &str, id: &str) -> AppResult<bool> {
        let result = self
            .collection
            .delete_one(doc! { "user_id": user_id, "id": id })
            .await?;
        Ok(result.deleted_count > 0)
    }
}
