use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{db::Database, errors::AppResult, models::domain::ExamRecord};

/// Graded exam records, partitioned by owning user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExamRepository: Send + Sync {
    async fn find_by_id(&self, user_id: &str, id: &str) -> AppResult<Option<ExamRecord>>;
    async fn list_by_user(&self, user_id: &str) -> AppResult<Vec<ExamRecord>>;
    async fn upsert(&self, record: ExamRecord) -> AppResult<ExamRecord>;
    /// Returns `false` when no record matched.
    async fn delete(&self, user_id: &str, id: &str) -> AppResult<bool>;
}

pub struct MongoExamRepository {
    collection: Collection<ExamRecord>,
}

impl MongoExamRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for exams collection");

        let owner_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("user_exam_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(owner_index).await?;

        log::info!("Successfully created indexes for exams collection");
        Ok(())
    }
}

#[async_trait]
impl ExamRepository for MongoExamRepository {
    async fn find_by_id(&self, user_id: &str, id: &str) -> AppResult<Option<ExamRecord>> {
        let record = self
            .collection
            .find_one(doc! { "user_id": user_id, "id": id })
            .await?;
        Ok(record)
    }

    async fn list_by_user(&self, user_id: &str) -> AppResult<Vec<ExamRecord>> {
        let cursor = self.collection.find(doc! { "user_id": user_id }).await?;
        let items: Vec<ExamRecord> = cursor.try_collect().await?;
        Ok(items)
    }

    async fn upsert(&self, record: ExamRecord) -> AppResult<ExamRecord> {
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
