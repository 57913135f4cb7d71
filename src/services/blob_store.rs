use async_trait::async_trait;
use reqwest::StatusCode;

use crate::{errors::AppResult, services::backend_client::ensure_success};

/// Where a user's uploaded PDF lives in the blob store.
pub fn pdf_blob_path(email_local_part: &str) -> String {
    format!("pdfs/{}.pdf", email_local_part)
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// `None` when nothing is stored at `path`.
    async fn download(&self, path: &str, bearer: &str) -> AppResult<Option<Vec<u8>>>;
    async fn delete(&self, path: &str, bearer: &str) -> AppResult<()>;
}

pub struct HttpBlobStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBlobStore {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn download(&self, path: &str, bearer: &str) -> AppResult<Option<Vec<u8>>> {
        let response = self
            .client
            .get(self.object_url(path))
            .bearer_auth(bearer)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = ensure_success(response, "Blob download").await?;
        let bytes = response.bytes().await?;
        Ok(Some(bytes.to_vec()))
    }

    async fn delete(&self, path: &str, bearer: &str) -> AppResult<()> {
        let response = self
            .client
            .delete(self.object_url(path))
            .bearer_auth(bearer)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }

        ensure_success(response, "Blob delete").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_path_uses_email_local_part() {
        assert_eq!(pdf_blob_path("student.kim"), "pdfs/student.kim.pdf");
    }

    #[test]
    fn object_url_joins_without_double_slash() {
        let store = HttpBlobStore::new("http://localhost:9199/storage/");
        assert_eq!(
            store.object_url("/pdfs/a.pdf"),
            "http://localhost:9199/storage/pdfs/a.pdf"
        );
    }
}
