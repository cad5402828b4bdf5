use serde::Deserialize;

use super::repo_types::PostUpdate;
use crate::error::ApiError;

/// Body for both create and update. Both fields are required and must not
/// be blank.
#[derive(Debug, Deserialize)]
pub struct PostBody {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl PostBody {
    pub fn validate(self) -> Result<(String, String), ApiError> {
        let title = self.title.map(|t| t.trim().to_string()).unwrap_or_default();
        let content = self.content.unwrap_or_default();
        if title.is_empty() || content.trim().is_empty() {
            return Err(ApiError::Validation("Title and content are required".into()));
        }
        Ok((title, content))
    }

    pub fn into_update(self) -> Result<PostUpdate, ApiError> {
        let (title, content) = self.validate()?;
        Ok(PostUpdate {
            title: Some(title),
            content: Some(content),
        })
    }
}
