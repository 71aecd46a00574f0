use async_trait::async_trait;
use shared::{errors::RepositoryError, model::Role};
use uuid::Uuid;

#[async_trait]
pub trait UserDirectoryTrait: Send {
    /// `None` when no such user exists.
    async fn find_user_role(&mut self, user_id: Uuid) -> Result<Option<Role>, RepositoryError>;

    async fn user_exists(&mut self, user_id: Uuid) -> Result<bool, RepositoryError> {
        Ok(self.find_user_role(user_id).await?.is_some())
    }
}
