use crate::error::ApiError;
use crate::types::{BlockSummary, StorageBlock};
use async_trait::async_trait;

/// Capability surface every code-block provider implements.
///
/// Every remote call is a suspension point; failures surface as
/// `ApiError::ProviderError` unless noted otherwise.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Display name, also used as the registry key.
    fn name(&self) -> &str;

    async fn is_authenticated(&self) -> bool;

    /// Fails with `ApiError::AuthError` on bad credentials.
    async fn login(&self, username: &str, password: &str) -> Result<(), ApiError>;

    async fn list(&self, favorite_only: bool) -> Result<Vec<BlockSummary>, ApiError>;

    async fn get_storage_block(&self, url: &str) -> Result<StorageBlock, ApiError>;

    async fn get_storage_block_by_id(&self, id: &str) -> Result<StorageBlock, ApiError>;

    async fn create_file(
        &self,
        file_name: &str,
        description: &str,
        content: &str,
        is_private: bool,
    ) -> Result<StorageBlock, ApiError>;

    /// Creates or overwrites `file_name`. Fails if `block_id` is unknown.
    async fn edit_file(&self, block_id: &str, file_name: &str, content: &str)
        -> Result<(), ApiError>;

    async fn remove_file_from_storage_block(
        &self,
        block_id: &str,
        file_name: &str,
    ) -> Result<(), ApiError>;

    async fn delete_storage_block(&self, block_id: &str) -> Result<(), ApiError>;

    async fn change_description(&self, block_id: &str, description: &str)
        -> Result<(), ApiError>;

    /// Mark or unmark a block as a favorite, the set `list(true)` returns.
    async fn set_starred(&self, block_id: &str, starred: bool) -> Result<(), ApiError>;
}
