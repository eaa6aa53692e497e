use async_trait::async_trait;

use super::models::HallEntry;
use crate::store::StoreError;

#[async_trait]
pub trait HallRepository: Send + Sync {
    /// Writes the entries together
    async fn create_entries(&self, entries: &[HallEntry]) -> Result<(), StoreError>;

    /// Newest first
    async fn list_entries(&self, limit: usize) -> Result<Vec<HallEntry>, StoreError>;

    async fn entries_for_match(&self, match_id: &str) -> Result<Vec<HallEntry>, StoreError>;

    async fn get_entry(&self, entry_id: &str) -> Result<Option<HallEntry>, StoreError>;

    async fn update_entry_roast(&self, entry_id: &str, roast: &str) -> Result<(), StoreError>;
}
