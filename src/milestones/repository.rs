use async_trait::async_trait;

use super::models::MilestoneModel;
use crate::store::StoreError;

#[async_trait]
pub trait MilestoneRepository: Send + Sync {
    /// Oldest first
    async fn list_milestones(&self) -> Result<Vec<MilestoneModel>, StoreError>;

    /// Inserts unless one with the same title exists; returns whether it inserted
    async fn create_milestone(&self, milestone: &MilestoneModel) -> Result<bool, StoreError>;
}
