use async_trait::async_trait;

use super::models::BadgeModel;
use crate::store::StoreError;

#[async_trait]
pub trait BadgeRepository: Send + Sync {
    /// Materialised badges in creation order
    async fn list_badges(&self) -> Result<Vec<BadgeModel>, StoreError>;

    /// Inserts unless a badge with the same id exists; returns whether it inserted
    async fn create_badge(&self, badge: &BadgeModel) -> Result<bool, StoreError>;

    async fn update_badge_description(
        &self,
        badge_id: &str,
        description: &str,
    ) -> Result<(), StoreError>;
}
