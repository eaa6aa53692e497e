use async_trait::async_trait;

use super::models::UserModel;
use crate::store::StoreError;

/// Storage operations on player profiles.
///
/// Aggregate stats are deliberately absent: they only change inside
/// [`crate::matches::MatchRepository::commit_match`].
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: &UserModel) -> Result<(), StoreError>;
    async fn get_user(&self, user_id: &str) -> Result<Option<UserModel>, StoreError>;
    /// All users, oldest registration first
    async fn list_users(&self) -> Result<Vec<UserModel>, StoreError>;
    /// Adds the badge ids the user doesn't already hold and returns only those
    async fn award_badges(
        &self,
        user_id: &str,
        badge_ids: &[String],
    ) -> Result<Vec<String>, StoreError>;
}
