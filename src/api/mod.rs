pub mod auth;
pub mod client;
pub mod error;
pub mod session;

use async_trait::async_trait;

pub use error::ApiError;

/// Server-side mutations a toot box can trigger. Each call only reports
/// success or failure; the caller decides what to change locally.
#[async_trait]
pub trait MutationApi: Send + Sync {
    async fn favourite(&self, status_id: &str, want: bool) -> Result<(), ApiError>;
    async fn reblog(&self, status_id: &str, want: bool) -> Result<(), ApiError>;
    async fn delete_status(&self, status_id: &str) -> Result<(), ApiError>;
    /// Pins the status if `currently_pinned` is false, unpins it otherwise.
    async fn set_pin(&self, status_id: &str, currently_pinned: bool) -> Result<(), ApiError>;
    async fn mute_account(&self, account_id: &str, want: bool) -> Result<(), ApiError>;
    async fn block_account(&self, account_id: &str, want: bool) -> Result<(), ApiError>;
}
