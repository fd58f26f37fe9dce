use super::entities::Event;
use std::io::Result;

/// RepositoryProvider provides full functionality of the persistent event store.
///
pub trait RepositoryProvider: Send + Sync + Clone {
    async fn migrate(&self) -> Result<()>;
    async fn insert_event(&self, message: &str) -> Result<Event>;
    async fn recent_events(&self, limit: usize) -> Result<Vec<Event>>;
    async fn count_events(&self) -> Result<i64>;
    async fn close(&self);
}
