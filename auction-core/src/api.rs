use async_trait::async_trait;

use crate::error::FetchError;
use crate::models::{AuctionRecord, Bid, Viewer, Winner};

/// Внешние сервисы, из которых собирается детальная страница.
#[async_trait]
pub trait AuctionApi: Send + Sync {
    /// Аукцион по идентификатору.
    async fn fetch_auction(&self, id: &str) -> Result<AuctionRecord, FetchError>;

    /// Удаляет аукцион.
    async fn delete_auction(&self, id: &str) -> Result<(), FetchError>;

    /// Победитель аукциона.
    ///
    /// `Ok(None)` значит "победителя пока нет" и ошибкой не является.
    async fn fetch_winner(&self, id: &str) -> Result<Option<Winner>, FetchError>;

    /// Ставки по аукциону в любом порядке.
    async fn fetch_bids(&self, auction_id: &str) -> Result<Vec<Bid>, FetchError>;

    /// Профиль пользователя по bearer-токену.
    async fn resolve_viewer(&self, token: &str) -> Result<Viewer, FetchError>;
}
