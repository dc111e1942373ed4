use std::time::Duration;

use async_trait::async_trait;
use auction_core::{AuctionApi, AuctionRecord, Bid, FetchError, Viewer, Winner};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use auction_core::wire::{
    AuctionDto, BidDto, ErrorResponseDto, ViewerDto, WinnerReplyError, interpret_winner_response,
};
use crate::error::{AuctionClientError, AuctionClientResult};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
/// HTTP-клиент для REST API сервера аукционов.
pub struct HttpClient {
    base_url: String,
    client: Client,
    token: Option<String>,
}

impl HttpClient {
    /// Создаёт клиент с базовым URL сервера и общим таймаутом запроса.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AuctionClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
            token: None,
        })
    }

    /// Устанавливает токен, который уходит в удаление аукциона.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Возвращает текущий токен, если он установлен.
    pub fn get_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn decode_error(response: Response) -> AuctionClientError {
        let status = response.status();
        let message = response
            .json::<ErrorResponseDto>()
            .await
            .ok()
            .and_then(ErrorResponseDto::into_message);
        AuctionClientError::from_http_status(status, message)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
    ) -> AuctionClientResult<Response> {
        let url = self.endpoint(path);
        debug!(%method, %url, "sending request");

        let mut request = self.client.request(method, url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        request.send().await.map_err(AuctionClientError::from_reqwest)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AuctionClientResult<T> {
        let response = self.send(Method::GET, path, None).await?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }

        response
            .json::<T>()
            .await
            .map_err(AuctionClientError::from_reqwest)
    }

    /// Получает аукцион по идентификатору.
    pub async fn get_auction(&self, id: &str) -> AuctionClientResult<AuctionRecord> {
        let dto: AuctionDto = self.get_json(&format!("/auctions/{id}")).await?;
        Ok(AuctionRecord::try_from(dto)?)
    }

    /// Удаляет аукцион по идентификатору.
    pub async fn delete_auction(&self, id: &str) -> AuctionClientResult<()> {
        let response = self
            .send(
                Method::DELETE,
                &format!("/auctions/{id}"),
                self.token.as_deref(),
            )
            .await?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        Ok(())
    }

    /// Получает победителя; `None`, если его пока нет.
    ///
    /// Пока аукцион идёт, сервер отвечает ошибкой с телом `{"winner": ""}`.
    /// Это не сбой, а штатное "победителя нет".
    pub async fn get_winner(&self, id: &str) -> AuctionClientResult<Option<Winner>> {
        let response = self
            .send(Method::GET, &format!("/auctions/winner/{id}"), None)
            .await?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(AuctionClientError::from_reqwest)?;

        match interpret_winner_response(status.is_success(), &body) {
            Ok(winner) => {
                if winner.is_none() {
                    debug!(auction_id = id, "auction has no winner yet");
                }
                Ok(winner)
            }
            Err(WinnerReplyError::Malformed(message)) => Err(AuctionClientError::Decode(message)),
            Err(WinnerReplyError::Rejected(message)) => {
                Err(AuctionClientError::from_http_status(status, message))
            }
        }
    }

    /// Получает ставки по аукциону (в порядке сервера).
    pub async fn list_bids(&self, auction_id: &str) -> AuctionClientResult<Vec<Bid>> {
        let dtos: Vec<BidDto> = self.get_json(&format!("/bids/{auction_id}")).await?;
        Ok(dtos.into_iter().map(Bid::from).collect())
    }

    /// Получает профиль пользователя по bearer-токену.
    pub async fn get_profile(&self, token: &str) -> AuctionClientResult<Viewer> {
        let response = self
            .client
            .request(Method::POST, self.endpoint("/users/profile"))
            .bearer_auth(token)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(AuctionClientError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }

        let dto = response
            .json::<ViewerDto>()
            .await
            .map_err(AuctionClientError::from_reqwest)?;
        Ok(dto.into())
    }
}

#[async_trait]
impl AuctionApi for HttpClient {
    async fn fetch_auction(&self, id: &str) -> Result<AuctionRecord, FetchError> {
        Ok(self.get_auction(id).await?)
    }

    async fn delete_auction(&self, id: &str) -> Result<(), FetchError> {
        Ok(HttpClient::delete_auction(self, id).await?)
    }

    async fn fetch_winner(&self, id: &str) -> Result<Option<Winner>, FetchError> {
        Ok(self.get_winner(id).await?)
    }

    async fn fetch_bids(&self, auction_id: &str) -> Result<Vec<Bid>, FetchError> {
        Ok(self.list_bids(auction_id).await?)
    }

    async fn resolve_viewer(&self, token: &str) -> Result<Viewer, FetchError> {
        Ok(self.get_profile(token).await?)
    }
}
