use auction_core::{DomainError, FetchError};
use thiserror::Error;

#[derive(Debug, Error)]
/// Ошибки клиентской библиотеки `auction-client`.
pub enum AuctionClientError {
    /// Ошибка HTTP-транспорта (`reqwest`).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Требуется авторизация (отсутствует/некорректен токен).
    #[error("unauthorized")]
    Unauthorized,

    /// Запрошенный ресурс не найден.
    #[error("not found: {0}")]
    NotFound(String),

    /// Успешный ответ, тело которого не удалось разобрать.
    #[error("decode error: {0}")]
    Decode(String),

    /// Сервер отклонил запрос.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Ответ разобран, но не прошёл доменную валидацию.
    #[error(transparent)]
    Validation(#[from] DomainError),
}

/// Результат операций `auction-client`.
pub type AuctionClientResult<T> = Result<T, AuctionClientError>;

impl AuctionClientError {
    pub(crate) fn from_http_status(status: reqwest::StatusCode, message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| format!("http status {status}"));
        match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                Self::Unauthorized
            }
            reqwest::StatusCode::NOT_FOUND => Self::NotFound(message),
            _ => Self::InvalidRequest(message),
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_http_status(status, None);
        }
        Self::Http(err)
    }
}

impl From<AuctionClientError> for FetchError {
    fn from(value: AuctionClientError) -> Self {
        match value {
            AuctionClientError::Http(err) if err.is_decode() => Self::Decode(err.to_string()),
            AuctionClientError::Http(err) => Self::Transport(err.to_string()),
            AuctionClientError::Unauthorized => Self::Unauthorized,
            AuctionClientError::NotFound(message) => Self::NotFound(message),
            AuctionClientError::Decode(message) => Self::Decode(message),
            AuctionClientError::InvalidRequest(message) => Self::Transport(message),
            AuctionClientError::Validation(err) => Self::Invalid(err),
        }
    }
}
