//! JSON-формы ответов сервера аукционов.

use crate::error::DomainError;
use crate::models::{AuctionRecord, Bid, Role, Viewer, Winner};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Тело ошибки: сервер кладёт текст то в `error`, то в `message`.
#[derive(Debug, Deserialize)]
pub struct ErrorResponseDto {
    pub error: Option<String>,
    pub message: Option<String>,
}

impl ErrorResponseDto {
    pub fn into_message(self) -> Option<String> {
        self.error.or(self.message)
    }
}

/// Аукцион в том виде, как его отдаёт `GET /auctions/{id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub starting_bid: f64,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub bid_amount: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ViewerDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub role: Role,
}

/// Ответ `GET /auctions/winner/{id}`.
#[derive(Debug, Deserialize)]
pub struct WinnerEnvelopeDto {
    #[serde(default)]
    pub winner: Option<WinnerFieldDto>,
}

/// Сервер отдаёт победителя то объектом, то пустой строкой.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum WinnerFieldDto {
    Record { username: String },
    Name(String),
}

impl TryFrom<AuctionDto> for AuctionRecord {
    type Error = DomainError;

    fn try_from(value: AuctionDto) -> Result<Self, Self::Error> {
        AuctionRecord::new(
            value.id,
            value.title,
            value.description,
            value.starting_bid,
            value.end_date,
        )
    }
}

impl From<BidDto> for Bid {
    fn from(value: BidDto) -> Self {
        Self {
            id: value.id,
            username: value.username,
            amount: value.bid_amount,
            created_at: value.created_at,
        }
    }
}

impl From<ViewerDto> for Viewer {
    fn from(value: ViewerDto) -> Self {
        Self {
            id: value.id,
            username: value.username,
            role: value.role,
        }
    }
}

impl WinnerEnvelopeDto {
    /// `None` для `null`, отсутствующего поля и пустой строки.
    pub fn into_winner(self) -> Option<Winner> {
        let username = match self.winner? {
            WinnerFieldDto::Record { username } | WinnerFieldDto::Name(username) => username,
        };
        let username = username.trim();
        if username.is_empty() {
            return None;
        }
        Some(Winner {
            username: username.to_string(),
        })
    }

    /// Так сервер отвечает ошибкой, когда победителя ещё нет.
    pub fn is_explicitly_empty(&self) -> bool {
        matches!(&self.winner, Some(WinnerFieldDto::Name(name)) if name.is_empty())
    }
}

/// Почему ответ на запрос победителя не дал результата.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WinnerReplyError {
    /// Успешный статус, но тело не разбирается.
    Malformed(String),
    /// Ошибочный статус; текст ошибки из тела, если сервер его прислал.
    Rejected(Option<String>),
}

/// Разбирает ответ `GET /auctions/winner/{id}`.
///
/// Ошибочный статус с телом `{"winner": ""}` означает "победителя пока нет".
/// Любой другой ошибочный ответ остаётся ошибкой.
pub fn interpret_winner_response(
    success: bool,
    body: &str,
) -> Result<Option<Winner>, WinnerReplyError> {
    if success {
        return serde_json::from_str::<WinnerEnvelopeDto>(body)
            .map(WinnerEnvelopeDto::into_winner)
            .map_err(|err| WinnerReplyError::Malformed(err.to_string()));
    }

    if serde_json::from_str::<WinnerEnvelopeDto>(body)
        .is_ok_and(|envelope| envelope.is_explicitly_empty())
    {
        return Ok(None);
    }

    let message = serde_json::from_str::<ErrorResponseDto>(body)
        .ok()
        .and_then(ErrorResponseDto::into_message);
    Err(WinnerReplyError::Rejected(message))
}
