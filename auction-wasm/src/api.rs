use auction_core::wire::{
    AuctionDto, BidDto, ErrorResponseDto, ViewerDto, WinnerReplyError, interpret_winner_response,
};
use auction_core::{AuctionRecord, Bid, FetchError, Viewer, Winner};
use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;

const API_BASE_URL: &str = match option_env!("AUCTION_API_URL") {
    Some(value) => value,
    None => "http://127.0.0.1:5000",
};

#[derive(Debug, Clone)]
pub(crate) enum ApiError {
    Network(String),
    Http { status: u16, message: String },
    Decode(String),
}

impl core::fmt::Display for ApiError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "network error: {msg}"),
            Self::Http { status, message } => write!(f, "http error {status}: {message}"),
            Self::Decode(msg) => write!(f, "decode error: {msg}"),
        }
    }
}

impl From<ApiError> for FetchError {
    fn from(value: ApiError) -> Self {
        match value {
            ApiError::Network(msg) => Self::Transport(msg),
            ApiError::Http { status: 401 | 403, .. } => Self::Unauthorized,
            ApiError::Http {
                status: 404,
                message,
            } => Self::NotFound(message),
            ApiError::Http { status, message } => Self::Transport(format!("{status}: {message}")),
            ApiError::Decode(msg) => Self::Decode(msg),
        }
    }
}

fn endpoint(path: &str) -> String {
    format!(
        "{}/{}",
        API_BASE_URL.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    response
        .json::<T>()
        .await
        .map_err(|err| ApiError::Decode(err.to_string()))
}

fn error_from_body(status: u16, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorResponseDto>(body)
        .ok()
        .and_then(ErrorResponseDto::into_message);
    http_error(status, message)
}

fn http_error(status: u16, message: Option<String>) -> ApiError {
    let fallback = match status {
        401 => "Требуется авторизация".to_string(),
        403 => "Недостаточно прав для этой операции".to_string(),
        404 => "Ресурс не найден".to_string(),
        500..=599 => "Ошибка сервера".to_string(),
        _ => format!("HTTP ошибка {status}"),
    };

    ApiError::Http {
        status,
        message: message.unwrap_or(fallback),
    }
}

async fn parse_error_body(response: Response) -> ApiError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    error_from_body(status, &text)
}

pub(crate) async fn fetch_auction(id: &str) -> Result<AuctionRecord, FetchError> {
    let response = Request::get(&endpoint(&format!("/auctions/{id}")))
        .send()
        .await
        .map_err(|err| ApiError::Network(err.to_string()))?;

    if !response.ok() {
        return Err(parse_error_body(response).await.into());
    }

    let dto: AuctionDto = parse_json(response).await?;
    Ok(AuctionRecord::try_from(dto)?)
}

pub(crate) async fn fetch_profile(token: &str) -> Result<Viewer, FetchError> {
    let response = Request::post(&endpoint("/users/profile"))
        .header("Authorization", &format!("Bearer {token}"))
        .json(&serde_json::json!({}))
        .map_err(|err| ApiError::Network(err.to_string()))?
        .send()
        .await
        .map_err(|err| ApiError::Network(err.to_string()))?;

    if !response.ok() {
        return Err(parse_error_body(response).await.into());
    }

    let dto: ViewerDto = parse_json(response).await?;
    Ok(dto.into())
}

/// `Ok(None)`, если победителя пока нет: сервер отвечает ошибкой с `{"winner": ""}`.
pub(crate) async fn fetch_winner(id: &str) -> Result<Option<Winner>, FetchError> {
    let response = Request::get(&endpoint(&format!("/auctions/winner/{id}")))
        .send()
        .await
        .map_err(|err| ApiError::Network(err.to_string()))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|err| ApiError::Network(err.to_string()))?;

    match interpret_winner_response(response.ok(), &text) {
        Ok(winner) => Ok(winner),
        Err(WinnerReplyError::Malformed(msg)) => Err(ApiError::Decode(msg).into()),
        Err(WinnerReplyError::Rejected(message)) => Err(http_error(status, message).into()),
    }
}

pub(crate) async fn fetch_bids(auction_id: &str) -> Result<Vec<Bid>, FetchError> {
    let response = Request::get(&endpoint(&format!("/bids/{auction_id}")))
        .send()
        .await
        .map_err(|err| ApiError::Network(err.to_string()))?;

    if !response.ok() {
        return Err(parse_error_body(response).await.into());
    }

    let dtos: Vec<BidDto> = parse_json(response).await?;
    Ok(dtos.into_iter().map(Bid::from).collect())
}

pub(crate) async fn delete_auction(token: Option<&str>, id: &str) -> Result<(), FetchError> {
    let mut request = Request::delete(&endpoint(&format!("/auctions/{id}")));
    if let Some(token) = token {
        request = request.header("Authorization", &format!("Bearer {token}"));
    }

    let response = request
        .send()
        .await
        .map_err(|err| ApiError::Network(err.to_string()))?;

    if !response.ok() {
        return Err(parse_error_body(response).await.into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_from_body_prefers_server_message() {
        let err = error_from_body(400, r#"{"message":"Auction already closed"}"#);
        match err {
            ApiError::Http { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Auction already closed");
            }
            other => panic!("expected http error, got {other}"),
        }
    }

    #[test]
    fn error_from_body_falls_back_by_status() {
        let err = error_from_body(404, "");
        assert_eq!(
            FetchError::from(err),
            FetchError::NotFound("Ресурс не найден".to_string())
        );
    }

    #[test]
    fn auth_statuses_map_to_unauthorized() {
        let err = ApiError::Http {
            status: 403,
            message: "forbidden".to_string(),
        };
        assert_eq!(FetchError::from(err), FetchError::Unauthorized);
    }
}
