use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Снимок аукциона, полученный с сервера.
///
/// Клиент никогда не меняет его по частям: каждый успешный запрос заменяет
/// запись целиком.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuctionRecord {
    /// Идентификатор аукциона.
    pub id: String,
    /// Название лота.
    pub title: String,
    /// Описание лота.
    pub description: String,
    /// Стартовая ставка, неотрицательная.
    pub starting_bid: f64,
    /// Момент закрытия аукциона (UTC).
    pub end_date: DateTime<Utc>,
}

impl AuctionRecord {
    /// Собирает запись и проверяет инварианты.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        starting_bid: f64,
        end_date: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let id = id.into();
        require_non_blank("id", &id)?;

        if !starting_bid.is_finite() || starting_bid < 0.0 {
            return Err(DomainError::Validation {
                field: "starting_bid",
                message: "must be a finite number >= 0",
            });
        }

        Ok(Self {
            id,
            title: title.into(),
            description: description.into(),
            starting_bid,
            end_date,
        })
    }
}

/// Одна ставка по аукциону.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    /// Идентификатор ставки.
    pub id: String,
    /// Кто поставил.
    pub username: String,
    /// Размер ставки.
    pub amount: f64,
    /// Когда поставлена (UTC).
    pub created_at: DateTime<Utc>,
}

/// Роль пользователя.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Администратор: видит кнопки редактирования и удаления.
    Admin,
    /// Обычный пользователь.
    #[default]
    User,
    /// Любое значение, которое клиент не знает.
    Other(String),
}

impl Role {
    /// `true` только для [`Role::Admin`].
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Строковое представление, как его отдаёт сервер.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "admin" => Self::Admin,
            "user" => Self::User,
            _ => Self::Other(value),
        }
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.as_str().to_string()
    }
}

/// Локально авторизованный пользователь.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewer {
    /// Идентификатор пользователя.
    pub id: String,
    /// Логин.
    pub username: String,
    /// Роль.
    pub role: Role,
}

/// Победитель завершённого аукциона.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    /// Логин победителя.
    pub username: String,
}

/// Сумма для показа: `120.0` -> `$120`, `12.5` -> `$12.5`.
pub fn format_amount(amount: f64) -> String {
    format!("${amount}")
}

fn require_non_blank(field: &'static str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::Validation {
            field,
            message: "must not be empty",
        });
    }
    Ok(())
}
