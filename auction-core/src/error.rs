use thiserror::Error;

/// Ошибка валидации доменной модели.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Поле `field` не прошло проверку.
    #[error("validation failed for '{field}': {message}")]
    Validation {
        /// Имя поля.
        field: &'static str,
        /// Что именно не так.
        message: &'static str,
    },
}

/// Ошибка получения данных одного из источников детальной страницы.
///
/// Хранится внутри [`crate::FetchState::Failed`], поэтому должна быть `Clone`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Сетевой сбой или сбой транспорта.
    #[error("transport error: {0}")]
    Transport(String),

    /// Запрошенный ресурс не найден.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// Нет токена или сервер его не принял.
    #[error("unauthorized")]
    Unauthorized,

    /// Ответ сервера не удалось разобрать.
    #[error("decode error: {0}")]
    Decode(String),

    /// Ответ разобран, но данные не прошли валидацию.
    #[error(transparent)]
    Invalid(#[from] DomainError),
}
