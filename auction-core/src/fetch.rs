use crate::error::FetchError;

/// Состояние одного независимого источника данных.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchState<T> {
    /// Запрос ещё не завершился.
    #[default]
    Pending,
    /// Данные получены.
    Ready(T),
    /// Запрос завершился ошибкой; слот остаётся без данных.
    Failed(FetchError),
}

impl<T> FetchState<T> {
    /// Превращает результат запроса в состояние слота.
    pub fn from_result(result: Result<T, FetchError>) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(err) => Self::Failed(err),
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Pending | Self::Failed(_) => None,
        }
    }

    pub fn ready_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Pending | Self::Failed(_) => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Запрос завершён: успешно или с ошибкой.
    pub fn is_settled(&self) -> bool {
        !self.is_pending()
    }
}
