use chrono::{DateTime, Utc};

/// Единственный источник "сейчас" для обратного отсчёта.
pub trait TimeSource: Send + Sync {
    /// Текущий момент (UTC).
    fn now(&self) -> DateTime<Utc>;
}

/// Системные часы.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
