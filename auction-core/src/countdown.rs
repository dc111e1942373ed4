//! Обратный отсчёт до закрытия аукциона.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::clock::TimeSource;

/// Период пересчёта обратного отсчёта.
pub const TICK_INTERVAL: Duration = Duration::from_millis(1000);

const MS_PER_SECOND: i64 = 1000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Оставшееся до закрытия время.
///
/// Всегда выводится из `(end_date - now)` и нигде не хранится.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Countdown {
    /// Целые дни.
    pub days: u64,
    /// Часы, `0..=23`.
    pub hours: u64,
    /// Минуты, `0..=59`.
    pub minutes: u64,
    /// Секунды, `0..=59`.
    pub seconds: u64,
}

impl Countdown {
    /// Нулевой отсчёт.
    pub const ZERO: Self = Self {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// Считает остаток между `end` и `now`.
    ///
    /// Каждая единица получается делением нацело, дробная секунда отбрасывается.
    /// Если `now >= end`, возвращает [`Countdown::ZERO`].
    pub fn between(end: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let delta = (end - now).num_milliseconds();
        if delta <= 0 {
            return Self::ZERO;
        }

        Self {
            days: (delta / MS_PER_DAY) as u64,
            hours: ((delta % MS_PER_DAY) / MS_PER_HOUR) as u64,
            minutes: ((delta % MS_PER_HOUR) / MS_PER_MINUTE) as u64,
            seconds: ((delta % MS_PER_MINUTE) / MS_PER_SECOND) as u64,
        }
    }

    /// Аукцион закончен, когда все поля обнулились.
    ///
    /// Проверяется именно обнулённый отсчёт, а не `end_date`, чтобы таймер и
    /// признак окончания не расходились (остаток меньше секунды уже "закончен").
    pub fn is_ended(&self) -> bool {
        *self == Self::ZERO
    }

    /// Пары `(метка, значение)` в порядке D, H, M, S.
    pub fn units(&self) -> [(&'static str, u64); 4] {
        [
            ("D", self.days),
            ("H", self.hours),
            ("M", self.minutes),
            ("S", self.seconds),
        ]
    }
}

/// Значение единицы отсчёта с ведущим нулём: `7` -> `"07"`.
pub fn pad_unit(value: u64) -> String {
    format!("{value:02}")
}

/// Обратный отсчёт поверх конкретного источника времени.
#[derive(Debug, Clone)]
pub struct CountdownEngine<C: TimeSource> {
    clock: C,
}

impl<C: TimeSource> CountdownEngine<C> {
    /// Создаёт движок поверх `clock`.
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    /// Остаток до `end` на текущий момент часов.
    pub fn remaining(&self, end: DateTime<Utc>) -> Countdown {
        Countdown::between(end, self.clock.now())
    }
}
