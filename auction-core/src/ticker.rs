//! Периодический тик обратного отсчёта как ресурс с областью жизни.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

use crate::countdown::TICK_INTERVAL;

/// Фоновая задача, которая вызывает колбэк раз в `period`.
///
/// Задача отменяется при drop, поэтому тикер не переживает своего владельца.
#[derive(Debug)]
pub struct Ticker {
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Запускает тикер; первый тик срабатывает сразу.
    pub fn spawn<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                on_tick();
            }
        });

        Self { handle }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Тик отсчёта, который живёт ровно пока загружена запись аукциона.
#[derive(Debug)]
pub struct CountdownSchedule {
    period: Duration,
    sender: mpsc::UnboundedSender<()>,
    ticker: Option<Ticker>,
}

impl CountdownSchedule {
    /// Расписание с периодом [`TICK_INTERVAL`]; тики уходят в `sender`.
    pub fn new(sender: mpsc::UnboundedSender<()>) -> Self {
        Self::with_period(TICK_INTERVAL, sender)
    }

    pub fn with_period(period: Duration, sender: mpsc::UnboundedSender<()>) -> Self {
        Self {
            period,
            sender,
            ticker: None,
        }
    }

    /// Запускает тикер, когда запись появилась, и гасит, когда пропала.
    pub fn sync(&mut self, record_loaded: bool) {
        match (record_loaded, self.ticker.is_some()) {
            (true, false) => {
                let sender = self.sender.clone();
                self.ticker = Some(Ticker::spawn(self.period, move || {
                    // Получатель мог уже уйти; следующий sync погасит тикер.
                    let _ = sender.send(());
                }));
                debug!(period_ms = self.period.as_millis() as u64, "countdown schedule started");
            }
            (false, true) => self.stop(),
            _ => {}
        }
    }

    pub fn stop(&mut self) {
        if self.ticker.take().is_some() {
            debug!("countdown schedule stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }
}
