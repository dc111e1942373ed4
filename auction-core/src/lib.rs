//! Ядро детальной страницы аукциона.
//!
//! Здесь живёт всё, что не зависит от способа отрисовки:
//! - модели аукциона, ставок, пользователя и победителя;
//! - обратный отсчёт до закрытия и признак окончания;
//! - клиентская пагинация ставок;
//! - сведение независимых источников в одно состояние показа.
//!
//! Загрузка (`DataSync`) и периодический тик (`Ticker`) доступны только вне
//! wasm: в браузере ту же роль играют `spawn_local` и интервал Leptos.

mod api;
mod clock;
mod countdown;
mod error;
mod fetch;
mod models;
mod pager;
pub mod routes;
mod status;
pub mod wire;

#[cfg(not(target_arch = "wasm32"))]
mod sync;
#[cfg(not(target_arch = "wasm32"))]
mod ticker;

pub use api::AuctionApi;
pub use clock::{SystemClock, TimeSource};
pub use countdown::{Countdown, CountdownEngine, TICK_INTERVAL, pad_unit};
pub use error::{DomainError, FetchError};
pub use fetch::FetchState;
pub use models::{AuctionRecord, Bid, Role, Viewer, Winner, format_amount};
pub use pager::{BidPager, PAGE_SIZE, highest_bid};
pub use status::{
    AdminControls, AuctionStatus, BidPage, BidSection, DetailView, StatusInputs, StatusOptions,
};

#[cfg(not(target_arch = "wasm32"))]
pub use sync::{DataSync, Snapshot};
#[cfg(not(target_arch = "wasm32"))]
pub use ticker::{CountdownSchedule, Ticker};
