use auction_core::{AuctionRecord, BidPager, Countdown, FetchState, Viewer, Winner};
use leptos::prelude::*;

/// Слоты детальной страницы. Каждый запрос пишет только в свой слот.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AuctionState {
    pub(crate) auction_id: RwSignal<Option<String>>,
    pub(crate) auction: RwSignal<FetchState<AuctionRecord>>,
    pub(crate) viewer: RwSignal<FetchState<Viewer>>,
    pub(crate) winner: RwSignal<FetchState<Option<Winner>>>,
    pub(crate) bids: RwSignal<FetchState<BidPager>>,
    pub(crate) countdown: RwSignal<Countdown>,
    /// Растёт при каждой смене аукциона и при уходе со страницы;
    /// ответы старых запросов по нему отбрасываются.
    generation: StoredValue<u64>,
}

impl AuctionState {
    pub(crate) fn new() -> Self {
        Self {
            auction_id: RwSignal::new(None),
            auction: RwSignal::new(FetchState::Pending),
            viewer: RwSignal::new(FetchState::Pending),
            winner: RwSignal::new(FetchState::Pending),
            bids: RwSignal::new(FetchState::Pending),
            countdown: RwSignal::new(Countdown::ZERO),
            generation: StoredValue::new(0),
        }
    }

    /// Сбрасывает слоты под новый аукцион и возвращает номер поколения.
    pub(crate) fn reset(&self, auction_id: &str) -> u64 {
        let generation = self.bump_generation();
        self.auction_id.set(Some(auction_id.to_string()));
        self.auction.set(FetchState::Pending);
        self.viewer.set(FetchState::Pending);
        self.winner.set(FetchState::Pending);
        self.bids.set(FetchState::Pending);
        self.countdown.set(Countdown::ZERO);
        generation
    }

    /// Ответы всех начатых запросов после этого вызова будут отброшены.
    pub(crate) fn bump_generation(&self) -> u64 {
        self.generation
            .try_update_value(|generation| {
                *generation += 1;
                *generation
            })
            .unwrap_or_default()
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.generation.try_get_value() == Some(generation)
    }

    /// Переход по страницам ставок; `false`, если запрос вне диапазона.
    pub(crate) fn change_page(&self, change: impl FnOnce(&mut BidPager) -> bool) -> bool {
        let mut changed = false;
        self.bids.maybe_update(|bids| {
            changed = bids.ready_mut().is_some_and(change);
            changed
        });
        changed
    }
}
