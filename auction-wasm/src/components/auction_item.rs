use std::future::Future;

use auction_core::{
    AuctionStatus, BidPager, CountdownEngine, DetailView, FetchError, FetchState, StatusInputs,
    StatusOptions, SystemClock, TICK_INTERVAL, format_amount, routes,
};
use leptos::logging::{error, warn};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api;
use crate::components::bid_list::bid_list;
use crate::components::countdown_card::countdown_card;
use crate::navigation;
use crate::state::AuctionState;
use crate::storage;

/// Запускает запрос одного слота; ответ старого поколения отбрасывается.
fn spawn_slot<T, F>(
    state: AuctionState,
    generation: u64,
    slot: &'static str,
    target: RwSignal<FetchState<T>>,
    fetch: F,
) where
    T: Send + Sync + 'static,
    F: Future<Output = Result<T, FetchError>> + 'static,
{
    spawn_local(async move {
        let result = fetch.await;
        if let Err(err) = &result {
            warn!("failed to fetch {slot}: {err}");
        }
        if !state.is_current(generation) {
            return;
        }
        target.try_set(FetchState::from_result(result));
    });
}

/// Четыре независимых запроса; ни один не ждёт другого.
fn load_all(state: AuctionState, auction_id: &str) {
    let generation = state.reset(auction_id);

    let id = auction_id.to_string();
    spawn_slot(state, generation, "auction", state.auction, async move {
        api::fetch_auction(&id).await
    });

    match storage::load_token() {
        Some(token) => spawn_slot(state, generation, "viewer", state.viewer, async move {
            api::fetch_profile(&token).await
        }),
        None => state.viewer.set(FetchState::Failed(FetchError::Unauthorized)),
    }

    let id = auction_id.to_string();
    spawn_slot(state, generation, "winner", state.winner, async move {
        api::fetch_winner(&id).await
    });

    let id = auction_id.to_string();
    spawn_slot(state, generation, "bids", state.bids, async move {
        api::fetch_bids(&id).await.map(BidPager::new)
    });
}

fn stop_countdown(interval: StoredValue<Option<IntervalHandle>>) {
    if let Some(handle) = interval.try_update_value(Option::take).flatten() {
        handle.clear();
    }
}

#[component]
pub(crate) fn AuctionItem(
    #[prop(into)] auction_id: Signal<String>,
    #[prop(optional)] options: StatusOptions,
) -> impl IntoView {
    let state = AuctionState::new();
    let interval = StoredValue::new(None::<IntervalHandle>);

    Effect::new(move |_| {
        let id = auction_id.get();
        load_all(state, &id);
    });

    // Тик живёт, пока загружена запись аукциона.
    Effect::new(move |_| {
        let end_date = state
            .auction
            .with(|auction| auction.ready().map(|auction| auction.end_date));
        stop_countdown(interval);

        let Some(end_date) = end_date else {
            return;
        };

        let engine = CountdownEngine::new(SystemClock);
        let tick = move || {
            state.countdown.try_set(engine.remaining(end_date));
        };
        tick();

        match set_interval_with_handle(tick, TICK_INTERVAL) {
            Ok(handle) => interval.set_value(Some(handle)),
            Err(err) => error!("failed to start countdown: {err:?}"),
        }
    });

    on_cleanup(move || {
        stop_countdown(interval);
        state.bump_generation();
    });

    let on_delete = Callback::new(move |_: ()| {
        let Some(id) = state.auction_id.get_untracked() else {
            return;
        };
        let token = storage::load_token();

        spawn_local(async move {
            match api::delete_auction(token.as_deref(), &id).await {
                Ok(()) => {
                    stop_countdown(interval);
                    state.bump_generation();
                    navigation::redirect(routes::AUCTIONS_INDEX);
                }
                Err(err) => warn!("failed to delete auction {id}: {err}"),
            }
        });
    });

    move || {
        let auction = state.auction.read();
        let viewer = state.viewer.read();
        let winner = state.winner.read();
        let bids = state.bids.read();

        let status = AuctionStatus::derive(StatusInputs {
            auction: &*auction,
            viewer: &*viewer,
            winner: &*winner,
            bids: &*bids,
            countdown: state.countdown.get(),
            redirect: None,
            options,
        });

        match status {
            AuctionStatus::Redirected(_) => ().into_any(),
            AuctionStatus::NotFound => {
                view! { <p class="notice">"Auction item not found."</p> }.into_any()
            }
            AuctionStatus::LoadingProfile => {
                view! { <p class="notice">"Loading user profile..."</p> }.into_any()
            }
            AuctionStatus::Ready(detail) => render_detail(detail, state, on_delete),
        }
    }
}

fn render_detail(detail: DetailView<'_>, state: AuctionState, on_delete: Callback<()>) -> AnyView {
    let auction = detail.auction;
    let title = auction.title.clone();
    let description = auction.description.clone();
    let starting_bid = format_amount(auction.starting_bid);
    let highest_bid = format_amount(detail.highest_bid);
    let winner = detail.winner.map(|winner| winner.username.clone());

    let admin_controls = detail.admin_controls.map(|controls| {
        view! {
            <div class="admin-controls">
                <a href=controls.edit_link>"Edit Auction"</a>
                <button on:click=move |_| on_delete.run(())>"Delete Auction"</button>
            </div>
        }
    });

    view! {
        <div class="auction-item">
            <h2>{title}</h2>
            <p>{description}</p>
            <p>"Starting Bid: " <span class="amount">{starting_bid}</span></p>
            <p>"Current Highest Bid: " <span class="amount">{highest_bid}</span></p>
            {countdown_card(detail.countdown, detail.ended, winner)}
            {admin_controls}
            <h3>"Bids"</h3>
            {bid_list(detail.bids, state)}
        </div>
    }
    .into_any()
}
