use leptos::prelude::*;

use crate::components::auction_item::AuctionItem;
use crate::navigation;

#[component]
pub fn App() -> impl IntoView {
    let auction_id = RwSignal::new(navigation::current_auction_id());

    // Назад/вперёд по истории меняет идентификатор без перезагрузки.
    let listener = window_event_listener(leptos::ev::popstate, move |_| {
        auction_id.set(navigation::current_auction_id());
    });
    on_cleanup(move || listener.remove());

    view! {
        <main class="page">
            {move || match auction_id.get() {
                Some(id) => view! { <AuctionItem auction_id=id /> }.into_any(),
                None => view! { <p class="notice">"Auction item not found."</p> }.into_any(),
            }}
        </main>
    }
}
