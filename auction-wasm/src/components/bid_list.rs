use auction_core::{BidPager, BidSection, format_amount};
use chrono::{DateTime, Utc};
use leptos::prelude::*;
use wasm_bindgen::JsValue;

use crate::state::AuctionState;

/// Время ставки в локали браузера.
fn format_created_at(created_at: DateTime<Utc>) -> String {
    let date = js_sys::Date::new(&JsValue::from_f64(created_at.timestamp_millis() as f64));
    date.to_locale_string("default", &JsValue::UNDEFINED).into()
}

pub(crate) fn bid_list(section: BidSection<'_>, state: AuctionState) -> AnyView {
    match section {
        BidSection::Loading => view! { <p class="bids-loading">"Loading bids..."</p> }.into_any(),
        BidSection::Empty => view! { <p class="bids-empty">"No bids placed yet."</p> }.into_any(),
        BidSection::Page(page) => {
            let items = page
                .bids
                .iter()
                .map(|bid| {
                    let username = bid.username.clone();
                    let amount = format_amount(bid.amount);
                    let created_at = format_created_at(bid.created_at);
                    view! {
                        <li class="bid">
                            <p>
                                <strong>{username}</strong>
                                " bid: "
                                {amount}
                            </p>
                            <p>"Time: " {created_at}</p>
                        </li>
                    }
                })
                .collect_view();

            let counter = format!("Page {} of {}", page.current_page, page.total_pages);
            let previous_disabled = !page.has_previous;
            let next_disabled = !page.has_next;

            view! {
                <ul class="bids">{items}</ul>
                <div class="pager">
                    <button
                        on:click=move |_| {
                            state.change_page(BidPager::previous);
                        }
                        disabled=previous_disabled
                    >
                        "Previous"
                    </button>
                    <span>{counter}</span>
                    <button
                        on:click=move |_| {
                            state.change_page(BidPager::next);
                        }
                        disabled=next_disabled
                    >
                        "Next"
                    </button>
                </div>
            }
            .into_any()
        }
    }
}
