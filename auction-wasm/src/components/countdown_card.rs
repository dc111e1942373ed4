use auction_core::{Countdown, pad_unit};
use leptos::prelude::*;

/// Блок обратного отсчёта; цвет зависит от того, закончился ли аукцион.
pub(crate) fn countdown_card(
    countdown: Countdown,
    ended: bool,
    winner: Option<String>,
) -> impl IntoView {
    let (class, heading) = if ended {
        ("countdown countdown-ended", "Auction Ended")
    } else {
        ("countdown countdown-running", "Time Remaining")
    };

    let units = countdown
        .units()
        .into_iter()
        .map(|(label, value)| {
            view! {
                <div class="countdown-card">
                    <div class="countdown-front">{pad_unit(value)}</div>
                    <div class="countdown-back">{label}</div>
                </div>
            }
        })
        .collect_view();

    let winner_banner = winner.map(|username| {
        view! {
            <div class="winner-banner">
                <h3>{format!("Congratulations {username}!")}</h3>
                <p>"You have won the auction!"</p>
            </div>
        }
    });

    view! {
        <div class=class>
            <h3>{heading}</h3>
            <div class="countdown-grid">{units}</div>
            {winner_banner}
        </div>
    }
}
