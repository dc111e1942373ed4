use auction_core::{AuctionStatus, BidSection, Countdown, DetailView, format_amount, pad_unit};
use chrono::Local;

pub fn render_status(status: &AuctionStatus<'_>) -> String {
    match status {
        AuctionStatus::Redirected(path) => format!("Auction deleted. Redirecting to {path}\n"),
        AuctionStatus::NotFound => "Auction item not found.\n".to_string(),
        AuctionStatus::LoadingProfile => "Loading user profile...\n".to_string(),
        AuctionStatus::Ready(view) => render_detail(view),
    }
}

fn render_detail(view: &DetailView<'_>) -> String {
    let auction = view.auction;
    let heading = if view.ended { "Auction Ended" } else { "Time Remaining" };

    let mut lines = vec![
        auction.title.clone(),
        auction.description.clone(),
        format!("Starting Bid: {}", format_amount(auction.starting_bid)),
        format!("Current Highest Bid: {}", format_amount(view.highest_bid)),
        String::new(),
        format!("[{heading}] {}", format_countdown(&view.countdown)),
    ];

    if let Some(winner) = view.winner {
        lines.push(format!("Congratulations {}!", winner.username));
        lines.push("You have won the auction!".to_string());
    }

    if let Some(controls) = &view.admin_controls {
        lines.push(String::new());
        lines.push(format!("Edit Auction: {}", controls.edit_link));
        lines.push(format!("Delete Auction: auction-cli delete --id {}", auction.id));
    }

    lines.push(String::new());
    lines.push("Bids".to_string());
    match &view.bids {
        BidSection::Loading => lines.push("Loading bids...".to_string()),
        BidSection::Empty => lines.push("No bids placed yet.".to_string()),
        BidSection::Page(page) => {
            lines.extend(page.bids.iter().map(|bid| {
                let created_at = bid.created_at.with_timezone(&Local);
                format!(
                    "- {} bid: {}  (Time: {})",
                    bid.username,
                    format_amount(bid.amount),
                    created_at.format("%d.%m.%Y %H:%M:%S")
                )
            }));
            lines.push(format!("Page {} of {}", page.current_page, page.total_pages));
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

pub fn format_countdown(countdown: &Countdown) -> String {
    countdown
        .units()
        .iter()
        .map(|(label, value)| format!("{}{label}", pad_unit(*value)))
        .collect::<Vec<_>>()
        .join(" ")
}
