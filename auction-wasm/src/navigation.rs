use auction_core::routes;
use leptos::logging::warn;
use leptos::prelude::window;

/// Идентификатор аукциона из адресной строки (`/auctions/{id}`).
pub(crate) fn current_auction_id() -> Option<String> {
    let path = window().location().pathname().ok()?;
    routes::auction_id_from_path(&path)
}

/// Программный переход, например после удаления аукциона.
pub(crate) fn redirect(path: &str) {
    if let Err(err) = window().location().set_href(path) {
        warn!("failed to navigate to {path}: {err:?}");
    }
}
