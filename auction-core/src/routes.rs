//! Адреса, на которые уходит детальная страница аукциона.

/// Куда уходим после успешного удаления аукциона.
pub const AUCTIONS_INDEX: &str = "/auctions";

/// Ссылка на форму редактирования аукциона `id`.
pub fn edit_auction(id: &str) -> String {
    format!("/edit-auction/{id}")
}

/// Достаёт идентификатор аукциона из пути вида `/auctions/{id}`.
pub fn auction_id_from_path(path: &str) -> Option<String> {
    let rest = path.trim_end_matches('/').strip_prefix(AUCTIONS_INDEX)?;
    let id = rest.strip_prefix('/')?;
    if id.is_empty() || id.contains('/') {
        return None;
    }
    Some(id.to_string())
}
