pub(crate) mod auction_item;
pub(crate) mod bid_list;
pub(crate) mod countdown_card;
