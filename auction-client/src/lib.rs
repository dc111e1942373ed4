//! HTTP-клиент к серверу аукционов.
//!
//! [`HttpClient`] реализует [`auction_core::AuctionApi`], поэтому его можно
//! отдать прямо в [`auction_core::DataSync`]:
//! - `GET /auctions/{id}` и `DELETE /auctions/{id}`;
//! - `GET /auctions/winner/{id}`;
//! - `GET /bids/{id}`;
//! - `POST /users/profile` с bearer-токеном.
#![warn(missing_docs)]

mod error;
mod http_client;

pub use error::{AuctionClientError, AuctionClientResult};
pub use http_client::HttpClient;
