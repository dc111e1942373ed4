//! Сведение всех источников детальной страницы в одно состояние показа.

use crate::countdown::Countdown;
use crate::fetch::FetchState;
use crate::models::{AuctionRecord, Bid, Viewer, Winner};
use crate::pager::BidPager;
use crate::routes;

/// Настройки сведения.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusOptions {
    /// Показывать аукцион, не дожидаясь профиля пользователя.
    ///
    /// По умолчанию выключено: страница ждёт профиль, как и раньше.
    pub anonymous_viewing: bool,
}

/// Последний снимок всех входов на момент отрисовки.
#[derive(Debug, Clone, Copy)]
pub struct StatusInputs<'a> {
    pub auction: &'a FetchState<AuctionRecord>,
    pub viewer: &'a FetchState<Viewer>,
    pub winner: &'a FetchState<Option<Winner>>,
    pub bids: &'a FetchState<BidPager>,
    /// Отсчёт, посчитанный на текущем тике.
    pub countdown: Countdown,
    /// Куда ушла страница после удаления аукциона, если ушла.
    pub redirect: Option<&'a str>,
    pub options: StatusOptions,
}

/// Взаимоисключающие состояния показа.
#[derive(Debug, Clone, PartialEq)]
pub enum AuctionStatus<'a> {
    /// Аукцион удалён, страница ушла по указанному адресу.
    Redirected(&'a str),
    /// Аукцион не получен (ещё грузится или запрос упал).
    NotFound,
    /// Аукцион есть, профиль пользователя ещё нет.
    LoadingProfile,
    /// Полная страница.
    Ready(DetailView<'a>),
}

/// Полная детальная страница.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView<'a> {
    pub auction: &'a AuctionRecord,
    pub highest_bid: f64,
    pub countdown: Countdown,
    pub ended: bool,
    /// Заполнен только для закончившегося аукциона с известным победителем.
    pub winner: Option<&'a Winner>,
    /// Заполнен только для администратора.
    pub admin_controls: Option<AdminControls>,
    pub bids: BidSection<'a>,
}

/// Кнопки администратора.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminControls {
    pub edit_link: String,
}

/// Секция ставок живёт своей жизнью и грузится отдельно.
#[derive(Debug, Clone, PartialEq)]
pub enum BidSection<'a> {
    Loading,
    Empty,
    Page(BidPage<'a>),
}

/// Видимая страница ставок.
#[derive(Debug, Clone, PartialEq)]
pub struct BidPage<'a> {
    pub bids: &'a [Bid],
    pub current_page: usize,
    pub total_pages: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

impl<'a> AuctionStatus<'a> {
    /// Решает, что показывать, в порядке приоритета:
    /// уход со страницы, отсутствие аукциона, ожидание профиля, полная страница.
    pub fn derive(inputs: StatusInputs<'a>) -> Self {
        if let Some(redirect) = inputs.redirect {
            return Self::Redirected(redirect);
        }

        let Some(auction) = inputs.auction.ready() else {
            return Self::NotFound;
        };

        let viewer = inputs.viewer.ready();
        if viewer.is_none() && !inputs.options.anonymous_viewing {
            return Self::LoadingProfile;
        }

        let ended = inputs.countdown.is_ended();
        let winner = if ended {
            inputs.winner.ready().and_then(Option::as_ref)
        } else {
            None
        };

        let admin_controls = viewer
            .filter(|viewer| viewer.role.is_admin())
            .map(|_| AdminControls {
                edit_link: routes::edit_auction(&auction.id),
            });

        let highest_bid = inputs.bids.ready().map_or(0.0, BidPager::highest_bid);

        Self::Ready(DetailView {
            auction,
            highest_bid,
            countdown: inputs.countdown,
            ended,
            winner,
            admin_controls,
            bids: bid_section(inputs.bids),
        })
    }
}

fn bid_section(bids: &FetchState<BidPager>) -> BidSection<'_> {
    match bids {
        FetchState::Pending => BidSection::Loading,
        FetchState::Failed(_) => BidSection::Empty,
        FetchState::Ready(pager) if pager.visible().is_empty() => BidSection::Empty,
        FetchState::Ready(pager) => BidSection::Page(BidPage {
            bids: pager.visible(),
            current_page: pager.current_page(),
            total_pages: pager.total_pages(),
            has_previous: pager.has_previous(),
            has_next: pager.has_next(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::error::FetchError;
    use crate::models::Role;

    fn now() -> chrono::DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).single().expect("valid ts")
    }

    fn auction(end_in_ms: i64) -> AuctionRecord {
        AuctionRecord::new(
            "a1",
            "Lamp",
            "Brass lamp",
            25.0,
            now() + Duration::milliseconds(end_in_ms),
        )
        .expect("valid auction")
    }

    fn viewer(role: Role) -> Viewer {
        Viewer {
            id: "u1".to_string(),
            username: "alice".to_string(),
            role,
        }
    }

    fn bid(amount: f64) -> Bid {
        Bid {
            id: format!("b{amount}"),
            username: "bob".to_string(),
            amount,
            created_at: now(),
        }
    }

    struct Slots {
        auction: FetchState<AuctionRecord>,
        viewer: FetchState<Viewer>,
        winner: FetchState<Option<Winner>>,
        bids: FetchState<BidPager>,
        options: StatusOptions,
    }

    impl Slots {
        fn loaded(end_in_ms: i64) -> Self {
            Self {
                auction: FetchState::Ready(auction(end_in_ms)),
                viewer: FetchState::Ready(viewer(Role::User)),
                winner: FetchState::Ready(None),
                bids: FetchState::Ready(BidPager::default()),
                options: StatusOptions::default(),
            }
        }

        fn status(&self) -> AuctionStatus<'_> {
            let countdown = self
                .auction
                .ready()
                .map(|a| Countdown::between(a.end_date, now()))
                .unwrap_or_default();
            AuctionStatus::derive(StatusInputs {
                auction: &self.auction,
                viewer: &self.viewer,
                winner: &self.winner,
                bids: &self.bids,
                countdown,
                redirect: None,
                options: self.options,
            })
        }

        fn detail(&self) -> DetailView<'_> {
            match self.status() {
                AuctionStatus::Ready(view) => view,
                other => panic!("expected full view, got {other:?}"),
            }
        }
    }

    #[test]
    fn missing_or_failed_auction_is_not_found() {
        let mut slots = Slots::loaded(10_000);
        slots.auction = FetchState::Pending;
        assert_eq!(slots.status(), AuctionStatus::NotFound);

        slots.auction = FetchState::Failed(FetchError::NotFound("a1".to_string()));
        assert_eq!(slots.status(), AuctionStatus::NotFound);
    }

    #[test]
    fn not_found_wins_over_loading_profile() {
        let mut slots = Slots::loaded(10_000);
        slots.auction = FetchState::Pending;
        slots.viewer = FetchState::Pending;
        assert_eq!(slots.status(), AuctionStatus::NotFound);
    }

    #[test]
    fn unresolved_viewer_blocks_by_default() {
        let mut slots = Slots::loaded(10_000);
        slots.viewer = FetchState::Pending;
        assert_eq!(slots.status(), AuctionStatus::LoadingProfile);

        slots.viewer = FetchState::Failed(FetchError::Unauthorized);
        assert_eq!(slots.status(), AuctionStatus::LoadingProfile);
    }

    #[test]
    fn anonymous_viewing_skips_profile_gate_without_admin_controls() {
        let mut slots = Slots::loaded(10_000);
        slots.viewer = FetchState::Failed(FetchError::Unauthorized);
        slots.options.anonymous_viewing = true;

        let view = slots.detail();
        assert!(view.admin_controls.is_none());
    }

    #[test]
    fn fresh_auction_without_bids() {
        let slots = Slots::loaded(3_661_000);
        let view = slots.detail();

        assert_eq!(
            view.countdown,
            Countdown {
                days: 0,
                hours: 1,
                minutes: 1,
                seconds: 1,
            }
        );
        assert!(!view.ended);
        assert_eq!(view.highest_bid, 0.0);
        assert_eq!(view.bids, BidSection::Empty);
    }

    #[test]
    fn highest_bid_comes_from_all_bids() {
        let mut slots = Slots::loaded(10_000);
        slots.bids = FetchState::Ready(BidPager::new(vec![bid(50.0), bid(120.0), bid(80.0)]));

        let view = slots.detail();
        assert_eq!(view.highest_bid, 120.0);
        match view.bids {
            BidSection::Page(page) => {
                assert_eq!(page.bids.len(), 3);
                assert_eq!(page.bids[0].amount, 120.0);
                assert_eq!(page.current_page, 1);
                assert_eq!(page.total_pages, 1);
                assert!(!page.has_previous);
                assert!(!page.has_next);
            }
            other => panic!("expected a page, got {other:?}"),
        }
    }

    #[test]
    fn bid_section_loads_independently() {
        let mut slots = Slots::loaded(10_000);
        slots.bids = FetchState::Pending;
        assert_eq!(slots.detail().bids, BidSection::Loading);

        slots.bids = FetchState::Failed(FetchError::Transport("timeout".to_string()));
        let view = slots.detail();
        assert_eq!(view.bids, BidSection::Empty);
        assert_eq!(view.highest_bid, 0.0);
    }

    #[test]
    fn winner_shown_only_when_ended_and_present() {
        let winner = Winner {
            username: "carol".to_string(),
        };

        let mut ended = Slots::loaded(-1_000);
        ended.winner = FetchState::Ready(Some(winner.clone()));
        let view = ended.detail();
        assert!(view.ended);
        assert_eq!(view.winner, Some(&winner));

        ended.winner = FetchState::Ready(None);
        assert!(ended.detail().winner.is_none());

        ended.winner = FetchState::Failed(FetchError::Transport("reset".to_string()));
        assert!(ended.detail().winner.is_none());

        let mut running = Slots::loaded(60_000);
        running.winner = FetchState::Ready(Some(winner));
        let view = running.detail();
        assert!(!view.ended);
        assert!(view.winner.is_none());
    }

    #[test]
    fn admin_controls_only_for_admin_role() {
        let mut slots = Slots::loaded(10_000);

        slots.viewer = FetchState::Ready(viewer(Role::Admin));
        assert_eq!(
            slots.detail().admin_controls,
            Some(AdminControls {
                edit_link: "/edit-auction/a1".to_string(),
            })
        );

        for role in [
            Role::User,
            Role::Other("Admin".to_string()),
            Role::Other("root".to_string()),
        ] {
            slots.viewer = FetchState::Ready(viewer(role));
            assert!(slots.detail().admin_controls.is_none());
        }
    }

    #[test]
    fn redirect_takes_priority() {
        let slots = Slots::loaded(10_000);
        let status = AuctionStatus::derive(StatusInputs {
            auction: &slots.auction,
            viewer: &slots.viewer,
            winner: &slots.winner,
            bids: &slots.bids,
            countdown: Countdown::ZERO,
            redirect: Some(routes::AUCTIONS_INDEX),
            options: StatusOptions::default(),
        });
        assert_eq!(status, AuctionStatus::Redirected("/auctions"));
    }
}
