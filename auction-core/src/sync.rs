//! Независимая загрузка источников детальной страницы.
//!
//! Каждый источник грузится своей задачей и пишет только в свой слот снимка.
//! Падение или задержка одного слота не трогает остальные.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::AuctionApi;
use crate::countdown::Countdown;
use crate::error::FetchError;
use crate::fetch::FetchState;
use crate::models::{AuctionRecord, Viewer, Winner};
use crate::pager::BidPager;
use crate::routes;
use crate::status::{AuctionStatus, StatusInputs, StatusOptions};

/// Снимок всех слотов на данный момент.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub auction_id: Option<String>,
    pub auction: FetchState<AuctionRecord>,
    pub viewer: FetchState<Viewer>,
    pub winner: FetchState<Option<Winner>>,
    pub bids: FetchState<BidPager>,
    /// Заполняется после успешного удаления аукциона.
    pub redirect: Option<String>,
}

impl Snapshot {
    /// Момент закрытия, пока запись аукциона загружена.
    pub fn end_date(&self) -> Option<DateTime<Utc>> {
        self.auction.ready().map(|auction| auction.end_date)
    }

    /// Сводит слоты в одно состояние показа.
    pub fn status(&self, countdown: Countdown, options: StatusOptions) -> AuctionStatus<'_> {
        AuctionStatus::derive(StatusInputs {
            auction: &self.auction,
            viewer: &self.viewer,
            winner: &self.winner,
            bids: &self.bids,
            countdown,
            redirect: self.redirect.as_deref(),
            options,
        })
    }
}

#[derive(Debug, Default)]
struct Shared {
    generation: u64,
    snapshot: Snapshot,
}

/// Загрузчик данных детальной страницы одного аукциона.
pub struct DataSync {
    api: Arc<dyn AuctionApi>,
    credential: Option<String>,
    shared: Arc<Mutex<Shared>>,
    tasks: Vec<JoinHandle<()>>,
    updates: watch::Sender<u64>,
}

impl DataSync {
    /// `credential` это bearer-токен пользователя, если он есть.
    pub fn new(api: Arc<dyn AuctionApi>, credential: Option<String>) -> Self {
        let (updates, _) = watch::channel(0);
        Self {
            api,
            credential,
            shared: Arc::new(Mutex::new(Shared::default())),
            tasks: Vec::new(),
            updates,
        }
    }

    /// Канал, в котором растёт счётчик после каждой записи в снимок.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.updates.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.lock().snapshot.clone()
    }

    /// Открывает страницу аукциона `auction_id`.
    ///
    /// Прошлые запросы отменяются, все слоты сбрасываются в `Pending`, и
    /// четыре запроса уходят одновременно. После ухода со страницы не делает
    /// ничего.
    pub fn mount(&mut self, auction_id: &str) {
        self.abort_tasks();

        let generation = {
            let mut shared = self.lock();
            if let Some(redirect) = &shared.snapshot.redirect {
                debug!(%redirect, "detail view has been left, mount ignored");
                return;
            }
            shared.generation += 1;
            shared.snapshot = Snapshot {
                auction_id: Some(auction_id.to_string()),
                ..Snapshot::default()
            };
            shared.generation
        };
        self.notify();

        let id = auction_id.to_string();

        let api = Arc::clone(&self.api);
        let auction_id = id.clone();
        self.spawn_slot(
            "auction",
            generation,
            async move { api.fetch_auction(&auction_id).await },
            |snapshot, state| snapshot.auction = state,
        );

        match self.credential.clone() {
            Some(token) => {
                let api = Arc::clone(&self.api);
                self.spawn_slot(
                    "viewer",
                    generation,
                    async move { api.resolve_viewer(&token).await },
                    |snapshot, state| snapshot.viewer = state,
                );
            }
            None => {
                debug!("no credential, viewer stays unresolved");
                self.lock().snapshot.viewer = FetchState::Failed(FetchError::Unauthorized);
                self.notify();
            }
        }

        let api = Arc::clone(&self.api);
        let auction_id = id.clone();
        self.spawn_slot(
            "winner",
            generation,
            async move { api.fetch_winner(&auction_id).await },
            |snapshot, state| snapshot.winner = state,
        );

        let api = Arc::clone(&self.api);
        self.spawn_slot(
            "bids",
            generation,
            async move { api.fetch_bids(&id).await.map(BidPager::new) },
            |snapshot, state| snapshot.bids = state,
        );
    }

    /// Ждёт завершения всех запущенных запросов.
    pub async fn settled(&mut self) {
        for task in self.tasks.drain(..) {
            if let Err(err) = task.await {
                if err.is_panic() {
                    warn!(error = %err, "fetch task panicked");
                }
            }
        }
    }

    /// Переходит на страницу ставок `page`; `false`, если номер вне диапазона.
    pub fn go_to_page(&self, page: usize) -> bool {
        self.update_pager(|pager| pager.go_to(page))
    }

    pub fn next_page(&self) -> bool {
        self.update_pager(BidPager::next)
    }

    pub fn previous_page(&self) -> bool {
        self.update_pager(BidPager::previous)
    }

    /// Удаляет открытый аукцион.
    ///
    /// При успехе страница "уходит": запросы отменяются, слоты очищаются,
    /// возвращается адрес для перехода. При ошибке снимок не меняется.
    pub async fn delete(&mut self) -> Result<String, FetchError> {
        let auction_id = self
            .lock()
            .snapshot
            .auction_id
            .clone()
            .ok_or_else(|| FetchError::NotFound("no auction is mounted".to_string()))?;

        if let Err(err) = self.api.delete_auction(&auction_id).await {
            warn!(%auction_id, error = %err, "failed to delete auction");
            return Err(err);
        }

        info!(%auction_id, "auction deleted, leaving detail view");
        self.abort_tasks();
        {
            let mut shared = self.lock();
            shared.generation += 1;
            shared.snapshot = Snapshot {
                redirect: Some(routes::AUCTIONS_INDEX.to_string()),
                ..Snapshot::default()
            };
        }
        self.notify();

        Ok(routes::AUCTIONS_INDEX.to_string())
    }

    /// Закрывает страницу: отменяет запросы и очищает слоты.
    pub fn unmount(&mut self) {
        self.abort_tasks();
        {
            let mut shared = self.lock();
            shared.generation += 1;
            let redirect = shared.snapshot.redirect.take();
            shared.snapshot = Snapshot {
                redirect,
                ..Snapshot::default()
            };
        }
        self.notify();
    }

    fn spawn_slot<T, F>(
        &mut self,
        slot: &'static str,
        generation: u64,
        fetch: F,
        write: fn(&mut Snapshot, FetchState<T>),
    ) where
        T: Send + 'static,
        F: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let shared = Arc::clone(&self.shared);
        let updates = self.updates.clone();

        self.tasks.push(tokio::spawn(async move {
            let result = fetch.await;
            if let Err(err) = &result {
                warn!(slot, error = %err, "fetch failed");
            }

            {
                let mut shared = shared.lock().unwrap_or_else(PoisonError::into_inner);
                if shared.generation != generation {
                    debug!(slot, "dropping result of a previous mount");
                    return;
                }
                write(&mut shared.snapshot, FetchState::from_result(result));
            }
            debug!(slot, "slot updated");
            updates.send_modify(|revision| *revision += 1);
        }));
    }

    fn update_pager(&self, change: impl FnOnce(&mut BidPager) -> bool) -> bool {
        let changed = self
            .lock()
            .snapshot
            .bids
            .ready_mut()
            .is_some_and(change);
        if changed {
            self.notify();
        }
        changed
    }

    fn notify(&self) {
        self.updates.send_modify(|revision| *revision += 1);
    }

    fn abort_tasks(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for DataSync {
    fn drop(&mut self) {
        self.abort_tasks();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use tokio::sync::{Notify, mpsc};

    use super::{DataSync, Snapshot};
    use crate::api::AuctionApi;
    use crate::countdown::Countdown;
    use crate::error::FetchError;
    use crate::fetch::FetchState;
    use crate::models::{AuctionRecord, Bid, Role, Viewer, Winner};
    use crate::status::{AuctionStatus, BidSection, StatusOptions};
    use crate::ticker::CountdownSchedule;

    fn now() -> chrono::DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).single().expect("valid ts")
    }

    fn bid(id: usize, amount: f64) -> Bid {
        Bid {
            id: format!("b{id}"),
            username: format!("user{id}"),
            amount,
            created_at: now(),
        }
    }

    #[derive(Clone, Default)]
    struct FakeApi {
        bids: Arc<Mutex<Vec<Bid>>>,
        winner: Arc<Mutex<Option<Winner>>>,
        role: Arc<Mutex<Option<Role>>>,
        fail_auction: Arc<Mutex<bool>>,
        fail_winner: Arc<Mutex<bool>>,
        fail_delete: Arc<Mutex<bool>>,
        viewer_gate: Arc<Mutex<Option<Arc<Notify>>>>,
        auction_calls: Arc<AtomicUsize>,
        viewer_calls: Arc<AtomicUsize>,
        delete_calls: Arc<AtomicUsize>,
    }

    impl FakeApi {
        fn admin() -> Self {
            let api = Self::default();
            *api.role.lock().unwrap() = Some(Role::Admin);
            api
        }
    }

    #[async_trait]
    impl AuctionApi for FakeApi {
        async fn fetch_auction(&self, id: &str) -> Result<AuctionRecord, FetchError> {
            self.auction_calls.fetch_add(1, Ordering::SeqCst);
            if *self.fail_auction.lock().unwrap() {
                return Err(FetchError::NotFound(format!("auction {id}")));
            }
            Ok(AuctionRecord::new(id, "Lamp", "Brass lamp", 25.0, now() + Duration::hours(1))?)
        }

        async fn delete_auction(&self, _id: &str) -> Result<(), FetchError> {
            self.delete_calls.fetch_add(1, Ordering::SeqCst);
            if *self.fail_delete.lock().unwrap() {
                return Err(FetchError::Transport("connection reset".to_string()));
            }
            Ok(())
        }

        async fn fetch_winner(&self, _id: &str) -> Result<Option<Winner>, FetchError> {
            if *self.fail_winner.lock().unwrap() {
                return Err(FetchError::Transport("timeout".to_string()));
            }
            Ok(self.winner.lock().unwrap().clone())
        }

        async fn fetch_bids(&self, _auction_id: &str) -> Result<Vec<Bid>, FetchError> {
            Ok(self.bids.lock().unwrap().clone())
        }

        async fn resolve_viewer(&self, token: &str) -> Result<Viewer, FetchError> {
            self.viewer_calls.fetch_add(1, Ordering::SeqCst);
            let gate = self.viewer_gate.lock().unwrap().clone();
            if let Some(gate) = gate {
                gate.notified().await;
            }
            let role = self.role.lock().unwrap().clone().unwrap_or_default();
            Ok(Viewer {
                id: "u1".to_string(),
                username: format!("holder-of-{token}"),
                role,
            })
        }
    }

    fn sync_with(api: &FakeApi, token: Option<&str>) -> DataSync {
        DataSync::new(Arc::new(api.clone()), token.map(str::to_string))
    }

    fn detail_status(snapshot: &Snapshot) -> AuctionStatus<'_> {
        let countdown = snapshot
            .end_date()
            .map(|end| Countdown::between(end, now()))
            .unwrap_or_default();
        snapshot.status(countdown, StatusOptions::default())
    }

    #[tokio::test]
    async fn mount_fills_every_slot() {
        let api = FakeApi::admin();
        *api.bids.lock().unwrap() = vec![bid(1, 50.0), bid(2, 120.0), bid(3, 80.0)];

        let mut sync = sync_with(&api, Some("token"));
        sync.mount("a1");
        sync.settled().await;

        let snapshot = sync.snapshot();
        assert_eq!(snapshot.auction_id.as_deref(), Some("a1"));
        assert_eq!(snapshot.auction.ready().map(|a| a.id.as_str()), Some("a1"));
        assert_eq!(snapshot.viewer.ready().map(|v| v.role.clone()), Some(Role::Admin));
        assert_eq!(snapshot.winner, FetchState::Ready(None));

        match detail_status(&snapshot) {
            AuctionStatus::Ready(view) => {
                assert_eq!(view.highest_bid, 120.0);
                assert!(view.admin_controls.is_some());
                assert!(matches!(view.bids, BidSection::Page(_)));
            }
            other => panic!("expected full view, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_viewer_does_not_block_other_slots() {
        let api = FakeApi::default();
        let gate = Arc::new(Notify::new());
        *api.viewer_gate.lock().unwrap() = Some(Arc::clone(&gate));

        let mut sync = sync_with(&api, Some("token"));
        let mut updates = sync.subscribe();
        sync.mount("a1");

        loop {
            let snapshot = sync.snapshot();
            if snapshot.auction.is_settled()
                && snapshot.winner.is_settled()
                && snapshot.bids.is_settled()
            {
                assert!(snapshot.viewer.is_pending());
                assert_eq!(detail_status(&snapshot), AuctionStatus::LoadingProfile);
                break;
            }
            updates.changed().await.expect("sync is alive");
        }

        gate.notify_one();
        sync.settled().await;
        assert!(sync.snapshot().viewer.ready().is_some());
    }

    #[tokio::test]
    async fn failed_slots_stay_isolated() {
        let api = FakeApi::default();
        *api.fail_winner.lock().unwrap() = true;

        let mut sync = sync_with(&api, Some("token"));
        sync.mount("a1");
        sync.settled().await;

        let snapshot = sync.snapshot();
        assert!(matches!(snapshot.winner, FetchState::Failed(FetchError::Transport(_))));
        assert!(snapshot.auction.ready().is_some());
        assert!(snapshot.viewer.ready().is_some());
        assert!(snapshot.bids.ready().is_some());
    }

    #[tokio::test]
    async fn failed_auction_renders_not_found() {
        let api = FakeApi::default();
        *api.fail_auction.lock().unwrap() = true;

        let mut sync = sync_with(&api, Some("token"));
        sync.mount("missing");
        sync.settled().await;

        assert_eq!(detail_status(&sync.snapshot()), AuctionStatus::NotFound);
    }

    #[tokio::test]
    async fn missing_credential_skips_viewer_request() {
        let api = FakeApi::default();
        let mut sync = sync_with(&api, None);
        sync.mount("a1");
        sync.settled().await;

        let snapshot = sync.snapshot();
        assert_eq!(snapshot.viewer, FetchState::Failed(FetchError::Unauthorized));
        assert_eq!(api.viewer_calls.load(Ordering::SeqCst), 0);
        assert_eq!(detail_status(&snapshot), AuctionStatus::LoadingProfile);

        let status = snapshot.status(
            Countdown::between(now() + Duration::hours(1), now()),
            StatusOptions {
                anonymous_viewing: true,
            },
        );
        assert!(matches!(status, AuctionStatus::Ready(_)));
    }

    #[tokio::test]
    async fn remount_drops_previous_auction() {
        let api = FakeApi::default();
        let mut sync = sync_with(&api, Some("token"));

        sync.mount("a1");
        sync.mount("a2");
        sync.settled().await;

        let snapshot = sync.snapshot();
        assert_eq!(snapshot.auction_id.as_deref(), Some("a2"));
        assert_eq!(snapshot.auction.ready().map(|a| a.id.as_str()), Some("a2"));
    }

    #[tokio::test]
    async fn page_requests_go_through_pager_clamp() {
        let api = FakeApi::default();
        *api.bids.lock().unwrap() = (1..=23).map(|i| bid(i, i as f64)).collect();

        let mut sync = sync_with(&api, Some("token"));
        sync.mount("a1");
        sync.settled().await;

        assert!(!sync.go_to_page(0));
        assert!(!sync.go_to_page(4));
        assert!(sync.go_to_page(3));
        assert!(!sync.next_page());

        let snapshot = sync.snapshot();
        let pager = snapshot.bids.ready().expect("bids loaded");
        assert_eq!(pager.current_page(), 3);
        assert_eq!(pager.visible().len(), 3);

        assert!(sync.previous_page());
        assert_eq!(sync.snapshot().bids.ready().map(|p| p.current_page()), Some(2));
    }

    #[tokio::test]
    async fn successful_delete_leaves_the_view() {
        let api = FakeApi::admin();
        let mut sync = sync_with(&api, Some("token"));
        sync.mount("a1");
        sync.settled().await;

        let (tx, _rx) = mpsc::unbounded_channel();
        let mut schedule = CountdownSchedule::new(tx);
        schedule.sync(sync.snapshot().auction.ready().is_some());
        assert!(schedule.is_running());

        let redirect = sync.delete().await.expect("delete must succeed");
        assert_eq!(redirect, "/auctions");

        let snapshot = sync.snapshot();
        schedule.sync(snapshot.auction.ready().is_some());
        assert!(!schedule.is_running());
        assert_eq!(
            snapshot.status(Countdown::ZERO, StatusOptions::default()),
            AuctionStatus::Redirected("/auctions")
        );

        // После ухода со страницы новых запросов нет.
        sync.mount("a1");
        sync.settled().await;
        assert_eq!(api.auction_calls.load(Ordering::SeqCst), 1);
        assert!(sync.snapshot().auction.is_pending());
    }

    #[tokio::test]
    async fn failed_delete_keeps_the_view() {
        let api = FakeApi::admin();
        *api.fail_delete.lock().unwrap() = true;

        let mut sync = sync_with(&api, Some("token"));
        sync.mount("a1");
        sync.settled().await;
        let before = sync.snapshot();

        let err = sync.delete().await.expect_err("delete must fail");
        assert!(matches!(err, FetchError::Transport(_)));
        assert_eq!(api.delete_calls.load(Ordering::SeqCst), 1);
        assert_eq!(sync.snapshot(), before);
    }

    #[tokio::test]
    async fn delete_without_mount_is_rejected() {
        let api = FakeApi::admin();
        let mut sync = sync_with(&api, Some("token"));

        let err = sync.delete().await.expect_err("nothing to delete");
        assert!(matches!(err, FetchError::NotFound(_)));
        assert_eq!(api.delete_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unmount_clears_slots() {
        let api = FakeApi::default();
        let mut sync = sync_with(&api, Some("token"));
        sync.mount("a1");
        sync.settled().await;

        sync.unmount();
        assert_eq!(sync.snapshot(), Snapshot::default());
    }
}
