//! Клиентская пагинация списка ставок.

use crate::models::Bid;

/// Размер страницы списка ставок.
pub const PAGE_SIZE: usize = 10;

/// Отсортированный список ставок и текущая страница.
///
/// Ставки всегда упорядочены по убыванию суммы; равные суммы сохраняют
/// порядок, в котором пришли с сервера.
#[derive(Debug, Clone, PartialEq)]
pub struct BidPager {
    bids: Vec<Bid>,
    current_page: usize,
}

impl Default for BidPager {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl BidPager {
    /// Сортирует `bids` и открывает первую страницу.
    pub fn new(bids: Vec<Bid>) -> Self {
        let mut pager = Self {
            bids: Vec::new(),
            current_page: 1,
        };
        pager.replace(bids);
        pager
    }

    /// Подменяет список ставок и сразу поджимает текущую страницу.
    pub fn replace(&mut self, mut bids: Vec<Bid>) {
        sort_by_amount_desc(&mut bids);
        self.bids = bids;
        self.current_page = self.current_page.min(self.total_pages()).max(1);
    }

    /// Все ставки в порядке показа.
    pub fn bids(&self) -> &[Bid] {
        &self.bids
    }

    /// Номер текущей страницы, начиная с 1.
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// `ceil(len / PAGE_SIZE)`; для пустого списка `0`.
    pub fn total_pages(&self) -> usize {
        self.bids.len().div_ceil(PAGE_SIZE)
    }

    /// Переходит на `page`, если она в `[1, total_pages]`.
    ///
    /// Возвращает `false` и ничего не меняет для номера вне диапазона.
    pub fn go_to(&mut self, page: usize) -> bool {
        if page == 0 || page > self.total_pages() {
            return false;
        }
        self.current_page = page;
        true
    }

    /// Следующая страница; на последней ничего не делает.
    pub fn next(&mut self) -> bool {
        self.go_to(self.current_page + 1)
    }

    /// Предыдущая страница; на первой ничего не делает.
    pub fn previous(&mut self) -> bool {
        match self.current_page.checked_sub(1) {
            Some(page) => self.go_to(page),
            None => false,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages()
    }

    /// Ставки текущей страницы: `[(page - 1) * PAGE_SIZE, page * PAGE_SIZE)`.
    pub fn visible(&self) -> &[Bid] {
        let start = (self.current_page - 1) * PAGE_SIZE;
        let end = (start + PAGE_SIZE).min(self.bids.len());
        self.bids.get(start..end).unwrap_or(&[])
    }

    /// Максимальная ставка или `0.0`, если ставок нет.
    pub fn highest_bid(&self) -> f64 {
        highest_bid(&self.bids)
    }
}

/// Максимальная сумма среди `bids` или `0.0` для пустого списка.
pub fn highest_bid(bids: &[Bid]) -> f64 {
    bids.iter()
        .map(|bid| bid.amount)
        .fold(None, |max: Option<f64>, amount| {
            Some(max.map_or(amount, |max| max.max(amount)))
        })
        .unwrap_or(0.0)
}

fn sort_by_amount_desc(bids: &mut [Bid]) {
    // sort_by стабилен: равные суммы остаются в порядке ответа сервера.
    bids.sort_by(|a, b| b.amount.total_cmp(&a.amount));
}
