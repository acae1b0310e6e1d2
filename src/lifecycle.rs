// 🧾 Reservation Lifecycle Manager
//
// Book / list / update / cancel for one owner, plus the admin aggregate.
// Display indices are 1-based positions within the owner's listing and are
// recomputed on every call; they are never stored.

use crate::error::ReservationError;
use crate::pricing::RoomCategory;
use crate::season;
use crate::store::{Reservation, ReservationBackend, ReservationStore};
use std::collections::HashMap;

type Result<T> = std::result::Result<T, ReservationError>;

// ============================================================================
// UPDATE REQUEST
// ============================================================================

/// Fields to change on an existing reservation. `None` (or `Some(0)` for
/// nights) keeps the current value. The room category cannot be changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReservationUpdate {
    pub nights: Option<i64>,
    pub month: Option<String>,
}

impl ReservationUpdate {
    /// Keep everything as is (price is still recomputed)
    pub fn keep_current() -> Self {
        Self::default()
    }

    /// Build from raw prompt answers: `0` nights and a blank month both mean
    /// "keep current". Zero is never a valid night count here.
    pub fn from_prompt(nights: i64, month: &str) -> Self {
        ReservationUpdate {
            nights: (nights != 0).then_some(nights),
            month: (!month.trim().is_empty()).then(|| month.to_string()),
        }
    }

    pub fn with_nights(mut self, nights: i64) -> Self {
        self.nights = Some(nights);
        self
    }

    pub fn with_month(mut self, month: &str) -> Self {
        self.month = Some(month.to_string());
        self
    }
}

// ============================================================================
// ADMIN SUMMARY
// ============================================================================

/// Aggregate over every reservation in the system
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AdminSummary {
    pub count: usize,
    pub total_revenue: f64,
}

impl AdminSummary {
    pub fn of(reservations: &[Reservation]) -> Self {
        reservations.iter().fold(AdminSummary::default(), |acc, r| AdminSummary {
            count: acc.count + 1,
            total_revenue: acc.total_revenue + r.total_price,
        })
    }
}

/// Per-owner booking count and revenue
#[derive(Debug, Clone, PartialEq)]
pub struct OwnerSummary {
    pub owner: String,
    pub count: usize,
    pub revenue: f64,
}

/// Group reservations by owner, highest revenue first (ties by name)
pub fn summarize_by_owner(reservations: &[Reservation]) -> Vec<OwnerSummary> {
    let mut by_owner: HashMap<&str, (usize, f64)> = HashMap::new();

    for r in reservations {
        let entry = by_owner.entry(r.owner.as_str()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += r.total_price;
    }

    let mut result: Vec<OwnerSummary> = by_owner
        .into_iter()
        .map(|(owner, (count, revenue))| OwnerSummary {
            owner: owner.to_string(),
            count,
            revenue,
        })
        .collect();

    result.sort_by(|a, b| {
        b.revenue
            .total_cmp(&a.revenue)
            .then_with(|| a.owner.cmp(&b.owner))
    });
    result
}

// ============================================================================
// LIFECYCLE MANAGER
// ============================================================================

pub struct ReservationManager<B: ReservationBackend> {
    store: ReservationStore<B>,
}

impl<B: ReservationBackend> ReservationManager<B> {
    pub fn new(store: ReservationStore<B>) -> Self {
        ReservationManager { store }
    }

    pub fn store(&self) -> &ReservationStore<B> {
        &self.store
    }

    /// Create and persist a reservation for `owner`
    pub fn book(
        &mut self,
        owner: &str,
        category_choice: &str,
        nights: i64,
        month: &str,
    ) -> Result<Reservation> {
        let category = RoomCategory::resolve(category_choice)?;
        let nights = validate_nights(nights)?;
        let month = validate_month(month)?;

        let reservation = Reservation::priced(owner, category, nights, &month);
        self.store.append(reservation.clone())?;

        log::info!(
            "{} booked {} x{} in {} ({:.2})",
            owner,
            reservation.category,
            reservation.nights,
            reservation.month,
            reservation.total_price
        );
        Ok(reservation)
    }

    /// Owner's reservations in creation order. Display index `i` refers to
    /// element `i - 1`.
    pub fn list_mine(&self, owner: &str) -> Vec<Reservation> {
        self.store
            .find_by_owner(owner)
            .into_iter()
            .map(|(_, r)| r.clone())
            .collect()
    }

    /// Change nights and/or month of the owner's `display_index`-th
    /// reservation and recompute its price. Validation failures leave the
    /// record untouched.
    pub fn update(
        &mut self,
        owner: &str,
        display_index: usize,
        changes: ReservationUpdate,
    ) -> Result<Reservation> {
        let (index, current) = self.resolve_selection(owner, display_index)?;

        // 0 nights means "keep current", never a real night count
        let nights = match changes.nights {
            Some(0) | None => current.nights,
            Some(n) => validate_nights(n)?,
        };
        let month = match changes.month.as_deref() {
            Some(m) => validate_month(m)?,
            None => current.month.clone(),
        };

        let updated = Reservation::priced(owner, current.category, nights, &month);
        self.store.replace(index, updated.clone())?;

        log::info!(
            "{} updated reservation #{}: {} nights in {} ({:.2})",
            owner,
            display_index,
            updated.nights,
            updated.month,
            updated.total_price
        );
        Ok(updated)
    }

    /// Remove the owner's `display_index`-th reservation. There is no undo.
    pub fn cancel(&mut self, owner: &str, display_index: usize) -> Result<Reservation> {
        let (index, _) = self.resolve_selection(owner, display_index)?;
        let removed = self.store.remove_at(index)?;

        log::info!(
            "{} cancelled reservation #{} ({} in {})",
            owner,
            display_index,
            removed.category,
            removed.month
        );
        Ok(removed)
    }

    /// Every reservation in the system, for the admin views
    pub fn all_reservations(&self) -> &[Reservation] {
        self.store.records()
    }

    pub fn admin_summary(&self) -> AdminSummary {
        AdminSummary::of(self.store.records())
    }

    /// Map a 1-based display index to the internal index and a copy of the
    /// record.
    fn resolve_selection(&self, owner: &str, display_index: usize) -> Result<(usize, Reservation)> {
        let mine = self.store.find_by_owner(owner);

        if mine.is_empty() {
            return Err(ReservationError::NoReservations);
        }

        display_index
            .checked_sub(1)
            .and_then(|i| mine.get(i))
            .map(|(index, r)| (*index, (*r).clone()))
            .ok_or(ReservationError::InvalidSelection {
                index: display_index,
                count: mine.len(),
            })
    }
}

fn validate_nights(nights: i64) -> Result<u32> {
    if nights < 1 {
        return Err(ReservationError::InvalidNights(nights));
    }
    u32::try_from(nights).map_err(|_| ReservationError::InvalidNights(nights))
}

/// Canonical month name, or `InvalidMonth`
fn validate_month(month: &str) -> Result<String> {
    season::parse_month(month)
        .map(|m| m.name().to_string())
        .ok_or_else(|| ReservationError::InvalidMonth(month.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBackend;

    fn manager() -> ReservationManager<MemoryBackend> {
        ReservationManager::new(ReservationStore::open(MemoryBackend::new()).unwrap())
    }

    #[test]
    fn test_book_then_list() {
        let mut m = manager();
        m.book("alice", "Standard", 3, "January").unwrap();

        let mine = m.list_mine("alice");
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].nights, 3);
        assert_eq!(mine[0].total_price, 3000.0);
        assert_eq!(mine[0].month, "January");
        assert_eq!(
            m.store().backend().contents(),
            "alice,Standard,3,3000.00,January\n"
        );
    }

    #[test]
    fn test_book_validation() {
        let mut m = manager();

        assert!(matches!(
            m.book("alice", "Penthouse", 3, "January"),
            Err(ReservationError::InvalidCategory(_))
        ));
        assert!(matches!(
            m.book("alice", "Suite", 0, "January"),
            Err(ReservationError::InvalidNights(0))
        ));
        assert!(matches!(
            m.book("alice", "Suite", -2, "January"),
            Err(ReservationError::InvalidNights(-2))
        ));
        assert!(matches!(
            m.book("alice", "Suite", 2, "Januay"),
            Err(ReservationError::InvalidMonth(_))
        ));
        assert!(m.list_mine("alice").is_empty());
        assert_eq!(m.store().backend().contents(), "");
    }

    #[test]
    fn test_book_normalizes_month_and_prices_peak() {
        let mut m = manager();
        let r = m.book("alice", "2", 2, "DECEMBER").unwrap();

        assert_eq!(r.category, RoomCategory::Deluxe);
        assert_eq!(r.month, "December");
        assert_eq!(r.total_price, 4800.0);
    }

    #[test]
    fn test_list_is_idempotent_and_filtered() {
        let mut m = manager();
        m.book("alice", "Standard", 1, "June").unwrap();
        m.book("bob", "Suite", 1, "June").unwrap();
        m.book("alice", "Deluxe", 2, "July").unwrap();

        let first = m.list_mine("alice");
        let second = m.list_mine("alice");
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_eq!(first[1].category, RoomCategory::Deluxe);
        assert!(m.list_mine("carol").is_empty());
    }

    #[test]
    fn test_update_month_keeps_nights_and_reprices() {
        let mut m = manager();
        let booked = m.book("bob", "Deluxe", 2, "June").unwrap();
        assert_eq!(booked.total_price, 4000.0);

        let updated = m
            .update("bob", 1, ReservationUpdate::from_prompt(0, "December"))
            .unwrap();

        assert_eq!(updated.nights, 2);
        assert_eq!(updated.month, "December");
        assert_eq!(updated.total_price, 4800.0);
        assert_eq!(m.list_mine("bob")[0], updated);
    }

    #[test]
    fn test_update_keeps_category_and_position() {
        let mut m = manager();
        m.book("alice", "Suite", 1, "June").unwrap();
        m.book("bob", "Standard", 1, "June").unwrap();
        m.book("alice", "Standard", 1, "June").unwrap();

        m.update("alice", 2, ReservationUpdate::keep_current().with_nights(4))
            .unwrap();

        let all = m.all_reservations();
        assert_eq!(all[2].owner, "alice");
        assert_eq!(all[2].category, RoomCategory::Standard);
        assert_eq!(all[2].nights, 4);
        assert_eq!(all[2].total_price, 4000.0);
        assert_eq!(all[0].nights, 1);
    }

    #[test]
    fn test_update_rejects_invalid_fields_without_partial_change() {
        let mut m = manager();
        m.book("alice", "Standard", 3, "January").unwrap();
        let before = m.store().backend().contents();

        let err = m.update(
            "alice",
            1,
            ReservationUpdate::keep_current().with_nights(5).with_month("Smarch"),
        );
        assert!(matches!(err, Err(ReservationError::InvalidMonth(_))));

        let err = m.update("alice", 1, ReservationUpdate::keep_current().with_nights(-1));
        assert!(matches!(err, Err(ReservationError::InvalidNights(-1))));

        assert_eq!(m.list_mine("alice")[0].nights, 3);
        assert_eq!(m.store().backend().contents(), before);
    }

    #[test]
    fn test_update_zero_nights_keeps_current() {
        let mut m = manager();
        m.book("bob", "Deluxe", 2, "June").unwrap();

        let updated = m
            .update(
                "bob",
                1,
                ReservationUpdate::keep_current().with_nights(0).with_month("December"),
            )
            .unwrap();

        assert_eq!(updated.nights, 2);
        assert_eq!(updated.month, "December");
        assert_eq!(updated.total_price, 4800.0);
        assert_eq!(
            m.store().backend().contents(),
            "bob,Deluxe,2,4800.00,December\n"
        );
    }

    #[test]
    fn test_update_selection_errors() {
        let mut m = manager();

        assert!(matches!(
            m.update("dave", 1, ReservationUpdate::keep_current()),
            Err(ReservationError::NoReservations)
        ));

        m.book("dave", "Standard", 1, "June").unwrap();
        m.book("dave", "Standard", 2, "June").unwrap();

        assert!(matches!(
            m.update("dave", 5, ReservationUpdate::keep_current()),
            Err(ReservationError::InvalidSelection { index: 5, count: 2 })
        ));
        assert!(matches!(
            m.update("dave", 0, ReservationUpdate::keep_current()),
            Err(ReservationError::InvalidSelection { index: 0, count: 2 })
        ));
    }

    #[test]
    fn test_cancel_removes_exactly_one() {
        let mut m = manager();
        m.book("carol", "Standard", 1, "June").unwrap();
        m.book("alice", "Suite", 1, "June").unwrap();
        m.book("carol", "Deluxe", 2, "July").unwrap();

        let removed = m.cancel("carol", 1).unwrap();
        assert_eq!(removed.category, RoomCategory::Standard);

        let mine = m.list_mine("carol");
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].category, RoomCategory::Deluxe);
        assert_eq!(m.all_reservations().len(), 2);
    }

    #[test]
    fn test_cancel_selection_errors() {
        let mut m = manager();

        assert!(matches!(m.cancel("carol", 1), Err(ReservationError::NoReservations)));

        m.book("carol", "Standard", 1, "June").unwrap();
        assert!(matches!(
            m.cancel("carol", 2),
            Err(ReservationError::InvalidSelection { index: 2, count: 1 })
        ));
        assert_eq!(m.list_mine("carol").len(), 1);
    }

    #[test]
    fn test_admin_summary() {
        let records = vec![
            Reservation::priced("alice", RoomCategory::Standard, 1, "June"),
            Reservation::priced("bob", RoomCategory::Deluxe, 2, "December"),
        ];

        let summary = AdminSummary::of(&records);
        assert_eq!(summary.count, 2);
        assert_eq!(summary.total_revenue, 5800.0);

        assert_eq!(AdminSummary::of(&[]), AdminSummary::default());
    }

    #[test]
    fn test_summarize_by_owner() {
        let records = vec![
            Reservation::priced("alice", RoomCategory::Standard, 1, "June"),
            Reservation::priced("bob", RoomCategory::Suite, 1, "June"),
            Reservation::priced("alice", RoomCategory::Standard, 1, "June"),
        ];

        let summary = summarize_by_owner(&records);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].owner, "bob");
        assert_eq!(summary[0].revenue, 3000.0);
        assert_eq!(summary[1].owner, "alice");
        assert_eq!(summary[1].count, 2);
    }

    #[test]
    fn test_from_prompt_sentinels() {
        assert_eq!(ReservationUpdate::from_prompt(0, "  "), ReservationUpdate::keep_current());
        assert_eq!(ReservationUpdate::from_prompt(3, "").nights, Some(3));
        assert_eq!(
            ReservationUpdate::from_prompt(0, "may").month.as_deref(),
            Some("may")
        );
    }
}
