//! # Cancellation Rules
//!
//! A sale can be cancelled once, on the business day it was made.
//!
//! ```text
//!  cancel(sale, reason, now)
//!      │
//!      ├── reason blank?                        → Validation(Required)
//!      ├── status == cancelled?                 → AlreadyCancelled
//!      ├── date_of(created_at) != date_of(now)? → CancellationWindowExpired
//!      │
//!      ▼
//!  restore stock, flip status, post "out" entry  (adega-db, one transaction)
//! ```

use chrono::{DateTime, Utc};

use crate::calendar::BusinessCalendar;
use crate::error::{CoreError, CoreResult};
use crate::types::Sale;
use crate::validation::{validate_required_text, ValidationResult};

/// Longest accepted cancellation reason.
pub const MAX_REASON_LEN: usize = 500;

/// Trims and checks a cancellation reason.
pub fn validate_cancel_reason(reason: &str) -> ValidationResult<String> {
    validate_required_text("reason", reason, MAX_REASON_LEN)
}

/// Checks status and the same-day window.
pub fn ensure_cancellable(
    sale: &Sale,
    now: DateTime<Utc>,
    calendar: &BusinessCalendar,
) -> CoreResult<()> {
    if !sale.status.can_cancel() {
        return Err(CoreError::AlreadyCancelled(sale.id.clone()));
    }

    if !calendar.same_day(sale.created_at, now) {
        return Err(CoreError::CancellationWindowExpired {
            sale_id: sale.id.clone(),
            sale_date: calendar.date_of(sale.created_at),
        });
    }

    Ok(())
}

/// Reason stored on the stock movement that restores a cancelled line.
pub fn restock_reason(sale_id: &str, reason: &str) -> String {
    format!("Sale {sale_id} cancelled: {reason}")
}

/// Description of the compensating ledger entry.
pub fn reversal_description(sale_id: &str, reason: &str) -> String {
    format!("Reversal of sale {sale_id}: {reason}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PaymentMethod, SaleStatus};
    use chrono::TimeZone;

    fn sale_at(created_at: DateTime<Utc>, status: SaleStatus) -> Sale {
        Sale {
            id: "sale-1".to_string(),
            store_id: "store".to_string(),
            customer_id: None,
            seller_id: "u".to_string(),
            status,
            subtotal_cents: 1000,
            discount_cents: 0,
            total_cents: 1000,
            payment_method: PaymentMethod::Pix,
            notes: None,
            created_at,
            cancelled_at: None,
            cancelled_by: None,
            cancel_reason: None,
        }
    }

    #[test]
    fn test_same_day_allowed() {
        let cal = BusinessCalendar::default();
        let created = Utc.with_ymd_and_hms(2024, 5, 2, 13, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 5, 3, 2, 59, 0).unwrap(); // 23:59 local
        assert!(ensure_cancellable(&sale_at(created, SaleStatus::Completed), now, &cal).is_ok());
    }

    #[test]
    fn test_next_day_rejected() {
        let cal = BusinessCalendar::default();
        let created = Utc.with_ymd_and_hms(2024, 5, 2, 13, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 5, 3, 3, 0, 0).unwrap(); // 00:00 local
        let err = ensure_cancellable(&sale_at(created, SaleStatus::Completed), now, &cal)
            .unwrap_err();
        assert!(matches!(err, CoreError::CancellationWindowExpired { .. }));
    }

    #[test]
    fn test_already_cancelled_wins_over_window() {
        let cal = BusinessCalendar::default();
        let created = Utc.with_ymd_and_hms(2020, 1, 1, 12, 0, 0).unwrap();
        let err = ensure_cancellable(&sale_at(created, SaleStatus::Cancelled), Utc::now(), &cal)
            .unwrap_err();
        assert!(matches!(err, CoreError::AlreadyCancelled(id) if id == "sale-1"));
    }

    #[test]
    fn test_pending_sales_can_be_cancelled() {
        let cal = BusinessCalendar::utc();
        let now = Utc::now();
        assert!(ensure_cancellable(&sale_at(now, SaleStatus::Pending), now, &cal).is_ok());
    }

    #[test]
    fn test_reason_required() {
        assert!(validate_cancel_reason("   ").is_err());
        assert_eq!(validate_cancel_reason(" wrong bottle ").unwrap(), "wrong bottle");
    }

    #[test]
    fn test_restock_reason_embeds_sale_and_reason() {
        let text = restock_reason("sale-9", "customer gave up");
        assert!(text.contains("sale-9"));
        assert!(text.contains("customer gave up"));
    }
}
