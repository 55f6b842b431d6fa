//! Fine calculator: turns a loan's dates into a monetary amount
//!
//! Pure functions only; fines are derived from timestamps on every read and
//! persisted solely when a librarian settles them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::models::{enums::FineStatus, BorrowRequest, Fine};

/// Whole overdue days past the grace period, never negative
fn overdue_days(
    due_date: DateTime<Utc>,
    effective_end: DateTime<Utc>,
    grace_period_days: i64,
) -> i64 {
    let late = (effective_end - due_date).num_days() - grace_period_days;
    late.max(0)
}

/// Compute the fine owed on a borrow request as of `as_of`.
///
/// The accrual window ends at the return date once the copy is back, so the
/// result is constant after return and non-decreasing in `as_of` before it.
/// Requests with no due date (never approved) owe nothing.
pub fn compute_fine(
    request: &BorrowRequest,
    as_of: DateTime<Utc>,
    daily_rate: Decimal,
    grace_period_days: i64,
) -> Fine {
    let amount = match request.due_date {
        Some(due) => {
            let effective_end = request.return_date.unwrap_or(as_of);
            Decimal::from(overdue_days(due, effective_end, grace_period_days)) * daily_rate
        }
        None => Decimal::ZERO,
    };

    let status = if amount.is_zero() {
        FineStatus::None
    } else {
        FineStatus::Unpaid
    };

    Fine {
        borrow_request_id: request.id,
        amount,
        status,
        settled_at: None,
        settled_by: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::BorrowStatus;
    use chrono::{Duration, TimeZone};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap() + Duration::days(n)
    }

    fn loan_due_day_10() -> BorrowRequest {
        BorrowRequest {
            id: 42,
            user_id: 7,
            title_id: 1,
            copy_id: Some(100),
            status: BorrowStatus::Active,
            requested_at: day(0),
            approver_id: Some(1),
            borrow_date: Some(day(0)),
            due_date: Some(day(10)),
            return_date: None,
            rejection_reason: None,
        }
    }

    #[test]
    fn no_fine_on_or_before_due_date() {
        let loan = loan_due_day_10();
        let fine = compute_fine(&loan, day(10), Decimal::from(5), 1);
        assert_eq!(fine.amount, Decimal::ZERO);
        assert_eq!(fine.status, FineStatus::None);
    }

    #[test]
    fn grace_period_defers_accrual() {
        let loan = loan_due_day_10();
        let fine = compute_fine(&loan, day(11), Decimal::from(5), 1);
        assert_eq!(fine.amount, Decimal::ZERO);
    }

    #[test]
    fn fine_accrues_past_grace() {
        // due day 10, rate 5, grace 1, as-of day 14 -> (14-10)-1 = 3 days, 15 owed
        let loan = loan_due_day_10();
        let fine = compute_fine(&loan, day(14), Decimal::from(5), 1);
        assert_eq!(fine.amount, Decimal::from(15));
        assert_eq!(fine.status, FineStatus::Unpaid);
    }

    #[test]
    fn fine_is_monotonic_in_as_of() {
        let loan = loan_due_day_10();
        let mut last = Decimal::ZERO;
        for d in 0..30 {
            let fine = compute_fine(&loan, day(d), Decimal::from(5), 1);
            assert!(fine.amount >= last, "fine decreased at day {}", d);
            last = fine.amount;
        }
    }

    #[test]
    fn fine_is_constant_after_return() {
        let mut loan = loan_due_day_10();
        loan.return_date = Some(day(13));
        loan.status = BorrowStatus::Returned;

        let at_return = compute_fine(&loan, day(13), Decimal::from(5), 1);
        let much_later = compute_fine(&loan, day(300), Decimal::from(5), 1);
        assert_eq!(at_return.amount, Decimal::from(10));
        assert_eq!(at_return.amount, much_later.amount);
    }

    #[test]
    fn unapproved_request_owes_nothing() {
        let mut loan = loan_due_day_10();
        loan.due_date = None;
        loan.status = BorrowStatus::Pending;
        let fine = compute_fine(&loan, day(100), Decimal::from(5), 0);
        assert_eq!(fine.amount, Decimal::ZERO);
    }

    #[test]
    fn fractional_daily_rate() {
        let loan = loan_due_day_10();
        let fine = compute_fine(&loan, day(14), Decimal::new(50, 2), 1);
        assert_eq!(fine.amount, Decimal::new(150, 2));
    }
}
