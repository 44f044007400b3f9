/// json read models over pool state
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::loan::Loan;
use crate::platform::LendingPlatform;
use crate::types::{CustomerId, LoanId, LoanStatus, ProductId};

/// serializable view of one loan and its repayment progress
#[derive(Debug, Serialize, Deserialize)]
pub struct LoanView {
    pub id: LoanId,
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub status: LoanStatus,
    pub start_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub financial: LoanFinancialView,
    pub schedule: ScheduleView,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoanFinancialView {
    pub requested_amount: Money,
    pub term_months: u32,
    pub annual_rate: Option<Rate>,
    pub monthly_payment: Option<Money>,
    pub outstanding: Money,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScheduleView {
    pub installments: u32,
    pub paid_count: u32,
    pub unpaid_count: u32,
    pub next_due: Option<NaiveDate>,
    pub next_sequence: Option<u32>,
    pub rows: Vec<ScheduleRowView>,
}

/// one statement line of the amortization table
#[derive(Debug, Serialize, Deserialize)]
pub struct ScheduleRowView {
    pub sequence: u32,
    pub due_date: NaiveDate,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub total_payment: Money,
    pub remaining_balance: Money,
    pub paid: bool,
    pub settlement_reference: Option<String>,
}

impl LoanView {
    pub fn from_loan(loan: &Loan) -> Self {
        let entries = loan.entries();
        let next = loan.ledger.as_ref().and_then(|l| l.next_unpaid());

        LoanView {
            id: loan.id,
            customer_id: loan.customer_id,
            product_id: loan.product_id,
            status: loan.status,
            start_date: loan.start_date,
            created_at: loan.created_at,
            financial: LoanFinancialView {
                requested_amount: loan.amount,
                term_months: loan.term_months,
                annual_rate: loan.terms.as_ref().map(|t| t.annual_rate),
                monthly_payment: loan.monthly_payment(),
                outstanding: loan
                    .ledger
                    .as_ref()
                    .map(|l| l.outstanding())
                    .unwrap_or(Money::ZERO),
            },
            schedule: ScheduleView {
                installments: entries.len() as u32,
                paid_count: entries.iter().filter(|e| e.paid).count() as u32,
                unpaid_count: entries.iter().filter(|e| !e.paid).count() as u32,
                next_due: next.map(|e| e.due_date),
                next_sequence: next.map(|e| e.sequence),
                rows: entries
                    .iter()
                    .map(|e| ScheduleRowView {
                        sequence: e.sequence,
                        due_date: e.due_date,
                        principal_portion: e.principal_portion,
                        interest_portion: e.interest_portion,
                        total_payment: e.total_payment,
                        remaining_balance: e.remaining_balance,
                        paid: e.paid,
                        settlement_reference: e.settlement_reference.clone(),
                    })
                    .collect(),
            },
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// serializable dashboard over the whole pool
#[derive(Debug, Serialize, Deserialize)]
pub struct PoolView {
    pub available_balance: Money,
    pub committed: Money,
    pub allocated: Money,
    pub fund_count: u32,
    pub loan_count: u32,
    pub loans_by_status: StatusBreakdownView,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusBreakdownView {
    pub pending: u32,
    pub approved: u32,
    pub rejected: u32,
    pub active: u32,
    pub completed: u32,
}

impl PoolView {
    pub fn from_platform(platform: &LendingPlatform) -> Self {
        let committed: Money = platform.funds().iter().map(|f| f.amount).sum();
        let allocated: Money = platform.loans().iter().map(|l| l.amount).sum();

        let count = |status: LoanStatus| {
            platform
                .loans()
                .iter()
                .filter(|l| l.status == status)
                .count() as u32
        };

        PoolView {
            available_balance: platform.available_balance(),
            committed,
            allocated,
            fund_count: platform.funds().len() as u32,
            loan_count: platform.loans().len() as u32,
            loans_by_status: StatusBreakdownView {
                pending: count(LoanStatus::Pending),
                approved: count(LoanStatus::Approved),
                rejected: count(LoanStatus::Rejected),
                active: count(LoanStatus::Active),
                completed: count(LoanStatus::Completed),
            },
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProductTerms;
    use chrono::TimeZone;
    use hourglass_rs::{SafeTimeProvider, TimeSource};
    use uuid::Uuid;

    fn approved_loan_platform() -> (LendingPlatform, LoanId) {
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
        ));
        let mut platform = LendingPlatform::new();
        let personnel = Uuid::new_v4();

        let loan_product = platform
            .register_loan_product(
                personnel,
                ProductTerms::new(
                    "Personal Loan",
                    Money::from_major(500),
                    Money::from_major(30_000),
                    Rate::from_percentage(12),
                    1,
                    60,
                )
                .unwrap(),
                &time,
            )
            .unwrap();
        let fund_product = platform
            .register_fund_product(
                personnel,
                ProductTerms::new(
                    "Capital Fund",
                    Money::from_major(1_000),
                    Money::from_major(100_000),
                    Rate::from_percentage(8),
                    1,
                    120,
                )
                .unwrap(),
                &time,
            )
            .unwrap();
        platform
            .commit_fund(
                Uuid::new_v4(),
                fund_product,
                Money::from_major(15_000),
                None,
                &time,
            )
            .unwrap();

        let loan_id = platform
            .create_loan(
                Uuid::new_v4(),
                loan_product,
                Money::from_major(1_200),
                3,
                None,
                &time,
            )
            .unwrap();
        platform.approve_loan(loan_id, &time).unwrap();

        (platform, loan_id)
    }

    #[test]
    fn test_loan_view_reflects_schedule_progress() {
        let (platform, loan_id) = approved_loan_platform();
        let view = LoanView::from_loan(platform.loan(loan_id).unwrap());

        assert_eq!(view.status, LoanStatus::Approved);
        assert_eq!(view.schedule.installments, 3);
        assert_eq!(view.schedule.unpaid_count, 3);
        assert_eq!(view.schedule.next_sequence, Some(1));
        assert_eq!(view.schedule.rows.len(), 3);
        assert!(view.financial.monthly_payment.is_some());
        assert_eq!(view.financial.requested_amount, Money::from_major(1_200));
    }

    #[test]
    fn test_pool_view_counts_and_balances() {
        let (platform, _) = approved_loan_platform();
        let view = PoolView::from_platform(&platform);

        assert_eq!(view.committed, Money::from_major(15_000));
        assert_eq!(view.allocated, Money::from_major(1_200));
        assert_eq!(view.available_balance, Money::from_major(13_800));
        assert_eq!(view.fund_count, 1);
        assert_eq!(view.loan_count, 1);
        assert_eq!(view.loans_by_status.approved, 1);
        assert_eq!(view.loans_by_status.pending, 0);
    }

    #[test]
    fn test_views_serialize_to_json() {
        let (platform, loan_id) = approved_loan_platform();

        let loan_json = LoanView::from_loan(platform.loan(loan_id).unwrap())
            .to_json_pretty()
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&loan_json).unwrap();
        assert_eq!(parsed["schedule"]["installments"], 3);
        assert_eq!(parsed["financial"]["requested_amount"], "1200.00");

        let pool_json = PoolView::from_platform(&platform).to_json_pretty().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&pool_json).unwrap();
        assert_eq!(parsed["available_balance"], "13800.00");
    }
}
