use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::errors::{LendingError, Result};
use crate::types::EntryId;

/// one scheduled installment of an amortized loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationEntry {
    pub id: EntryId,
    /// 1-based position in the schedule
    pub sequence: u32,
    pub due_date: NaiveDate,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub total_payment: Money,
    /// balance left after this installment is applied
    pub remaining_balance: Money,
    pub paid: bool,
    pub settlement_reference: Option<String>,
}

/// level-payment schedule generator
pub struct ScheduleGenerator;

impl ScheduleGenerator {
    /// build the full amortization schedule for a loan
    ///
    /// interest accrues on the cent-rounded running balance, so the
    /// principal portions sum back to the principal exactly and the
    /// final installment closes the balance at zero. the total payment
    /// column carries the level payment on every row; the closing row
    /// may repay slightly more or less principal than the level payment
    /// implies.
    pub fn generate(
        principal: Money,
        annual_rate: Rate,
        term_months: u32,
        start_date: NaiveDate,
    ) -> Result<Vec<AmortizationEntry>> {
        if term_months == 0 {
            return Err(LendingError::InvalidTerm {
                months: term_months,
            });
        }
        if !principal.is_positive() {
            return Err(LendingError::InvalidPrincipal { amount: principal });
        }
        if annual_rate.is_negative() {
            return Err(LendingError::InvalidRate { rate: annual_rate });
        }

        let monthly_rate = annual_rate.monthly_rate().as_decimal();
        let payment = level_payment(principal, annual_rate, term_months);

        let mut entries = Vec::with_capacity(term_months as usize);
        let mut balance = principal;

        for sequence in 1..=term_months {
            let due_date = start_date + Months::new(sequence - 1);
            let interest_portion = balance * monthly_rate;

            let (principal_portion, remaining_balance) = if sequence == term_months {
                // closing installment absorbs the rounding residual
                (balance, Money::ZERO)
            } else {
                let portion = payment - interest_portion;
                (portion, balance - portion)
            };

            entries.push(AmortizationEntry {
                id: Uuid::new_v4(),
                sequence,
                due_date,
                principal_portion,
                interest_portion,
                total_payment: payment,
                remaining_balance,
                paid: false,
                settlement_reference: None,
            });

            balance = remaining_balance;
        }

        Ok(entries)
    }
}

/// level payment via the annuity formula, rounded to cents
fn level_payment(principal: Money, annual_rate: Rate, term_months: u32) -> Money {
    let monthly_rate = annual_rate.monthly_rate().as_decimal();

    if monthly_rate.is_zero() {
        return principal / Decimal::from(term_months);
    }

    // payment = P * r * (1 + r)^n / ((1 + r)^n - 1)
    let base = Decimal::ONE + monthly_rate;
    let mut compound = Decimal::ONE;
    for _ in 0..term_months {
        compound *= base;
    }

    let numerator = principal.as_decimal() * monthly_rate * compound;
    Money::from_decimal(numerator / (compound - Decimal::ONE))
}
