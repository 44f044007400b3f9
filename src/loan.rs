use chrono::{DateTime, NaiveDate, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::errors::{LendingError, Result};
use crate::events::{Event, EventStore};
use crate::schedule::{
    AmortizationEntry, AmortizationLedger, PaymentReceipt, ScheduleGenerator, SettlementRegistry,
};
use crate::types::{CustomerId, LoanId, LoanStatus, ProductId, ResourceKind};

/// terms fixed at approval time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    pub annual_rate: Rate,
    pub term_months: u32,
    pub monthly_payment: Money,
    pub approved_at: DateTime<Utc>,
}

/// a customer loan and its repayment state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub amount: Money,
    pub term_months: u32,
    pub start_date: NaiveDate,
    pub status: LoanStatus,
    /// present once the loan has been approved against a priced product
    pub terms: Option<LoanTerms>,
    /// present once a schedule has been generated
    pub ledger: Option<AmortizationLedger>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Loan {
    /// open a new application in pending state
    pub fn new(
        customer_id: CustomerId,
        product_id: ProductId,
        amount: Money,
        term_months: u32,
        start_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id,
            product_id,
            amount,
            term_months,
            start_date,
            status: LoanStatus::Pending,
            terms: None,
            ledger: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// revise the requested amount and duration while still pending
    pub fn update_terms(
        &mut self,
        amount: Money,
        term_months: u32,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<()> {
        if self.status != LoanStatus::Pending {
            return Err(LendingError::ImmutableLoanState {
                status: self.status,
            });
        }

        let now = time_provider.now();
        self.amount = amount;
        self.term_months = term_months;
        self.updated_at = now;

        events.emit(Event::LoanTermsUpdated {
            loan_id: self.id,
            amount,
            term_months,
            timestamp: now,
        });

        Ok(())
    }

    /// approve the application and generate its repayment schedule
    ///
    /// the schedule is generated once: re-approving an approved loan is
    /// a no-op, except that a loan approved without a priced product
    /// picks up its schedule the first time a rate becomes available.
    /// generation runs before the transition, so a failed generation
    /// leaves the loan pending with nothing journaled.
    pub fn approve(
        &mut self,
        annual_rate: Option<Rate>,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<()> {
        match self.status {
            LoanStatus::Pending | LoanStatus::Approved => {}
            status => return Err(LendingError::ImmutableLoanState { status }),
        }

        // fallible work first; status and journal only move after it
        let mut generated = None;
        if self.ledger.is_none() {
            if let Some(rate) = annual_rate {
                let entries = ScheduleGenerator::generate(
                    self.amount,
                    rate,
                    self.term_months,
                    self.start_date,
                )?;
                generated = Some((rate, entries));
            }
        }

        let now = time_provider.now();

        if self.status == LoanStatus::Pending {
            self.status = LoanStatus::Approved;
            self.updated_at = now;

            events.emit(Event::LoanApproved {
                loan_id: self.id,
                timestamp: now,
            });
            events.emit(Event::StatusChanged {
                loan_id: self.id,
                old_status: LoanStatus::Pending,
                new_status: LoanStatus::Approved,
                timestamp: now,
            });
        }

        if let Some((rate, entries)) = generated {
            let monthly_payment = entries[0].total_payment;
            let first_due = entries[0].due_date;
            let installments = entries.len() as u32;

            self.terms = Some(LoanTerms {
                principal: self.amount,
                annual_rate: rate,
                term_months: self.term_months,
                monthly_payment,
                approved_at: now,
            });
            self.ledger = Some(AmortizationLedger::new(self.id, entries));
            self.updated_at = now;

            events.emit(Event::ScheduleGenerated {
                loan_id: self.id,
                installments,
                monthly_payment,
                first_due,
            });
        }

        Ok(())
    }

    /// reject the application
    pub fn reject(
        &mut self,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<()> {
        match self.status {
            LoanStatus::Pending => {}
            LoanStatus::Rejected => return Ok(()),
            status => return Err(LendingError::ImmutableLoanState { status }),
        }

        let now = time_provider.now();
        self.status = LoanStatus::Rejected;
        self.updated_at = now;

        events.emit(Event::LoanRejected {
            loan_id: self.id,
            timestamp: now,
        });
        events.emit(Event::StatusChanged {
            loan_id: self.id,
            old_status: LoanStatus::Pending,
            new_status: LoanStatus::Rejected,
            timestamp: now,
        });

        Ok(())
    }

    /// mark an approved loan as disbursed and running
    pub fn activate(
        &mut self,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<()> {
        match self.status {
            LoanStatus::Approved => {}
            LoanStatus::Active => return Ok(()),
            status => return Err(LendingError::ImmutableLoanState { status }),
        }

        let now = time_provider.now();
        self.status = LoanStatus::Active;
        self.updated_at = now;

        events.emit(Event::LoanActivated {
            loan_id: self.id,
            timestamp: now,
        });
        events.emit(Event::StatusChanged {
            loan_id: self.id,
            old_status: LoanStatus::Approved,
            new_status: LoanStatus::Active,
            timestamp: now,
        });

        Ok(())
    }

    /// settle one installment; completes the loan when it was the last
    pub fn pay_installment(
        &mut self,
        entry_id: Uuid,
        reference: &str,
        registry: &mut SettlementRegistry,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<PaymentReceipt> {
        let now = time_provider.now();

        let ledger = self.ledger.as_mut().ok_or(LendingError::NotFound {
            kind: ResourceKind::Entry,
            id: entry_id,
        })?;

        let receipt = ledger.record_payment(entry_id, reference, registry)?;
        self.updated_at = now;

        events.emit(Event::InstallmentPaid {
            loan_id: self.id,
            entry_id,
            sequence: receipt.sequence,
            reference: reference.to_string(),
            timestamp: now,
        });

        if receipt.fully_settled && self.status != LoanStatus::Completed {
            let old_status = self.status;
            self.status = LoanStatus::Completed;

            events.emit(Event::LoanFullySettled {
                loan_id: self.id,
                timestamp: now,
            });
            events.emit(Event::StatusChanged {
                loan_id: self.id,
                old_status,
                new_status: LoanStatus::Completed,
                timestamp: now,
            });
        }

        Ok(receipt)
    }

    /// installments, or an empty slice before any schedule exists
    pub fn entries(&self) -> &[AmortizationEntry] {
        self.ledger.as_ref().map(|l| l.entries()).unwrap_or(&[])
    }

    pub fn has_schedule(&self) -> bool {
        self.ledger.is_some()
    }

    /// true once every installment is paid
    pub fn is_settled(&self) -> bool {
        self.ledger
            .as_ref()
            .map(|l| l.is_fully_settled())
            .unwrap_or(false)
    }

    pub fn monthly_payment(&self) -> Option<Money> {
        self.terms.as_ref().map(|t| t.monthly_payment)
    }

    /// loan still counts toward the customer's open obligations
    pub fn is_outstanding(&self) -> bool {
        !self.status.is_terminal()
    }

    /// true while any generated installment is still open
    pub fn has_unpaid_entries(&self) -> bool {
        self.ledger
            .as_ref()
            .map(|l| l.unpaid_count() > 0)
            .unwrap_or(false)
    }
}
