use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{LendingError, Result};
use crate::types::{EntryId, LoanId, ResourceKind};

use super::generator::AmortizationEntry;

/// settlement references already consumed, shared across every loan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettlementRegistry {
    used: HashMap<String, EntryId>,
}

impl SettlementRegistry {
    pub fn new() -> Self {
        Self {
            used: HashMap::new(),
        }
    }

    pub fn is_used(&self, reference: &str) -> bool {
        self.used.contains_key(reference)
    }

    /// consume a reference on behalf of an entry
    pub fn claim(&mut self, reference: &str, entry_id: EntryId) -> Result<()> {
        if self.used.contains_key(reference) {
            return Err(LendingError::DuplicateSettlement {
                reference: reference.to_string(),
            });
        }
        self.used.insert(reference.to_string(), entry_id);
        Ok(())
    }

    /// entry a reference was consumed by, if any
    pub fn entry_for(&self, reference: &str) -> Option<EntryId> {
        self.used.get(reference).copied()
    }
}

/// outcome of a recorded installment payment
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentReceipt {
    pub loan_id: LoanId,
    pub entry_id: EntryId,
    pub sequence: u32,
    pub amount: Money,
    pub remaining_unpaid: u32,
    /// true when this payment settled the last open installment
    pub fully_settled: bool,
}

/// repayment ledger over one loan's generated schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationLedger {
    pub loan_id: LoanId,
    entries: Vec<AmortizationEntry>,
}

impl AmortizationLedger {
    /// wrap a generated schedule; entries keep their sequence order
    pub fn new(loan_id: LoanId, entries: Vec<AmortizationEntry>) -> Self {
        Self { loan_id, entries }
    }

    pub fn entries(&self) -> &[AmortizationEntry] {
        &self.entries
    }

    pub fn entry(&self, entry_id: EntryId) -> Option<&AmortizationEntry> {
        self.entries.iter().find(|e| e.id == entry_id)
    }

    pub fn contains(&self, entry_id: EntryId) -> bool {
        self.entry(entry_id).is_some()
    }

    pub fn unpaid_count(&self) -> u32 {
        self.entries.iter().filter(|e| !e.paid).count() as u32
    }

    pub fn is_fully_settled(&self) -> bool {
        self.entries.iter().all(|e| e.paid)
    }

    /// lowest-sequence installment still open
    pub fn next_unpaid(&self) -> Option<&AmortizationEntry> {
        self.entries.iter().find(|e| !e.paid)
    }

    /// sum of payments still owed
    pub fn outstanding(&self) -> Money {
        self.entries
            .iter()
            .filter(|e| !e.paid)
            .map(|e| e.total_payment)
            .sum()
    }

    /// record one installment payment against an entry
    ///
    /// preconditions are checked in a fixed order: the entry must exist,
    /// must not already be paid, the reference must be fresh across the
    /// whole platform, and every earlier installment must be settled.
    pub fn record_payment(
        &mut self,
        entry_id: EntryId,
        reference: &str,
        registry: &mut SettlementRegistry,
    ) -> Result<PaymentReceipt> {
        let index = self
            .entries
            .iter()
            .position(|e| e.id == entry_id)
            .ok_or(LendingError::NotFound {
                kind: ResourceKind::Entry,
                id: entry_id,
            })?;

        if self.entries[index].paid {
            return Err(LendingError::AlreadyPaid {
                entry_id,
                sequence: self.entries[index].sequence,
            });
        }

        if registry.is_used(reference) {
            return Err(LendingError::DuplicateSettlement {
                reference: reference.to_string(),
            });
        }

        let sequence = self.entries[index].sequence;
        if let Some(blocking) = self
            .entries
            .iter()
            .find(|e| !e.paid && e.sequence < sequence)
        {
            return Err(LendingError::OutOfOrderPayment {
                sequence,
                blocking_sequence: blocking.sequence,
            });
        }

        registry.claim(reference, entry_id)?;

        let entry = &mut self.entries[index];
        entry.paid = true;
        entry.settlement_reference = Some(reference.to_string());
        let amount = entry.total_payment;

        let remaining_unpaid = self.unpaid_count();
        Ok(PaymentReceipt {
            loan_id: self.loan_id,
            entry_id,
            sequence,
            amount,
            remaining_unpaid,
            fully_settled: remaining_unpaid == 0,
        })
    }
}
