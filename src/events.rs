use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{
    CustomerId, EntryId, FundId, LoanId, LoanStatus, ProductId, ProviderId, ResourceKind,
};

/// all events emitted by the platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // catalog events
    ProductRegistered {
        product_id: ProductId,
        kind: ResourceKind,
        name: String,
        timestamp: DateTime<Utc>,
    },
    FundCommitted {
        fund_id: FundId,
        provider_id: ProviderId,
        amount: Money,
        timestamp: DateTime<Utc>,
    },

    // lifecycle events
    LoanCreated {
        loan_id: LoanId,
        customer_id: CustomerId,
        amount: Money,
        term_months: u32,
        timestamp: DateTime<Utc>,
    },
    LoanTermsUpdated {
        loan_id: LoanId,
        amount: Money,
        term_months: u32,
        timestamp: DateTime<Utc>,
    },
    LoanApproved {
        loan_id: LoanId,
        timestamp: DateTime<Utc>,
    },
    LoanRejected {
        loan_id: LoanId,
        timestamp: DateTime<Utc>,
    },
    LoanActivated {
        loan_id: LoanId,
        timestamp: DateTime<Utc>,
    },
    ScheduleGenerated {
        loan_id: LoanId,
        installments: u32,
        monthly_payment: Money,
        first_due: NaiveDate,
    },

    // payment events
    InstallmentPaid {
        loan_id: LoanId,
        entry_id: EntryId,
        sequence: u32,
        reference: String,
        timestamp: DateTime<Utc>,
    },
    LoanFullySettled {
        loan_id: LoanId,
        timestamp: DateTime<Utc>,
    },

    // status change events
    StatusChanged {
        loan_id: LoanId,
        old_status: LoanStatus,
        new_status: LoanStatus,
        timestamp: DateTime<Utc>,
    },
}

/// event journal collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
