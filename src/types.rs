use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// unique identifier for a loan
pub type LoanId = Uuid;

/// unique identifier for a committed fund
pub type FundId = Uuid;

/// unique identifier for a catalog product (loan or fund)
pub type ProductId = Uuid;

/// unique identifier for one amortization entry
pub type EntryId = Uuid;

/// unique identifier for a platform user of any role
pub type UserId = Uuid;

pub type CustomerId = UserId;
pub type PersonnelId = UserId;
pub type ProviderId = UserId;

/// loan lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    /// application received, awaiting a personnel decision
    Pending,
    /// approved, repayment schedule generated
    Approved,
    /// declined by personnel
    Rejected,
    /// funds handed out, repayment underway
    Active,
    /// every installment settled
    Completed,
}

impl LoanStatus {
    /// terminal states: the loan can never owe anything again, so its
    /// entries do not block a new application
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoanStatus::Rejected | LoanStatus::Completed)
    }
}

/// platform user roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    /// defines products and decides loan applications
    Personnel,
    /// commits lending capital into the pool
    Provider,
    /// borrows against the pool
    Customer,
}

/// the closed set of resources the platform manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    FundType,
    Fund,
    LoanType,
    Loan,
    Entry,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::FundType => "fund product",
            ResourceKind::Fund => "fund",
            ResourceKind::LoanType => "loan product",
            ResourceKind::Loan => "loan",
            ResourceKind::Entry => "amortization entry",
        };
        write!(f, "{}", name)
    }
}
