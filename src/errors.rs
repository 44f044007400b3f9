use thiserror::Error;
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::types::{LoanStatus, ResourceKind};

/// Validation failures surfaced by the lending core. All variants are
/// terminal for the current request and recoverable by the caller; none
/// abort the process.
#[derive(Error, Debug)]
pub enum LendingError {
    #[error("invalid principal {amount}: must be greater than zero")]
    InvalidPrincipal { amount: Money },

    #[error("invalid interest rate {rate}: must not be negative")]
    InvalidRate { rate: Rate },

    #[error("invalid term: {months} months, must be at least one")]
    InvalidTerm { months: u32 },

    #[error("not enough pool balance: available {available}, requested {requested}")]
    InsufficientBalance { available: Money, requested: Money },

    #[error("loan can only be modified while pending: current status is {status:?}")]
    ImmutableLoanState { status: LoanStatus },

    #[error("installment {sequence} was already settled")]
    AlreadyPaid { entry_id: Uuid, sequence: u32 },

    #[error("settlement reference {reference:?} was already used")]
    DuplicateSettlement { reference: String },

    #[error("installment {blocking_sequence} must be settled before installment {sequence}")]
    OutOfOrderPayment { sequence: u32, blocking_sequence: u32 },

    #[error("{kind} not found: {id}")]
    NotFound { kind: ResourceKind, id: Uuid },

    #[error("amount {amount} outside product bounds {min}..={max}")]
    AmountOutOfRange { amount: Money, min: Money, max: Money },

    #[error("duration {months} months outside product bounds {min}..={max}")]
    DurationOutOfRange { months: u32, min: u32, max: u32 },

    #[error("loan {loan_id} still has unpaid installments")]
    UnsettledLoan { loan_id: Uuid },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// Surfaced by storage adapters when a transaction loses a race
    /// (lock contention, constraint violation). Callers retry; the
    /// in-memory core is single-writer and never produces it itself.
    #[error("concurrent modification, retry the operation")]
    ConcurrentModification,
}

pub type Result<T> = std::result::Result<T, LendingError>;
