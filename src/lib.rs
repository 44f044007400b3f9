pub mod access;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod loan;
pub mod platform;
pub mod pool;
pub mod schedule;
pub mod types;
pub mod views;

// re-export key types
pub use access::{AccessAction, AccessPolicy, AccessRule, Actor};
pub use config::{FundProduct, LoanProduct, ProductTerms};
pub use decimal::{Money, Rate};
pub use errors::{LendingError, Result};
pub use events::{Event, EventStore};
pub use loan::{Loan, LoanTerms};
pub use platform::LendingPlatform;
pub use pool::{BalanceCalculator, LoanFund};
pub use schedule::{
    AmortizationEntry, AmortizationLedger, PaymentReceipt, ScheduleGenerator, SettlementRegistry,
};
pub use types::{
    CustomerId, EntryId, FundId, LoanId, LoanStatus, PersonnelId, ProductId, ProviderId,
    ResourceKind, Role, UserId,
};
pub use views::{LoanView, PoolView};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
