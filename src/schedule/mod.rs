pub mod generator;
pub mod ledger;

pub use generator::{AmortizationEntry, ScheduleGenerator};
pub use ledger::{AmortizationLedger, PaymentReceipt, SettlementRegistry};
