pub mod balance;
pub mod fund;

pub use balance::BalanceCalculator;
pub use fund::LoanFund;
