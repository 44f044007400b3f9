use crate::decimal::Money;
use crate::errors::{LendingError, Result};
use crate::loan::Loan;

use super::fund::LoanFund;

/// pool-wide balance arithmetic
///
/// every admitted loan counts against the pool for its full requested
/// amount, whatever its current status. funds only ever add.
pub struct BalanceCalculator;

impl BalanceCalculator {
    /// committed funds minus amounts across all admitted loans
    pub fn available_balance(funds: &[LoanFund], loans: &[Loan]) -> Money {
        let committed: Money = funds.iter().map(|f| f.amount).sum();
        let allocated: Money = loans.iter().map(|l| l.amount).sum();
        committed - allocated
    }

    /// admission check for a new application
    pub fn check_admission(funds: &[LoanFund], loans: &[Loan], requested: Money) -> Result<()> {
        let available = Self::available_balance(funds, loans);
        if requested > available {
            return Err(LendingError::InsufficientBalance {
                available,
                requested,
            });
        }
        Ok(())
    }
}
