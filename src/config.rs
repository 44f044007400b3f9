use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::errors::{LendingError, Result};
use crate::types::{PersonnelId, ProductId};

/// bounds and pricing shared by every catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductTerms {
    pub name: String,
    pub min_amount: Money,
    pub max_amount: Money,
    /// annual rate, must sit within 0..=100%
    pub interest_rate: Rate,
    pub min_duration_months: u32,
    pub max_duration_months: u32,
}

impl ProductTerms {
    pub fn new(
        name: impl Into<String>,
        min_amount: Money,
        max_amount: Money,
        interest_rate: Rate,
        min_duration_months: u32,
        max_duration_months: u32,
    ) -> Result<Self> {
        let terms = Self {
            name: name.into(),
            min_amount,
            max_amount,
            interest_rate,
            min_duration_months,
            max_duration_months,
        };
        terms.validate()?;
        Ok(terms)
    }

    /// check internal consistency of the bounds
    pub fn validate(&self) -> Result<()> {
        if self.min_amount.is_negative() {
            return Err(LendingError::InvalidConfiguration {
                message: format!("minimum amount cannot be negative: {}", self.min_amount),
            });
        }
        if self.min_amount > self.max_amount {
            return Err(LendingError::InvalidConfiguration {
                message: "minimum amount cannot exceed maximum amount".to_string(),
            });
        }
        if self.min_duration_months == 0 {
            return Err(LendingError::InvalidConfiguration {
                message: "minimum duration must be at least one month".to_string(),
            });
        }
        if self.min_duration_months > self.max_duration_months {
            return Err(LendingError::InvalidConfiguration {
                message: "minimum duration cannot exceed maximum duration".to_string(),
            });
        }
        if self.interest_rate.is_negative() || self.interest_rate > Rate::ONE {
            return Err(LendingError::InvalidConfiguration {
                message: format!(
                    "interest rate must be between 0% and 100%: {}",
                    self.interest_rate
                ),
            });
        }
        Ok(())
    }

    /// validate a requested amount against the bounds, inclusive
    pub fn check_amount(&self, amount: Money) -> Result<()> {
        if amount < self.min_amount || amount > self.max_amount {
            return Err(LendingError::AmountOutOfRange {
                amount,
                min: self.min_amount,
                max: self.max_amount,
            });
        }
        Ok(())
    }

    /// validate a requested duration against the bounds, inclusive
    pub fn check_duration(&self, months: u32) -> Result<()> {
        if months < self.min_duration_months || months > self.max_duration_months {
            return Err(LendingError::DurationOutOfRange {
                months,
                min: self.min_duration_months,
                max: self.max_duration_months,
            });
        }
        Ok(())
    }
}

/// a product customers borrow against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanProduct {
    pub id: ProductId,
    pub personnel_id: PersonnelId,
    pub terms: ProductTerms,
    pub created_at: DateTime<Utc>,
}

impl LoanProduct {
    pub fn new(personnel_id: PersonnelId, terms: ProductTerms, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            personnel_id,
            terms,
            created_at: now,
        }
    }
}

/// a product providers commit funds under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundProduct {
    pub id: ProductId,
    pub personnel_id: PersonnelId,
    pub terms: ProductTerms,
    pub created_at: DateTime<Utc>,
}

impl FundProduct {
    pub fn new(personnel_id: PersonnelId, terms: ProductTerms, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            personnel_id,
            terms,
            created_at: now,
        }
    }
}
