use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::types::{FundId, ProductId, ProviderId};

/// a provider's committed contribution to the pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanFund {
    pub id: FundId,
    pub provider_id: ProviderId,
    pub product_id: ProductId,
    pub amount: Money,
    /// commitment horizon in months, when the provider set one
    pub duration_months: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl LoanFund {
    pub fn new(
        provider_id: ProviderId,
        product_id: ProductId,
        amount: Money,
        duration_months: Option<u32>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            provider_id,
            product_id,
            amount,
            duration_months,
            created_at: now,
        }
    }
}
