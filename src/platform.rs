use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use uuid::Uuid;

use crate::access::{AccessAction, AccessPolicy, Actor};
use crate::config::{FundProduct, LoanProduct, ProductTerms};
use crate::decimal::Money;
use crate::errors::{LendingError, Result};
use crate::events::{Event, EventStore};
use crate::loan::Loan;
use crate::pool::{BalanceCalculator, LoanFund};
use crate::schedule::{AmortizationEntry, SettlementRegistry};
use crate::types::{
    CustomerId, EntryId, FundId, LoanId, LoanStatus, PersonnelId, ProductId, ProviderId,
    ResourceKind, UserId,
};

/// the multi-role lending pool: catalog, funds, loans, and the journal
///
/// the surrounding layer authenticates callers and maps transport onto
/// these operations; every mutation here is one synchronous unit of
/// work over in-memory state.
#[derive(Debug, Default)]
pub struct LendingPlatform {
    loan_products: Vec<LoanProduct>,
    fund_products: Vec<FundProduct>,
    funds: Vec<LoanFund>,
    loans: Vec<Loan>,
    settlements: SettlementRegistry,
    policy: AccessPolicy,
    events: EventStore,
}

impl LendingPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// register a loan product a personnel member curates
    pub fn register_loan_product(
        &mut self,
        personnel_id: PersonnelId,
        terms: ProductTerms,
        time_provider: &SafeTimeProvider,
    ) -> Result<ProductId> {
        terms.validate()?;
        let product = LoanProduct::new(personnel_id, terms, time_provider.now());
        let product_id = product.id;

        self.events.emit(Event::ProductRegistered {
            product_id,
            kind: ResourceKind::LoanType,
            name: product.terms.name.clone(),
            timestamp: product.created_at,
        });
        self.loan_products.push(product);

        Ok(product_id)
    }

    /// register a fund product providers commit against
    pub fn register_fund_product(
        &mut self,
        personnel_id: PersonnelId,
        terms: ProductTerms,
        time_provider: &SafeTimeProvider,
    ) -> Result<ProductId> {
        terms.validate()?;
        let product = FundProduct::new(personnel_id, terms, time_provider.now());
        let product_id = product.id;

        self.events.emit(Event::ProductRegistered {
            product_id,
            kind: ResourceKind::FundType,
            name: product.terms.name.clone(),
            timestamp: product.created_at,
        });
        self.fund_products.push(product);

        Ok(product_id)
    }

    /// commit provider capital to the pool under a fund product
    pub fn commit_fund(
        &mut self,
        provider_id: ProviderId,
        product_id: ProductId,
        amount: Money,
        duration_months: Option<u32>,
        time_provider: &SafeTimeProvider,
    ) -> Result<FundId> {
        let product = self
            .fund_products
            .iter()
            .find(|p| p.id == product_id)
            .ok_or(LendingError::NotFound {
                kind: ResourceKind::FundType,
                id: product_id,
            })?;

        product.terms.check_amount(amount)?;
        if let Some(months) = duration_months {
            product.terms.check_duration(months)?;
        }

        let now = time_provider.now();
        let fund = LoanFund::new(provider_id, product_id, amount, duration_months, now);
        let fund_id = fund.id;

        self.events.emit(Event::FundCommitted {
            fund_id,
            provider_id,
            amount,
            timestamp: now,
        });
        self.funds.push(fund);

        Ok(fund_id)
    }

    /// open a loan application in pending state
    ///
    /// checks, in order: the product exists, the amount and duration sit
    /// within its bounds, the customer has no open loan with unpaid
    /// installments, and the pool can absorb the request. the start date
    /// defaults to the creation date when the caller leaves it unset.
    pub fn create_loan(
        &mut self,
        customer_id: CustomerId,
        product_id: ProductId,
        amount: Money,
        term_months: u32,
        start_date: Option<NaiveDate>,
        time_provider: &SafeTimeProvider,
    ) -> Result<LoanId> {
        let product = self
            .loan_products
            .iter()
            .find(|p| p.id == product_id)
            .ok_or(LendingError::NotFound {
                kind: ResourceKind::LoanType,
                id: product_id,
            })?;

        product.terms.check_amount(amount)?;
        product.terms.check_duration(term_months)?;
        self.check_no_unsettled(customer_id)?;
        BalanceCalculator::check_admission(&self.funds, &self.loans, amount)?;

        let now = time_provider.now();
        let start_date = start_date.unwrap_or_else(|| now.date_naive());
        let loan = Loan::new(customer_id, product_id, amount, term_months, start_date, now);
        let loan_id = loan.id;

        self.events.emit(Event::LoanCreated {
            loan_id,
            customer_id,
            amount,
            term_months,
            timestamp: now,
        });
        self.loans.push(loan);

        Ok(loan_id)
    }

    /// approve a pending application and generate its schedule
    ///
    /// the rate comes from the loan product at approval time; if the
    /// product has gone missing the transition still happens and no
    /// schedule is generated.
    pub fn approve_loan(
        &mut self,
        loan_id: LoanId,
        time_provider: &SafeTimeProvider,
    ) -> Result<()> {
        let product_id = Self::find_loan(&self.loans, loan_id)?.product_id;
        let rate = self
            .loan_products
            .iter()
            .find(|p| p.id == product_id)
            .map(|p| p.terms.interest_rate);

        let loan = Self::find_loan_mut(&mut self.loans, loan_id)?;
        loan.approve(rate, time_provider, &mut self.events)
    }

    /// reject a pending application
    pub fn reject_loan(&mut self, loan_id: LoanId, time_provider: &SafeTimeProvider) -> Result<()> {
        let loan = Self::find_loan_mut(&mut self.loans, loan_id)?;
        loan.reject(time_provider, &mut self.events)
    }

    /// mark an approved loan as disbursed and running
    pub fn activate_loan(
        &mut self,
        loan_id: LoanId,
        time_provider: &SafeTimeProvider,
    ) -> Result<()> {
        let loan = Self::find_loan_mut(&mut self.loans, loan_id)?;
        loan.activate(time_provider, &mut self.events)
    }

    /// revise a pending application
    ///
    /// a revision passes the same gauntlet as a new application: product
    /// bounds, no other open loan with unpaid installments, and pool
    /// admission for the revised amount against the current balance.
    pub fn update_loan_terms(
        &mut self,
        loan_id: LoanId,
        amount: Money,
        term_months: u32,
        time_provider: &SafeTimeProvider,
    ) -> Result<()> {
        let loan = Self::find_loan(&self.loans, loan_id)?;
        if loan.status != LoanStatus::Pending {
            return Err(LendingError::ImmutableLoanState {
                status: loan.status,
            });
        }
        let customer_id = loan.customer_id;
        let product_id = loan.product_id;

        let product = self
            .loan_products
            .iter()
            .find(|p| p.id == product_id)
            .ok_or(LendingError::NotFound {
                kind: ResourceKind::LoanType,
                id: product_id,
            })?;

        product.terms.check_amount(amount)?;
        product.terms.check_duration(term_months)?;
        self.check_no_unsettled(customer_id)?;
        BalanceCalculator::check_admission(&self.funds, &self.loans, amount)?;

        let loan = Self::find_loan_mut(&mut self.loans, loan_id)?;
        loan.update_terms(amount, term_months, time_provider, &mut self.events)
    }

    /// settle one installment by its entry id; returns the updated row
    pub fn pay_installment(
        &mut self,
        entry_id: EntryId,
        reference: &str,
        time_provider: &SafeTimeProvider,
    ) -> Result<AmortizationEntry> {
        let index = self
            .loans
            .iter()
            .position(|l| l.entries().iter().any(|e| e.id == entry_id))
            .ok_or(LendingError::NotFound {
                kind: ResourceKind::Entry,
                id: entry_id,
            })?;

        let loan = &mut self.loans[index];
        loan.pay_installment(
            entry_id,
            reference,
            &mut self.settlements,
            time_provider,
            &mut self.events,
        )?;

        let loan = &self.loans[index];
        loan.entries()
            .iter()
            .find(|e| e.id == entry_id)
            .cloned()
            .ok_or(LendingError::NotFound {
                kind: ResourceKind::Entry,
                id: entry_id,
            })
    }

    /// committed funds minus admitted loans, recomputed on every call
    pub fn available_balance(&self) -> Money {
        BalanceCalculator::available_balance(&self.funds, &self.loans)
    }

    pub fn loan(&self, loan_id: LoanId) -> Option<&Loan> {
        self.loans.iter().find(|l| l.id == loan_id)
    }

    pub fn loans_for_customer(&self, customer_id: CustomerId) -> Vec<&Loan> {
        self.loans
            .iter()
            .filter(|l| l.customer_id == customer_id)
            .collect()
    }

    /// a loan's schedule, in sequence order
    pub fn entries(&self, loan_id: LoanId) -> Option<&[AmortizationEntry]> {
        self.loan(loan_id).map(|l| l.entries())
    }

    pub fn loans(&self) -> &[Loan] {
        &self.loans
    }

    pub fn funds(&self) -> &[LoanFund] {
        &self.funds
    }

    pub fn loan_products(&self) -> &[LoanProduct] {
        &self.loan_products
    }

    pub fn fund_products(&self) -> &[FundProduct] {
        &self.fund_products
    }

    pub fn loan_product(&self, product_id: ProductId) -> Option<&LoanProduct> {
        self.loan_products.iter().find(|p| p.id == product_id)
    }

    pub fn fund_product(&self, product_id: ProductId) -> Option<&FundProduct> {
        self.fund_products.iter().find(|p| p.id == product_id)
    }

    /// drain the event journal
    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// policy check with the resource's stored owner resolved in place
    pub fn can_read(&self, actor: &Actor, kind: ResourceKind, id: Uuid) -> bool {
        self.owner_of(kind, id)
            .map(|owner| self.policy.allows(actor, AccessAction::Read, kind, owner))
            .unwrap_or(false)
    }

    /// policy check with the resource's stored owner resolved in place
    pub fn can_write(&self, actor: &Actor, kind: ResourceKind, id: Uuid) -> bool {
        self.owner_of(kind, id)
            .map(|owner| self.policy.allows(actor, AccessAction::Write, kind, owner))
            .unwrap_or(false)
    }

    fn owner_of(&self, kind: ResourceKind, id: Uuid) -> Option<UserId> {
        match kind {
            ResourceKind::FundType => self
                .fund_products
                .iter()
                .find(|p| p.id == id)
                .map(|p| p.personnel_id),
            ResourceKind::LoanType => self
                .loan_products
                .iter()
                .find(|p| p.id == id)
                .map(|p| p.personnel_id),
            ResourceKind::Fund => self.funds.iter().find(|f| f.id == id).map(|f| f.provider_id),
            ResourceKind::Loan => self.loans.iter().find(|l| l.id == id).map(|l| l.customer_id),
            ResourceKind::Entry => self
                .loans
                .iter()
                .find(|l| l.entries().iter().any(|e| e.id == id))
                .map(|l| l.customer_id),
        }
    }

    /// a customer with unpaid installments on an open loan gets no
    /// further credit until those are settled
    fn check_no_unsettled(&self, customer_id: CustomerId) -> Result<()> {
        if let Some(blocking) = self
            .loans
            .iter()
            .find(|l| l.customer_id == customer_id && l.is_outstanding() && l.has_unpaid_entries())
        {
            return Err(LendingError::UnsettledLoan {
                loan_id: blocking.id,
            });
        }
        Ok(())
    }

    fn find_loan(loans: &[Loan], loan_id: LoanId) -> Result<&Loan> {
        loans
            .iter()
            .find(|l| l.id == loan_id)
            .ok_or(LendingError::NotFound {
                kind: ResourceKind::Loan,
                id: loan_id,
            })
    }

    fn find_loan_mut(loans: &mut [Loan], loan_id: LoanId) -> Result<&mut Loan> {
        loans
            .iter_mut()
            .find(|l| l.id == loan_id)
            .ok_or(LendingError::NotFound {
                kind: ResourceKind::Loan,
                id: loan_id,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::types::{LoanStatus, Role};
    use chrono::{TimeZone, Utc};
    use hourglass_rs::TimeSource;
    use uuid::Uuid;

    fn test_time() -> SafeTimeProvider {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        SafeTimeProvider::new(TimeSource::Test(start))
    }

    struct Fixture {
        platform: LendingPlatform,
        loan_product: ProductId,
        fund_product: ProductId,
        personnel: Uuid,
        provider: Uuid,
    }

    /// catalog with one 12% loan product and 15,000.00 of committed funds
    fn seeded(time: &SafeTimeProvider) -> Fixture {
        let mut platform = LendingPlatform::new();
        let personnel = Uuid::new_v4();
        let provider = Uuid::new_v4();

        let loan_product = platform
            .register_loan_product(
                personnel,
                ProductTerms::new(
                    "Personal Loan",
                    Money::from_major(500),
                    Money::from_major(30_000),
                    Rate::from_percentage(12),
                    1,
                    60,
                )
                .unwrap(),
                time,
            )
            .unwrap();

        let fund_product = platform
            .register_fund_product(
                personnel,
                ProductTerms::new(
                    "Capital Fund",
                    Money::from_major(1_000),
                    Money::from_major(100_000),
                    Rate::from_percentage(8),
                    1,
                    120,
                )
                .unwrap(),
                time,
            )
            .unwrap();

        platform
            .commit_fund(provider, fund_product, Money::from_major(15_000), None, time)
            .unwrap();

        Fixture {
            platform,
            loan_product,
            fund_product,
            personnel,
            provider,
        }
    }

    #[test]
    fn test_balance_and_admission() {
        let time = test_time();
        let mut fx = seeded(&time);
        assert_eq!(fx.platform.available_balance(), Money::from_major(15_000));

        fx.platform
            .create_loan(
                Uuid::new_v4(),
                fx.loan_product,
                Money::from_major(5_000),
                12,
                None,
                &time,
            )
            .unwrap();
        assert_eq!(fx.platform.available_balance(), Money::from_major(10_000));

        let result = fx.platform.create_loan(
            Uuid::new_v4(),
            fx.loan_product,
            Money::from_major(11_000),
            12,
            None,
            &time,
        );
        match result {
            Err(LendingError::InsufficientBalance {
                available,
                requested,
            }) => {
                assert_eq!(available, Money::from_major(10_000));
                assert_eq!(requested, Money::from_major(11_000));
            }
            other => panic!("expected InsufficientBalance, got {other:?}"),
        }
    }

    #[test]
    fn test_create_loan_validates_against_product() {
        let time = test_time();
        let mut fx = seeded(&time);
        let customer = Uuid::new_v4();

        let result = fx.platform.create_loan(
            customer,
            Uuid::new_v4(),
            Money::from_major(1_000),
            12,
            None,
            &time,
        );
        assert!(matches!(
            result,
            Err(LendingError::NotFound {
                kind: ResourceKind::LoanType,
                ..
            })
        ));

        let result = fx.platform.create_loan(
            customer,
            fx.loan_product,
            Money::from_major(100),
            12,
            None,
            &time,
        );
        assert!(matches!(result, Err(LendingError::AmountOutOfRange { .. })));

        let result = fx.platform.create_loan(
            customer,
            fx.loan_product,
            Money::from_major(1_000),
            61,
            None,
            &time,
        );
        assert!(matches!(
            result,
            Err(LendingError::DurationOutOfRange { .. })
        ));
    }

    #[test]
    fn test_commit_fund_validates_against_product() {
        let time = test_time();
        let mut fx = seeded(&time);

        let result = fx.platform.commit_fund(
            fx.provider,
            Uuid::new_v4(),
            Money::from_major(5_000),
            None,
            &time,
        );
        assert!(matches!(
            result,
            Err(LendingError::NotFound {
                kind: ResourceKind::FundType,
                ..
            })
        ));

        let result = fx.platform.commit_fund(
            fx.provider,
            fx.fund_product,
            Money::from_major(500),
            None,
            &time,
        );
        assert!(matches!(result, Err(LendingError::AmountOutOfRange { .. })));

        let result = fx.platform.commit_fund(
            fx.provider,
            fx.fund_product,
            Money::from_major(5_000),
            Some(200),
            &time,
        );
        assert!(matches!(
            result,
            Err(LendingError::DurationOutOfRange { .. })
        ));
    }

    #[test]
    fn test_start_date_defaults_to_creation_date() {
        let time = test_time();
        let mut fx = seeded(&time);

        let loan_id = fx
            .platform
            .create_loan(
                Uuid::new_v4(),
                fx.loan_product,
                Money::from_major(1_000),
                12,
                None,
                &time,
            )
            .unwrap();

        let loan = fx.platform.loan(loan_id).unwrap();
        assert_eq!(loan.start_date, time.now().date_naive());

        let explicit = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let loan_id = fx
            .platform
            .create_loan(
                Uuid::new_v4(),
                fx.loan_product,
                Money::from_major(1_000),
                12,
                Some(explicit),
                &time,
            )
            .unwrap();
        assert_eq!(fx.platform.loan(loan_id).unwrap().start_date, explicit);
    }

    #[test]
    fn test_approval_generates_schedule_exactly_once() {
        let time = test_time();
        let mut fx = seeded(&time);

        let loan_id = fx
            .platform
            .create_loan(
                Uuid::new_v4(),
                fx.loan_product,
                Money::from_major(10_000),
                60,
                None,
                &time,
            )
            .unwrap();

        fx.platform.approve_loan(loan_id, &time).unwrap();
        let entries = fx.platform.entries(loan_id).unwrap();
        assert_eq!(entries.len(), 60);
        assert_eq!(entries[0].total_payment, Money::from_cents(22_244));

        // re-approval leaves the schedule untouched
        fx.platform.approve_loan(loan_id, &time).unwrap();
        assert_eq!(fx.platform.entries(loan_id).unwrap().len(), 60);

        let loan = fx.platform.loan(loan_id).unwrap();
        assert_eq!(loan.status, LoanStatus::Approved);
        assert_eq!(loan.monthly_payment(), Some(Money::from_cents(22_244)));
    }

    #[test]
    fn test_unsettled_loan_blocks_second_application() {
        let time = test_time();
        let mut fx = seeded(&time);
        let customer = Uuid::new_v4();

        let first = fx
            .platform
            .create_loan(
                customer,
                fx.loan_product,
                Money::from_major(1_200),
                3,
                None,
                &time,
            )
            .unwrap();

        // pending loan has no entries yet, so a second application passes
        // the unpaid check and is only stopped once a schedule exists
        fx.platform.approve_loan(first, &time).unwrap();

        let result = fx.platform.create_loan(
            customer,
            fx.loan_product,
            Money::from_major(1_000),
            6,
            None,
            &time,
        );
        assert!(matches!(
            result,
            Err(LendingError::UnsettledLoan { loan_id }) if loan_id == first
        ));

        // settling every installment clears the block
        let ids: Vec<_> = fx
            .platform
            .entries(first)
            .unwrap()
            .iter()
            .map(|e| e.id)
            .collect();
        for (i, id) in ids.iter().enumerate() {
            fx.platform
                .pay_installment(*id, &format!("txn-{i}"), &time)
                .unwrap();
        }
        assert!(fx
            .platform
            .create_loan(
                customer,
                fx.loan_product,
                Money::from_major(1_000),
                6,
                None,
                &time,
            )
            .is_ok());
    }

    #[test]
    fn test_rejected_loan_does_not_block_new_applications() {
        let time = test_time();
        let mut fx = seeded(&time);
        let customer = Uuid::new_v4();

        let first = fx
            .platform
            .create_loan(
                customer,
                fx.loan_product,
                Money::from_major(1_200),
                3,
                None,
                &time,
            )
            .unwrap();
        fx.platform.reject_loan(first, &time).unwrap();

        assert!(fx
            .platform
            .create_loan(
                customer,
                fx.loan_product,
                Money::from_major(1_000),
                6,
                None,
                &time,
            )
            .is_ok());

        let mine = fx.platform.loans_for_customer(customer);
        assert_eq!(mine.len(), 2);
        assert!(fx.platform.loans_for_customer(Uuid::new_v4()).is_empty());
    }

    #[test]
    fn test_payment_rules_at_the_platform_surface() {
        let time = test_time();
        let mut fx = seeded(&time);

        let loan_id = fx
            .platform
            .create_loan(
                Uuid::new_v4(),
                fx.loan_product,
                Money::from_major(1_200),
                3,
                None,
                &time,
            )
            .unwrap();
        fx.platform.approve_loan(loan_id, &time).unwrap();
        let ids: Vec<_> = fx
            .platform
            .entries(loan_id)
            .unwrap()
            .iter()
            .map(|e| e.id)
            .collect();

        // out of order
        let result = fx.platform.pay_installment(ids[1], "txn-A", &time);
        assert!(matches!(
            result,
            Err(LendingError::OutOfOrderPayment {
                sequence: 2,
                blocking_sequence: 1,
            })
        ));

        // in order succeeds and returns the updated row
        let paid = fx.platform.pay_installment(ids[0], "txn-A", &time).unwrap();
        assert!(paid.paid);
        assert_eq!(paid.settlement_reference.as_deref(), Some("txn-A"));

        // replay and reference reuse
        let result = fx.platform.pay_installment(ids[0], "txn-B", &time);
        assert!(matches!(result, Err(LendingError::AlreadyPaid { .. })));
        let result = fx.platform.pay_installment(ids[1], "txn-A", &time);
        assert!(matches!(
            result,
            Err(LendingError::DuplicateSettlement { .. })
        ));

        // unknown entry
        let result = fx.platform.pay_installment(Uuid::new_v4(), "txn-C", &time);
        assert!(matches!(
            result,
            Err(LendingError::NotFound {
                kind: ResourceKind::Entry,
                ..
            })
        ));
    }

    #[test]
    fn test_settlement_references_unique_across_loans() {
        let time = test_time();
        let mut fx = seeded(&time);

        let first = fx
            .platform
            .create_loan(
                Uuid::new_v4(),
                fx.loan_product,
                Money::from_major(1_200),
                3,
                None,
                &time,
            )
            .unwrap();
        let second = fx
            .platform
            .create_loan(
                Uuid::new_v4(),
                fx.loan_product,
                Money::from_major(2_400),
                6,
                None,
                &time,
            )
            .unwrap();
        fx.platform.approve_loan(first, &time).unwrap();
        fx.platform.approve_loan(second, &time).unwrap();

        let first_entry = fx.platform.entries(first).unwrap()[0].id;
        let second_entry = fx.platform.entries(second).unwrap()[0].id;

        fx.platform
            .pay_installment(first_entry, "txn-shared", &time)
            .unwrap();
        let result = fx.platform.pay_installment(second_entry, "txn-shared", &time);
        assert!(matches!(
            result,
            Err(LendingError::DuplicateSettlement { .. })
        ));
    }

    #[test]
    fn test_full_payoff_completes_loan_and_journals_it() {
        let time = test_time();
        let mut fx = seeded(&time);

        let loan_id = fx
            .platform
            .create_loan(
                Uuid::new_v4(),
                fx.loan_product,
                Money::from_major(1_200),
                3,
                None,
                &time,
            )
            .unwrap();
        fx.platform.approve_loan(loan_id, &time).unwrap();
        fx.platform.activate_loan(loan_id, &time).unwrap();
        fx.platform.take_events();

        let ids: Vec<_> = fx
            .platform
            .entries(loan_id)
            .unwrap()
            .iter()
            .map(|e| e.id)
            .collect();

        fx.platform.pay_installment(ids[0], "txn-0", &time).unwrap();
        fx.platform.pay_installment(ids[1], "txn-1", &time).unwrap();
        assert_eq!(
            fx.platform.loan(loan_id).unwrap().status,
            LoanStatus::Active
        );

        fx.platform.pay_installment(ids[2], "txn-2", &time).unwrap();
        assert_eq!(
            fx.platform.loan(loan_id).unwrap().status,
            LoanStatus::Completed
        );

        let events = fx.platform.take_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::InstallmentPaid { sequence: 3, .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::LoanFullySettled { .. })));
        assert!(events.iter().any(|e| matches!(
            e,
            Event::StatusChanged {
                new_status: LoanStatus::Completed,
                ..
            }
        )));
    }

    #[test]
    fn test_update_terms_revalidates_and_freezes() {
        let time = test_time();
        let mut fx = seeded(&time);

        let loan_id = fx
            .platform
            .create_loan(
                Uuid::new_v4(),
                fx.loan_product,
                Money::from_major(1_000),
                12,
                None,
                &time,
            )
            .unwrap();

        fx.platform
            .update_loan_terms(loan_id, Money::from_major(2_000), 24, &time)
            .unwrap();
        let loan = fx.platform.loan(loan_id).unwrap();
        assert_eq!(loan.amount, Money::from_major(2_000));
        assert_eq!(loan.term_months, 24);

        let result =
            fx.platform
                .update_loan_terms(loan_id, Money::from_major(100_000), 24, &time);
        assert!(matches!(result, Err(LendingError::AmountOutOfRange { .. })));

        fx.platform.approve_loan(loan_id, &time).unwrap();
        let result = fx
            .platform
            .update_loan_terms(loan_id, Money::from_major(3_000), 12, &time);
        assert!(matches!(
            result,
            Err(LendingError::ImmutableLoanState {
                status: LoanStatus::Approved,
            })
        ));
    }

    #[test]
    fn test_update_terms_cannot_overdraw_pool() {
        let time = test_time();
        let mut fx = seeded(&time);

        let loan_id = fx
            .platform
            .create_loan(
                Uuid::new_v4(),
                fx.loan_product,
                Money::from_major(6_000),
                12,
                None,
                &time,
            )
            .unwrap();
        assert_eq!(fx.platform.available_balance(), Money::from_major(9_000));

        // the revised amount is checked against the current balance, the
        // same way a fresh 12,000.00 application would be
        let result = fx
            .platform
            .update_loan_terms(loan_id, Money::from_major(12_000), 12, &time);
        assert!(matches!(
            result,
            Err(LendingError::InsufficientBalance { available, requested })
                if available == Money::from_major(9_000)
                    && requested == Money::from_major(12_000)
        ));

        let loan = fx.platform.loan(loan_id).unwrap();
        assert_eq!(loan.amount, Money::from_major(6_000));
        assert_eq!(fx.platform.available_balance(), Money::from_major(9_000));
    }

    #[test]
    fn test_update_terms_blocked_while_another_loan_unsettled() {
        let time = test_time();
        let mut fx = seeded(&time);
        let customer = Uuid::new_v4();

        let draft = fx
            .platform
            .create_loan(
                customer,
                fx.loan_product,
                Money::from_major(1_000),
                12,
                None,
                &time,
            )
            .unwrap();
        let active = fx
            .platform
            .create_loan(
                customer,
                fx.loan_product,
                Money::from_major(1_200),
                3,
                None,
                &time,
            )
            .unwrap();
        fx.platform.approve_loan(active, &time).unwrap();

        let result = fx
            .platform
            .update_loan_terms(draft, Money::from_major(2_000), 12, &time);
        assert!(matches!(
            result,
            Err(LendingError::UnsettledLoan { loan_id }) if loan_id == active
        ));
        assert_eq!(
            fx.platform.loan(draft).unwrap().amount,
            Money::from_major(1_000)
        );
    }

    #[test]
    fn test_failed_approval_leaves_application_pending() {
        let time = test_time();
        let mut fx = seeded(&time);
        let customer = Uuid::new_v4();

        let micro = fx
            .platform
            .register_loan_product(
                fx.personnel,
                ProductTerms::new(
                    "Micro Loan",
                    Money::ZERO,
                    Money::from_major(5_000),
                    Rate::from_percentage(12),
                    1,
                    12,
                )
                .unwrap(),
                &time,
            )
            .unwrap();

        // a zero amount sits inside the product bounds but cannot be
        // amortized, so approval fails at schedule generation
        let loan_id = fx
            .platform
            .create_loan(customer, micro, Money::ZERO, 6, None, &time)
            .unwrap();
        fx.platform.take_events();

        let result = fx.platform.approve_loan(loan_id, &time);
        assert!(matches!(result, Err(LendingError::InvalidPrincipal { .. })));

        let loan = fx.platform.loan(loan_id).unwrap();
        assert_eq!(loan.status, LoanStatus::Pending);
        assert!(!loan.has_schedule());
        assert!(fx.platform.take_events().is_empty());

        // still pending, so the application can be repaired and approved
        fx.platform
            .update_loan_terms(loan_id, Money::from_major(1_000), 6, &time)
            .unwrap();
        fx.platform.approve_loan(loan_id, &time).unwrap();

        let loan = fx.platform.loan(loan_id).unwrap();
        assert_eq!(loan.status, LoanStatus::Approved);
        assert_eq!(loan.entries().len(), 6);
    }

    #[test]
    fn test_journal_records_the_application_flow() {
        let time = test_time();
        let mut fx = seeded(&time);
        let customer = Uuid::new_v4();

        let loan_id = fx
            .platform
            .create_loan(
                customer,
                fx.loan_product,
                Money::from_major(1_200),
                3,
                None,
                &time,
            )
            .unwrap();
        fx.platform.approve_loan(loan_id, &time).unwrap();

        let events = fx.platform.take_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::LoanCreated { customer_id, .. } if *customer_id == customer)));
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::LoanApproved { .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::ScheduleGenerated { installments: 3, .. })));

        // journal drains on take
        assert!(fx.platform.take_events().is_empty());
    }

    #[test]
    fn test_access_checks_resolve_owners() {
        let time = test_time();
        let mut fx = seeded(&time);
        let customer = Uuid::new_v4();

        let loan_id = fx
            .platform
            .create_loan(
                customer,
                fx.loan_product,
                Money::from_major(1_200),
                3,
                None,
                &time,
            )
            .unwrap();
        fx.platform.approve_loan(loan_id, &time).unwrap();
        let entry_id = fx.platform.entries(loan_id).unwrap()[0].id;
        let fund_id = fx.platform.funds()[0].id;

        let owner = Actor::new(customer, Role::Customer);
        let stranger = Actor::new(Uuid::new_v4(), Role::Customer);
        let admin = Actor::new(Uuid::new_v4(), Role::Admin);

        assert!(fx.platform.can_read(&owner, ResourceKind::Loan, loan_id));
        assert!(fx.platform.can_read(&owner, ResourceKind::Entry, entry_id));
        assert!(!fx.platform.can_read(&stranger, ResourceKind::Loan, loan_id));
        assert!(fx.platform.can_read(&admin, ResourceKind::Loan, loan_id));

        // catalog rows are open reads, funds are not
        assert!(fx
            .platform
            .can_read(&stranger, ResourceKind::LoanType, fx.loan_product));
        assert!(!fx.platform.can_read(&stranger, ResourceKind::Fund, fund_id));
        assert!(fx.platform.can_read(
            &Actor::new(fx.provider, Role::Provider),
            ResourceKind::Fund,
            fund_id
        ));

        // personnel curate their own catalog rows
        assert!(fx.platform.can_write(
            &Actor::new(fx.personnel, Role::Personnel),
            ResourceKind::LoanType,
            fx.loan_product
        ));
        assert!(!fx.platform.can_write(
            &Actor::new(Uuid::new_v4(), Role::Personnel),
            ResourceKind::LoanType,
            fx.loan_product
        ));

        // unknown resource denies
        assert!(!fx
            .platform
            .can_read(&admin, ResourceKind::Loan, Uuid::new_v4()));
    }

    #[test]
    fn test_zero_rate_product_splits_evenly() {
        let time = test_time();
        let mut fx = seeded(&time);

        let free_product = fx
            .platform
            .register_loan_product(
                fx.personnel,
                ProductTerms::new(
                    "Interest-Free Starter",
                    Money::from_major(100),
                    Money::from_major(2_000),
                    Rate::ZERO,
                    1,
                    12,
                )
                .unwrap(),
                &time,
            )
            .unwrap();

        let loan_id = fx
            .platform
            .create_loan(
                Uuid::new_v4(),
                free_product,
                Money::from_major(1_200),
                12,
                None,
                &time,
            )
            .unwrap();
        fx.platform.approve_loan(loan_id, &time).unwrap();

        let entries = fx.platform.entries(loan_id).unwrap();
        assert_eq!(entries.len(), 12);
        for entry in entries {
            assert_eq!(entry.principal_portion, Money::from_major(100));
            assert_eq!(entry.interest_portion, Money::ZERO);
        }
    }
}
