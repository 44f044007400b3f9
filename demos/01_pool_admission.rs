/// pool admission - provider funding, balance gating, and role policy
use chrono::{TimeZone, Utc};
use lending_pool_rs::{
    Actor, LendingPlatform, Money, ProductTerms, Rate, ResourceKind, Role, SafeTimeProvider,
    TimeSource, Uuid,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== pool admission example ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ));
    let mut platform = LendingPlatform::new();

    // personnel curate the catalog
    let personnel = Uuid::new_v4();
    let loan_product = platform.register_loan_product(
        personnel,
        ProductTerms::new(
            "Personal Loan",
            Money::from_major(500),
            Money::from_major(30_000),
            Rate::from_percentage(12),
            6,
            60,
        )?,
        &time,
    )?;
    let fund_product = platform.register_fund_product(
        personnel,
        ProductTerms::new(
            "Capital Fund",
            Money::from_major(1_000),
            Money::from_major(100_000),
            Rate::from_percentage(8),
            1,
            120,
        )?,
        &time,
    )?;

    // two providers commit capital
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    platform.commit_fund(alice, fund_product, Money::from_major(10_000), None, &time)?;
    platform.commit_fund(bob, fund_product, Money::from_major(5_000), Some(24), &time)?;
    println!("committed capital: {}", platform.available_balance());

    // a customer takes out 5,000
    let customer = Uuid::new_v4();
    platform.create_loan(
        customer,
        loan_product,
        Money::from_major(5_000),
        24,
        None,
        &time,
    )?;
    println!("balance after admission: {}", platform.available_balance());

    // the pool cannot absorb an 11,000 request any more
    let err = platform
        .create_loan(
            Uuid::new_v4(),
            loan_product,
            Money::from_major(11_000),
            24,
            None,
            &time,
        )
        .unwrap_err();
    println!("over-limit application bounced: {err}");

    // product bounds gate applications before the pool does
    let err = platform
        .create_loan(
            Uuid::new_v4(),
            loan_product,
            Money::from_major(100),
            24,
            None,
            &time,
        )
        .unwrap_err();
    println!("under-minimum application bounced: {err}");

    // role policy: funds are private, the catalog is not
    println!("\n--- access policy ---");
    let alice_fund = platform.funds()[0].id;
    let alice_actor = Actor::new(alice, Role::Provider);
    let bob_actor = Actor::new(bob, Role::Provider);
    let customer_actor = Actor::new(customer, Role::Customer);

    println!(
        "alice reads her own fund:      {}",
        platform.can_read(&alice_actor, ResourceKind::Fund, alice_fund)
    );
    println!(
        "bob reads alice's fund:        {}",
        platform.can_read(&bob_actor, ResourceKind::Fund, alice_fund)
    );
    println!(
        "customer reads the catalog:    {}",
        platform.can_read(&customer_actor, ResourceKind::LoanType, loan_product)
    );
    println!(
        "customer edits the catalog:    {}",
        platform.can_write(&customer_actor, ResourceKind::LoanType, loan_product)
    );

    Ok(())
}
