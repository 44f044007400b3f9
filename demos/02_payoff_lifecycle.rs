/// payoff lifecycle - strict ordering, settlement uniqueness, completion
use chrono::{TimeZone, Utc};
use lending_pool_rs::{
    LendingPlatform, Money, ProductTerms, Rate, SafeTimeProvider, TimeSource, Uuid,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== payoff lifecycle example ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ));
    let mut platform = LendingPlatform::new();
    let personnel = Uuid::new_v4();

    // an interest-free starter product keeps the numbers round
    let starter = platform.register_loan_product(
        personnel,
        ProductTerms::new(
            "Interest-Free Starter",
            Money::from_major(100),
            Money::from_major(2_000),
            Rate::ZERO,
            1,
            12,
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
    platform.commit_fund(
        Uuid::new_v4(),
        fund_product,
        Money::from_major(10_000),
        None,
        &time,
    )?;

    // 1,200 over three months: three installments of 400
    let customer = Uuid::new_v4();
    let loan_id = platform.create_loan(
        customer,
        starter,
        Money::from_major(1_200),
        3,
        None,
        &time,
    )?;
    platform.approve_loan(loan_id, &time)?;
    platform.activate_loan(loan_id, &time)?;
    println!("loan approved and active");

    let ids: Vec<_> = platform
        .entries(loan_id)
        .unwrap()
        .iter()
        .map(|e| e.id)
        .collect();

    // skipping ahead is not allowed
    let err = platform
        .pay_installment(ids[1], "txn-early", &time)
        .unwrap_err();
    println!("paying installment 2 first: {err}");

    // settle in order
    platform.pay_installment(ids[0], "txn-001", &time)?;
    println!("installment 1 settled");

    // a settlement reference can be consumed once, ever
    let err = platform
        .pay_installment(ids[1], "txn-001", &time)
        .unwrap_err();
    println!("reusing txn-001: {err}");
    platform.pay_installment(ids[1], "txn-002", &time)?;
    println!("installment 2 settled");

    // a second application is blocked while installments remain open
    let err = platform
        .create_loan(
            customer,
            starter,
            Money::from_major(500),
            6,
            None,
            &time,
        )
        .unwrap_err();
    println!("second application while unsettled: {err}");

    // the final installment completes the loan on its own
    platform.pay_installment(ids[2], "txn-003", &time)?;
    let loan = platform.loan(loan_id).unwrap();
    println!("\nfinal installment settled");
    println!("loan status: {:?}", loan.status);

    // with the slate clean, a new application is admitted
    platform.create_loan(
        customer,
        starter,
        Money::from_major(500),
        6,
        None,
        &time,
    )?;
    println!("new application admitted after payoff");

    Ok(())
}
