/// json state - read models for debugging and monitoring
use chrono::{TimeZone, Utc};
use lending_pool_rs::{
    LendingPlatform, LoanView, Money, PoolView, ProductTerms, Rate, SafeTimeProvider, TimeSource,
    Uuid,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== json state example ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ));

    let mut platform = LendingPlatform::new();
    let personnel = Uuid::new_v4();
    let loan_product = platform.register_loan_product(
        personnel,
        ProductTerms::new(
            "Personal Loan",
            Money::from_major(500),
            Money::from_major(30_000),
            Rate::from_percentage(12),
            1,
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
    platform.commit_fund(
        Uuid::new_v4(),
        fund_product,
        Money::from_major(15_000),
        None,
        &time,
    )?;

    let loan_id = platform.create_loan(
        Uuid::new_v4(),
        loan_product,
        Money::from_major(1_200),
        3,
        None,
        &time,
    )?;

    // stage 1: pending application, no schedule yet
    println!("stage 1: pending application");
    println!("----------------------------");
    let view = LoanView::from_loan(platform.loan(loan_id).unwrap());
    println!("{}\n", view.to_json_pretty()?);

    // stage 2: approved, schedule attached
    platform.approve_loan(loan_id, &time)?;
    println!("stage 2: approved with schedule");
    println!("-------------------------------");
    let view = LoanView::from_loan(platform.loan(loan_id).unwrap());
    println!("{}\n", view.to_json_pretty()?);

    // stage 3: first installment settled
    platform.activate_loan(loan_id, &time)?;
    let first = platform.entries(loan_id).unwrap()[0].id;
    platform.pay_installment(first, "txn-0001", &time)?;
    println!("stage 3: one installment paid");
    println!("-----------------------------");
    let view = LoanView::from_loan(platform.loan(loan_id).unwrap());
    println!("{}\n", view.to_json_pretty()?);

    // the pool-wide dashboard
    println!("=== pool dashboard ===\n");
    let pool = PoolView::from_platform(&platform);
    println!("{}", pool.to_json_pretty()?);

    Ok(())
}
