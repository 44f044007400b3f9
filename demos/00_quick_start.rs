/// quick start - minimal example to get started
use lending_pool_rs::{
    LendingPlatform, Money, ProductTerms, Rate, SafeTimeProvider, TimeSource, Uuid,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::System);
    let mut platform = LendingPlatform::new();

    // personnel publish a 12% personal loan product
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

    // a provider funds the pool
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

    // a customer borrows 10,000 over five years
    let customer = Uuid::new_v4();
    let loan_id = platform.create_loan(
        customer,
        loan_product,
        Money::from_major(10_000),
        60,
        None,
        &time,
    )?;
    platform.approve_loan(loan_id, &time)?;

    let loan = platform.loan(loan_id).unwrap();
    println!("monthly payment: {}", loan.monthly_payment().unwrap());
    let first_entry = loan.entries()[0].id;

    // settle the first installment
    let paid = platform.pay_installment(first_entry, "txn-0001", &time)?;
    println!(
        "installment {} settled: {} ({} principal + {} interest)",
        paid.sequence, paid.total_payment, paid.principal_portion, paid.interest_portion
    );

    println!("pool balance: {}", platform.available_balance());

    Ok(())
}
