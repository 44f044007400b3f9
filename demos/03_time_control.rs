/// time control - deterministic schedules and clocks under test time
use chrono::{Duration, TimeZone, Utc};
use lending_pool_rs::{
    Event, LendingPlatform, Money, ProductTerms, Rate, SafeTimeProvider, TimeSource, Uuid,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== time control example ===\n");

    // pin the clock to the end of january
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap(),
    ));
    let controller = time.test_control().unwrap();
    println!("clock pinned to: {}", time.now().format("%Y-%m-%d"));

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
        Money::from_major(10_000),
        None,
        &time,
    )?;

    // start date defaults to the pinned creation date, so the schedule
    // steps from jan 31 and clamps to month ends
    let loan_id = platform.create_loan(
        Uuid::new_v4(),
        loan_product,
        Money::from_major(3_000),
        4,
        None,
        &time,
    )?;
    platform.approve_loan(loan_id, &time)?;

    println!("\ndue dates (month-end clamping):");
    for entry in platform.entries(loan_id).unwrap() {
        println!("  installment {}: due {}", entry.sequence, entry.due_date);
    }

    // drain setup noise before watching payments land
    platform.take_events();

    // settle one installment per month of advanced time
    let ids: Vec<_> = platform
        .entries(loan_id)
        .unwrap()
        .iter()
        .map(|e| e.id)
        .collect();
    println!("\npaying month by month:");
    for (i, id) in ids.iter().enumerate() {
        platform.pay_installment(*id, &format!("txn-{i}"), &time)?;
        controller.advance(Duration::days(30));
    }

    for event in platform.take_events() {
        if let Event::InstallmentPaid {
            sequence,
            timestamp,
            ..
        } = event
        {
            println!("  installment {} paid on {}", sequence, timestamp.format("%Y-%m-%d"));
        }
    }

    let loan = platform.loan(loan_id).unwrap();
    println!("\nfinal status: {:?}", loan.status);

    Ok(())
}
