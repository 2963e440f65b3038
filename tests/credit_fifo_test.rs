//! FIFO consumption planning over stored credits.

use chrono::{Duration, Utc};
use khata_api::entities::credit::{self, CreditOrigin, CreditParty, CreditStatus};
use khata_api::services::credit_ledger::plan_fifo_consumption;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

fn credit(issue_days_ago: i64, original: Decimal, used: Decimal) -> credit::Model {
    let now = Utc::now();
    credit::Model {
        id: Uuid::new_v4(),
        account_id: Uuid::new_v4(),
        credit_number: format!("CRN-{}", issue_days_ago),
        party: CreditParty::Customer,
        counterparty_id: Uuid::new_v4(),
        origin: CreditOrigin::Return,
        original_amount: original,
        used_amount: used,
        remaining_amount: original - used,
        status: if original == used {
            CreditStatus::Used
        } else {
            CreditStatus::Active
        },
        issue_date: now - Duration::days(issue_days_ago),
        expiry_date: None,
        auto_expire: false,
        reason: None,
        created_by: Uuid::new_v4(),
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn consumption_walks_credits_oldest_first() {
    let oldest = credit(90, dec!(300), Decimal::ZERO);
    let middle = credit(30, dec!(300), Decimal::ZERO);
    let newest = credit(1, dec!(300), Decimal::ZERO);

    // Deliberately shuffled input; order comes from issue dates.
    let draws = plan_fifo_consumption(
        &[newest.clone(), oldest.clone(), middle.clone()],
        dec!(700),
        Utc::now(),
    )
    .unwrap();

    assert_eq!(draws.len(), 3);
    assert_eq!(draws[0].credit_id, oldest.id);
    assert_eq!(draws[0].amount, dec!(300));
    assert_eq!(draws[1].credit_id, middle.id);
    assert_eq!(draws[1].amount, dec!(300));
    assert_eq!(draws[2].credit_id, newest.id);
    assert_eq!(draws[2].amount, dec!(100));
}

#[test]
fn partially_used_credit_offers_only_its_remainder() {
    let old = credit(60, dec!(1000), dec!(400));
    assert_eq!(old.remaining_amount, dec!(600));

    let draws = plan_fifo_consumption(&[old.clone()], dec!(600), Utc::now()).unwrap();
    assert_eq!(draws[0].amount, dec!(600));

    // One rupee more than the remainder must fail outright.
    let err = plan_fifo_consumption(&[old], dec!(601), Utc::now()).unwrap_err();
    assert_eq!(err.kind(), "insufficient_balance");
}

#[test]
fn exhausted_credit_rejects_oversized_usage() {
    // 1000 issued, 400 used: a further draw of 700 must fail and leave the
    // remaining 600 untouched.
    let c = credit(15, dec!(1000), dec!(400));
    assert_eq!(c.remaining_amount, dec!(600));

    let err = plan_fifo_consumption(&[c.clone()], dec!(700), Utc::now()).unwrap_err();
    assert_eq!(err.kind(), "insufficient_balance");
    assert_eq!(c.remaining_amount, dec!(600));
    assert_eq!(c.used_amount, dec!(400));
}

#[test]
fn shortfall_consumes_nothing() {
    let a = credit(10, dec!(100), Decimal::ZERO);
    let b = credit(5, dec!(50), Decimal::ZERO);

    // 150 available, 200 requested: the plan is refused as a whole rather
    // than draining the candidates partially.
    let result = plan_fifo_consumption(&[a, b], dec!(200), Utc::now());
    assert!(result.is_err());
}

#[test]
fn exhausted_and_expired_credits_are_passed_over() {
    let drained = credit(90, dec!(500), dec!(500));
    let expired = {
        let mut c = credit(60, dec!(500), Decimal::ZERO);
        c.auto_expire = true;
        c.expiry_date = Some(Utc::now() - Duration::days(1));
        c
    };
    let open = credit(10, dec!(200), Decimal::ZERO);

    let draws =
        plan_fifo_consumption(&[drained, expired, open.clone()], dec!(150), Utc::now()).unwrap();
    assert_eq!(draws.len(), 1);
    assert_eq!(draws[0].credit_id, open.id);
}

#[test]
fn usage_totals_replay_from_draw_amounts() {
    let credits = vec![
        credit(30, dec!(120), Decimal::ZERO),
        credit(20, dec!(80), Decimal::ZERO),
        credit(10, dec!(50), Decimal::ZERO),
    ];
    let requested = dec!(230);
    let draws = plan_fifo_consumption(&credits, requested, Utc::now()).unwrap();

    let consumed: Decimal = draws.iter().map(|d| d.amount).sum();
    assert_eq!(consumed, requested);

    // Every draw respects the remaining balance of its credit.
    for draw in &draws {
        let source = credits.iter().find(|c| c.id == draw.credit_id).unwrap();
        assert!(draw.amount <= source.remaining_amount);
        assert!(draw.amount > Decimal::ZERO);
    }
}
