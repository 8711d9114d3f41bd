//! Integration tests for the reward / day-status / reveal engine.

use chrono::{Duration, NaiveDate, Utc};
use habitstake_core::{
    aggregate, next_focus_day, resolve_all, resolve_day, CheckInHistory, CheckInRecord,
    CheckInStatus, Contract, ContractDraft, ContractDuration, DayStatus, EngineError,
    RevealController, StartDate, VariancePolicy, WizardConfig,
};

fn created_on() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

fn build(duration: ContractDuration, deposit_cents: u64, policy: &VariancePolicy) -> Contract {
    ContractDraft::new("Practice guitar", duration, deposit_cents)
        .build_with_id(
            format!("fixture-{}", duration.days()),
            created_on(),
            &WizardConfig::default(),
            policy,
        )
        .unwrap()
}

fn day(contract: &Contract, n: i64) -> NaiveDate {
    contract.first_day() + Duration::days(n - 1)
}

#[test]
fn test_example_week_scenario() {
    // 140.00 over 7 days with an even split: 20.00 per day.
    let contract = build(ContractDuration::Week, 14_000, &VariancePolicy::uniform());
    assert_eq!(contract.reward_schedule, vec![2_000; 7]);

    let mut ctl = RevealController::new(&contract, CheckInHistory::new());
    for d in 1..=5 {
        ctl.check_in(d, day(&contract, d as i64), Utc::now()).unwrap();
    }
    ctl.mark_missed(6, day(&contract, 6), Utc::now()).unwrap();

    let today = day(&contract, 7);
    for d in 1..=6 {
        ctl.reveal(d, today).unwrap();
    }

    let views = ctl.views(today).unwrap();
    let summary = aggregate(&views);
    assert_eq!(summary.current_streak, 0);
    assert_eq!(summary.longest_streak, 5);
    assert_eq!(summary.earned_cents, 10_000);
    assert_eq!(summary.forfeited_cents, 2_000);
    assert_eq!(views[6].status, DayStatus::CurrentUnreported);

    // One day earlier the last day has not opened yet.
    let earlier = resolve_day(7, &contract, ctl.history(), day(&contract, 6)).unwrap();
    assert_eq!(earlier.status, DayStatus::LockedFuture);
}

#[test]
fn test_ledger_closes_on_three_week_contract() {
    let contract = build(ContractDuration::ThreeWeeks, 31_337, &VariancePolicy::default());
    let mut ctl = RevealController::new(&contract, CheckInHistory::new());

    // Alternate completions, explicit misses and silence.
    for d in 1..=21u32 {
        let today = day(&contract, i64::from(d));
        match d % 3 {
            0 => {
                ctl.check_in(d, today, Utc::now()).unwrap();
            }
            1 => {
                ctl.mark_missed(d, today, Utc::now()).unwrap();
            }
            _ => {}
        }
    }

    let after = day(&contract, 22);
    for d in 1..=21u32 {
        ctl.reveal(d, after).unwrap();
    }

    let views = ctl.views(after).unwrap();
    assert!(views.iter().all(|v| v.status.is_revealed()));
    let summary = aggregate(&views);
    assert_eq!(summary.earned_cents + summary.forfeited_cents, contract.deposit_cents);
}

#[test]
fn test_streak_reset_preserves_longest() {
    let contract = build(ContractDuration::TwoWeeks, 14_000, &VariancePolicy::default());
    let mut ctl = RevealController::new(&contract, CheckInHistory::new());

    for d in 1..=4u32 {
        ctl.check_in(d, day(&contract, i64::from(d)), Utc::now()).unwrap();
    }
    ctl.mark_missed(5, day(&contract, 5), Utc::now()).unwrap();

    let today = day(&contract, 6);
    for d in 1..=4 {
        ctl.reveal(d, today).unwrap();
    }
    let before = aggregate(&ctl.views(today).unwrap());
    assert_eq!(before.current_streak, 4);

    ctl.reveal(5, today).unwrap();
    let after = aggregate(&ctl.views(today).unwrap());
    assert_eq!(after.current_streak, 0);
    assert!(after.longest_streak >= 4);
    assert_eq!(after.longest_streak, before.longest_streak);
}

#[test]
fn test_deferred_reveal_hides_amount_until_next_day() {
    let contract = build(ContractDuration::Week, 7_000, &VariancePolicy::default());
    assert_eq!(contract.start, StartDate::Today);
    let today = contract.created_on;

    let mut ctl = RevealController::new(&contract, CheckInHistory::new());
    ctl.check_in(1, today, Utc::now()).unwrap();

    let view = resolve_day(1, &contract, ctl.history(), today).unwrap();
    assert_eq!(view.status, DayStatus::CurrentPendingReveal);
    assert_eq!(view.reward_cents, None);
    assert!(matches!(
        ctl.reveal(1, today),
        Err(EngineError::InvalidTransition { day: 1, .. })
    ));

    let tomorrow = today + Duration::days(1);
    let outcome = ctl.reveal(1, tomorrow).unwrap();
    assert_eq!(outcome.status, DayStatus::CompletedRevealed);
    let view = resolve_day(1, &contract, ctl.history(), tomorrow).unwrap();
    assert_eq!(view.reward_cents, Some(contract.reward_schedule[0]));
}

#[test]
fn test_focus_targets_oldest_unrevealed_day() {
    let contract = build(ContractDuration::Week, 7_000, &VariancePolicy::default());
    let history: CheckInHistory = [
        (2, CheckInStatus::Completed),
        (5, CheckInStatus::Missed),
    ]
    .into_iter()
    .map(|(d, status)| CheckInRecord {
        day_number: d,
        status,
        timestamp: Utc::now(),
        revealed: false,
    })
    .collect();

    let views = resolve_all(&contract, &history, day(&contract, 6)).unwrap();
    assert_eq!(views[1].status, DayStatus::CompletedUnrevealed);
    assert_eq!(views[4].status, DayStatus::MissedUnrevealed);
    assert_eq!(next_focus_day(&views), 2);
}

#[test]
fn test_regenerating_schedule_matches_stored_one() {
    let policy = VariancePolicy::default();
    let contract = build(ContractDuration::Month, 45_000, &policy);
    let regenerated = habitstake_core::generate_schedule(
        &contract.id,
        contract.duration,
        contract.deposit_cents,
        &policy,
    )
    .unwrap();
    assert_eq!(regenerated, contract.reward_schedule);
}

#[test]
fn test_tampered_schedule_refuses_to_resolve() {
    let mut contract = build(ContractDuration::Week, 7_000, &VariancePolicy::default());
    contract.deposit_cents += 1;
    let mut ctl = RevealController::new(&contract, CheckInHistory::new());
    assert!(matches!(
        ctl.check_in(1, contract.created_on, Utc::now()),
        Err(EngineError::MalformedSchedule { .. })
    ));
    assert!(ctl.history().is_empty());
}
