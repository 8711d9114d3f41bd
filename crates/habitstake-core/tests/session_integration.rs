//! Integration tests for the session layer over the SQLite store.

use chrono::NaiveDate;
use habitstake_core::{
    Config, ContractDraft, ContractDuration, ContractStore, CoreError, DayStatus, EngineError,
    Event, FixedClock, HabitSession, SqliteStore, StartDate,
};

fn session() -> HabitSession<SqliteStore, FixedClock> {
    let clock = FixedClock::new(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap());
    let mut config = Config::default();
    config.reveal.auto_reveal_on_view = false;
    HabitSession::new(SqliteStore::open_memory().unwrap(), clock, config)
}

#[test]
fn test_full_cycle_persists_through_store() {
    let mut s = session();
    let (contract, event) = s
        .create_contract(
            ContractDraft::new("Cold shower", ContractDuration::Week, 10_500)
                .starting(StartDate::Tomorrow),
        )
        .unwrap();
    assert!(matches!(event, Event::ContractCreated { .. }));
    assert_eq!(s.dashboard().unwrap().current_day, None);

    s.clock_mut().advance_days(1);
    for _ in 0..6 {
        s.check_in().unwrap();
        s.clock_mut().advance_days(1);
    }
    // Day 7 passes without a report.
    s.clock_mut().advance_days(1);

    let history = s.store().load_history(&contract.id).unwrap();
    assert_eq!(history.len(), 6);

    let dash = s.dashboard().unwrap();
    assert_eq!(dash.focus_day, 1);
    assert_eq!(dash.days[6].status, DayStatus::PastUnreported);
    assert_eq!(dash.ledger.settled_cents(), 0);

    for _ in 0..6 {
        s.reveal_next().unwrap();
    }
    let events = s.auto_reveal().unwrap();
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::DaysAutoRevealed { days, .. } if days == &vec![7])));
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::ContractSettled { .. })));

    let dash = s.dashboard().unwrap();
    assert!(dash.settled);
    assert_eq!(dash.unsettled_cents, 0);
    assert_eq!(dash.ledger.longest_streak, 6);
    assert_eq!(dash.ledger.current_streak, 0);
    assert_eq!(
        dash.ledger.earned_cents + dash.ledger.forfeited_cents,
        contract.deposit_cents
    );
}

#[test]
fn test_skip_reveal_writes_nothing() {
    let mut s = session();
    let (contract, _) = s
        .create_contract(ContractDraft::new("Walk", ContractDuration::Week, 7_000))
        .unwrap();
    s.mark_missed().unwrap();
    s.clock_mut().advance_days(1);

    let before = s.store().load_history(&contract.id).unwrap();
    let event = s.skip_reveal(1).unwrap();
    assert!(matches!(event, Event::RevealDeferred { day_number: 1, .. }));
    assert_eq!(s.store().load_history(&contract.id).unwrap(), before);
    assert_eq!(s.dashboard().unwrap().days[0].status, DayStatus::MissedUnrevealed);
}

#[test]
fn test_rejected_action_leaves_store_untouched() {
    let mut s = session();
    let (contract, _) = s
        .create_contract(ContractDraft::new("Walk", ContractDuration::Week, 7_000))
        .unwrap();
    s.check_in().unwrap();
    let before = s.store().load_history(&contract.id).unwrap();

    assert!(matches!(
        s.check_in(),
        Err(CoreError::Engine(EngineError::InvalidTransition { .. }))
    ));
    assert!(matches!(
        s.reveal(9),
        Err(CoreError::Engine(EngineError::OutOfRangeDay { day: 9, duration: 7 }))
    ));
    assert_eq!(s.store().load_history(&contract.id).unwrap(), before);
}

#[test]
fn test_new_cycle_starts_with_empty_history() {
    let mut s = session();
    s.create_contract(ContractDraft::new("Walk", ContractDuration::Week, 7_000))
        .unwrap();
    s.check_in().unwrap();

    let (second, _) = s
        .create_contract(ContractDraft::new("Run", ContractDuration::TwoWeeks, 14_000))
        .unwrap();
    let dash = s.dashboard().unwrap();
    assert_eq!(dash.contract_id, second.id);
    assert_eq!(dash.days.len(), 14);
    assert_eq!(dash.days[0].status, DayStatus::CurrentUnreported);
}
