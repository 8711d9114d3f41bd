//! Calling layer around the engine.
//!
//! A [`HabitSession`] loads the active contract and its history from a
//! [`ContractStore`], asks a [`Clock`] for today's date, runs the pure engine
//! and writes the history back after every accepted action. It is the only
//! place that decides when to persist.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::contract::{
    CheckInHistory, CheckInStatus, Contract, ContractDraft, PaymentStatus,
};
use crate::day::{resolve_all, DayView};
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::ledger::{aggregate, LedgerSummary};
use crate::reveal::{next_focus_day, RevealController, RevealOutcome};
use crate::storage::{Config, ContractStore};

/// Everything a front-end needs to draw the contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub contract_id: String,
    pub habit_title: String,
    pub deposit_cents: u64,
    pub payment_status: PaymentStatus,
    pub today: NaiveDate,
    /// `None` before day 1 and after the last day.
    pub current_day: Option<u32>,
    pub focus_day: u32,
    pub days: Vec<DayView>,
    pub ledger: LedgerSummary,
    /// Deposit whose outcome is not yet revealed.
    pub unsettled_cents: u64,
    /// Every day revealed.
    pub settled: bool,
    /// Days revealed by the auto-reveal pass while building this view.
    pub auto_revealed: Vec<u32>,
}

pub struct HabitSession<S, C> {
    store: S,
    clock: C,
    config: Config,
}

impl<S: ContractStore, C: Clock> HabitSession<S, C> {
    pub fn new(store: S, clock: C, config: Config) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The active contract.
    pub fn contract(&self) -> Result<Contract> {
        self.store.load_contract()?.ok_or(CoreError::NoActiveContract)
    }

    fn load(&self) -> Result<(Contract, CheckInHistory)> {
        let contract = self.contract()?;
        let history = self.store.load_history(&contract.id)?;
        Ok((contract, history))
    }

    /// Create a contract and make it the active one. Starting a new cycle
    /// is the same operation: the previous contract is left untouched.
    pub fn create_contract(&mut self, draft: ContractDraft) -> Result<(Contract, Event)> {
        let contract = draft.build(self.clock.today(), &self.config.wizard, &self.config.schedule)?;
        self.store.save_contract(&contract)?;
        self.store.save_history(&contract.id, &CheckInHistory::new())?;

        let event = Event::ContractCreated {
            contract_id: contract.id.clone(),
            duration: contract.duration,
            deposit_cents: contract.deposit_cents,
            first_day: contract.first_day(),
            at: self.clock.now(),
        };
        Ok((contract, event))
    }

    /// Stand-in for the payment collaborator.
    pub fn set_payment_status(&mut self, status: PaymentStatus) -> Result<Contract> {
        let mut contract = self.contract()?;
        contract.set_payment_status(status);
        self.store.save_contract(&contract)?;
        tracing::info!(contract_id = %contract.id, ?status, "payment status updated");
        Ok(contract)
    }

    /// Derive the full view, running the auto-reveal pass first if enabled.
    pub fn dashboard(&mut self) -> Result<Dashboard> {
        let (contract, mut history) = self.load()?;
        let today = self.clock.today();

        let mut auto_revealed = Vec::new();
        if self.config.reveal.auto_reveal_on_view && contract.is_active() {
            let mut controller = RevealController::new(&contract, history);
            auto_revealed = controller.auto_reveal_elapsed(today)?;
            history = controller.into_history();
            if !auto_revealed.is_empty() {
                self.store.save_history(&contract.id, &history)?;
            }
        }

        let days = resolve_all(&contract, &history, today)?;
        let ledger = aggregate(&days);
        let settled = days.iter().all(|d| d.status.is_revealed());

        Ok(Dashboard {
            contract_id: contract.id.clone(),
            habit_title: contract.habit_title.clone(),
            deposit_cents: contract.deposit_cents,
            payment_status: contract.payment_status,
            today,
            current_day: contract.current_day(today),
            focus_day: next_focus_day(&days),
            unsettled_cents: contract.deposit_cents.saturating_sub(ledger.settled_cents()),
            settled,
            ledger,
            days,
            auto_revealed,
        })
    }

    /// Report today's habit as done.
    pub fn check_in(&mut self) -> Result<Event> {
        self.report(CheckInStatus::Completed)
    }

    /// Report today's habit as missed.
    pub fn mark_missed(&mut self) -> Result<Event> {
        self.report(CheckInStatus::Missed)
    }

    fn report(&mut self, status: CheckInStatus) -> Result<Event> {
        let (contract, history) = self.load()?;
        let today = self.clock.today();
        let at = self.clock.now();
        let day = today_or_nearest(&contract, today);

        let mut controller = RevealController::new(&contract, history);
        match status {
            CheckInStatus::Completed => controller.check_in(day, today, at)?,
            CheckInStatus::Missed => controller.mark_missed(day, today, at)?,
        };
        self.store.save_history(&contract.id, controller.history())?;

        Ok(Event::DayReported {
            day_number: day,
            status,
            at,
        })
    }

    /// Reveal a day. The history is saved before this returns, so a caller
    /// may animate the result without risking the reveal.
    pub fn reveal(&mut self, day_number: u32) -> Result<(RevealOutcome, Vec<Event>)> {
        let (contract, history) = self.load()?;
        let today = self.clock.today();
        let at = self.clock.now();

        let mut controller = RevealController::new(&contract, history);
        let outcome = controller.reveal(day_number, today)?;
        self.store.save_history(&contract.id, controller.history())?;

        let mut events = vec![Event::DayRevealed {
            day_number,
            status: outcome.status,
            reward_cents: outcome.reward_cents,
            at,
        }];
        events.extend(self.settled_event(&contract, controller.history(), today)?);
        Ok((outcome, events))
    }

    /// Reveal the day [`next_focus_day`] points at.
    pub fn reveal_next(&mut self) -> Result<(RevealOutcome, Vec<Event>)> {
        let (contract, history) = self.load()?;
        let day = next_focus_day(&resolve_all(&contract, &history, self.clock.today())?);
        self.reveal(day)
    }

    /// Defer a reveal; nothing is written.
    pub fn skip_reveal(&mut self, day_number: u32) -> Result<Event> {
        let (contract, history) = self.load()?;
        let mut controller = RevealController::new(&contract, history);
        controller.skip_reveal(day_number, self.clock.today())?;
        Ok(Event::RevealDeferred {
            day_number,
            at: self.clock.now(),
        })
    }

    /// Run the auto-reveal pass explicitly.
    pub fn auto_reveal(&mut self) -> Result<Vec<Event>> {
        let (contract, history) = self.load()?;
        let today = self.clock.today();

        let mut controller = RevealController::new(&contract, history);
        let days = controller.auto_reveal_elapsed(today)?;
        if days.is_empty() {
            return Ok(Vec::new());
        }
        self.store.save_history(&contract.id, controller.history())?;

        let forfeited_cents = days
            .iter()
            .filter_map(|d| contract.reward_schedule.get(*d as usize - 1))
            .sum();
        let mut events = vec![Event::DaysAutoRevealed {
            days,
            forfeited_cents,
            at: self.clock.now(),
        }];
        events.extend(self.settled_event(&contract, controller.history(), today)?);
        Ok(events)
    }

    fn settled_event(
        &self,
        contract: &Contract,
        history: &CheckInHistory,
        today: NaiveDate,
    ) -> Result<Option<Event>> {
        let days = resolve_all(contract, history, today)?;
        if !days.iter().all(|d| d.status.is_revealed()) {
            return Ok(None);
        }
        let ledger = aggregate(&days);
        tracing::info!(
            contract_id = %contract.id,
            earned_cents = ledger.earned_cents,
            forfeited_cents = ledger.forfeited_cents,
            "contract settled"
        );
        Ok(Some(Event::ContractSettled {
            contract_id: contract.id.clone(),
            earned_cents: ledger.earned_cents,
            forfeited_cents: ledger.forfeited_cents,
            at: self.clock.now(),
        }))
    }
}

/// Today's day number, or the nearest contract day when today is outside
/// the contract. The controller then rejects the action with the real
/// status of that day.
fn today_or_nearest(contract: &Contract, today: NaiveDate) -> u32 {
    match contract.current_day(today) {
        Some(day) => day,
        None if contract.current_position(today) < 1 => 1,
        None => contract.duration.days(),
    }
}
