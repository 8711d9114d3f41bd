//! Contract creation.
//!
//! Validates the user's choices, assigns an id and embeds the generated
//! reward schedule. The id doubles as the schedule seed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Contract, ContractDuration, PaymentStatus, StartDate};
use crate::error::{CoreError, ValidationError};
use crate::schedule::{generate_schedule, VariancePolicy};

/// Deposit bounds accepted by the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardConfig {
    #[serde(default = "default_min_deposit_cents")]
    pub min_deposit_cents: u64,
    #[serde(default = "default_max_deposit_cents")]
    pub max_deposit_cents: u64,
}

fn default_min_deposit_cents() -> u64 {
    500
}
fn default_max_deposit_cents() -> u64 {
    100_000
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            min_deposit_cents: default_min_deposit_cents(),
            max_deposit_cents: default_max_deposit_cents(),
        }
    }
}

/// What the user picked in the creation flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractDraft {
    pub habit_title: String,
    pub duration: ContractDuration,
    pub deposit_cents: u64,
    #[serde(default)]
    pub start: StartDate,
}

impl ContractDraft {
    pub fn new(habit_title: impl Into<String>, duration: ContractDuration, deposit_cents: u64) -> Self {
        Self {
            habit_title: habit_title.into(),
            duration,
            deposit_cents,
            start: StartDate::Today,
        }
    }

    pub fn starting(mut self, start: StartDate) -> Self {
        self.start = start;
        self
    }

    pub fn validate(&self, config: &WizardConfig) -> Result<(), ValidationError> {
        if self.habit_title.trim().is_empty() {
            return Err(ValidationError::Empty("habit_title".into()));
        }
        if self.deposit_cents < config.min_deposit_cents
            || self.deposit_cents > config.max_deposit_cents
        {
            return Err(ValidationError::DepositOutOfRange {
                amount: self.deposit_cents,
                min: config.min_deposit_cents,
                max: config.max_deposit_cents,
            });
        }
        Ok(())
    }

    /// Build a contract with a fresh UUID id.
    pub fn build(
        self,
        today: NaiveDate,
        config: &WizardConfig,
        policy: &VariancePolicy,
    ) -> Result<Contract, CoreError> {
        self.build_with_id(Uuid::new_v4().to_string(), today, config, policy)
    }

    /// Build a contract with a caller-chosen id.
    pub fn build_with_id(
        self,
        id: String,
        today: NaiveDate,
        config: &WizardConfig,
        policy: &VariancePolicy,
    ) -> Result<Contract, CoreError> {
        self.validate(config)?;
        let reward_schedule = generate_schedule(&id, self.duration, self.deposit_cents, policy)?;

        tracing::info!(
            contract_id = %id,
            days = self.duration.days(),
            deposit_cents = self.deposit_cents,
            "created contract"
        );

        Ok(Contract {
            id,
            habit_title: self.habit_title.trim().to_string(),
            duration: self.duration,
            deposit_cents: self.deposit_cents,
            start: self.start,
            created_on: today,
            reward_schedule,
            payment_status: PaymentStatus::Pending,
        })
    }
}
