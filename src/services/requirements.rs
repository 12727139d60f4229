use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::EligibilityRequirements;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequirementsError {
    #[error("min_balance must not be negative, got {0}")]
    NegativeBalance(Decimal),

    #[error("early_adopter_cutoff must be a positive Unix timestamp, got {0}")]
    InvalidCutoff(i64),
}

/// Shared, replaceable requirement set. Readers get an owned snapshot so an
/// in-flight evaluation never observes a concurrent update.
#[derive(Debug, Clone)]
pub struct RequirementsStore {
    inner: Arc<RwLock<EligibilityRequirements>>,
}

impl RequirementsStore {
    pub fn new(initial: EligibilityRequirements) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    pub async fn snapshot(&self) -> EligibilityRequirements {
        self.inner.read().await.clone()
    }

    /// Validate and swap in a new requirement set.
    pub async fn replace(
        &self,
        next: EligibilityRequirements,
    ) -> Result<EligibilityRequirements, RequirementsError> {
        validate(&next)?;
        let mut guard = self.inner.write().await;
        *guard = next.clone();
        tracing::info!(requirements = ?next, "Eligibility requirements updated");
        Ok(next)
    }
}

pub fn validate(requirements: &EligibilityRequirements) -> Result<(), RequirementsError> {
    if requirements.min_balance < Decimal::ZERO {
        return Err(RequirementsError::NegativeBalance(requirements.min_balance));
    }
    if requirements.early_adopter_cutoff <= 0 {
        return Err(RequirementsError::InvalidCutoff(requirements.early_adopter_cutoff));
    }
    Ok(())
}
