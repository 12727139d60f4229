use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const SUCCESS_MESSAGE: &str =
    "Congratulations! Your wallet meets all criteria for the airdrop eligibility check.";

// ---------------------------------------------------------------------------
// EligibilityRequirements
// ---------------------------------------------------------------------------

/// Thresholds a wallet must meet. Operators may replace the whole set at
/// runtime; each evaluation works on its own snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityRequirements {
    pub min_reference_transactions: u64,
    pub min_target_transactions: u64,
    pub min_balance: Decimal,
    pub require_nft: bool,
    pub require_early_adopter: bool,
    /// Unix seconds. Activity strictly before this counts as early.
    pub early_adopter_cutoff: i64,
}

impl Default for EligibilityRequirements {
    fn default() -> Self {
        Self {
            min_reference_transactions: 10,
            min_target_transactions: 200,
            min_balance: Decimal::new(100, 1), // 10.0
            require_nft: true,
            require_early_adopter: true,
            early_adopter_cutoff: 1_708_905_600,
        }
    }
}

// ---------------------------------------------------------------------------
// Criterion
// ---------------------------------------------------------------------------

/// The five fixed eligibility rules, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    ReferenceTransactions,
    NftOwnership,
    TokenBalance,
    TargetTransactions,
    EarlyAdopter,
}

impl Criterion {
    pub const ALL: [Criterion; 5] = [
        Criterion::ReferenceTransactions,
        Criterion::NftOwnership,
        Criterion::TokenBalance,
        Criterion::TargetTransactions,
        Criterion::EarlyAdopter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Criterion::ReferenceTransactions => "reference_transactions",
            Criterion::NftOwnership => "nft_ownership",
            Criterion::TokenBalance => "token_balance",
            Criterion::TargetTransactions => "target_transactions",
            Criterion::EarlyAdopter => "early_adopter",
        }
    }

    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            Criterion::ReferenceTransactions => "reference-chain transactions",
            Criterion::NftOwnership => "NFT ownership",
            Criterion::TokenBalance => "token balance",
            Criterion::TargetTransactions => "target-chain transactions",
            Criterion::EarlyAdopter => "early adopter",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CriterionResult
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CriterionValue {
    Count(u64),
    Flag(bool),
    Amount(String),
}

/// Outcome of one criterion. `satisfied` is only ever computed by the
/// constructors from `required` and `actual`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CriterionResult {
    criterion: Criterion,
    name: &'static str,
    required: CriterionValue,
    actual: CriterionValue,
    satisfied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
}

impl CriterionResult {
    /// Numeric criterion: satisfied when `actual >= required`.
    pub fn at_least(criterion: Criterion, required: u64, actual: u64) -> Self {
        Self::build(
            criterion,
            CriterionValue::Count(required),
            CriterionValue::Count(actual),
            actual >= required,
        )
    }

    /// Boolean criterion: satisfied when `actual == required`.
    pub fn matches(criterion: Criterion, required: bool, actual: bool) -> Self {
        Self::build(
            criterion,
            CriterionValue::Flag(required),
            CriterionValue::Flag(actual),
            actual == required,
        )
    }

    /// Token amount criterion: satisfied when `actual >= required`, both
    /// rendered as `"<amount> <symbol>"`.
    pub fn amount(criterion: Criterion, required: Decimal, actual: Decimal, symbol: &str) -> Self {
        Self::build(
            criterion,
            CriterionValue::Amount(format!("{required} {symbol}")),
            CriterionValue::Amount(format!("{actual} {symbol}")),
            actual >= required,
        )
    }

    /// Attach a display date. Does not affect `satisfied`.
    pub fn with_date(mut self, date: String) -> Self {
        self.date = Some(date);
        self
    }

    fn build(
        criterion: Criterion,
        required: CriterionValue,
        actual: CriterionValue,
        satisfied: bool,
    ) -> Self {
        Self {
            criterion,
            name: criterion.label(),
            required,
            actual,
            satisfied,
            date: None,
        }
    }

    pub fn criterion(&self) -> Criterion {
        self.criterion
    }

    pub fn required(&self) -> &CriterionValue {
        &self.required
    }

    pub fn actual(&self) -> &CriterionValue {
        &self.actual
    }

    pub fn satisfied(&self) -> bool {
        self.satisfied
    }
}

// ---------------------------------------------------------------------------
// EligibilityVerdict
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EligibilityVerdict {
    criteria: Vec<CriterionResult>,
    #[serde(rename = "is_eligible")]
    overall_eligible: bool,
    #[serde(rename = "message")]
    explanation: String,
}

impl EligibilityVerdict {
    /// Derive the aggregate verdict. `failure_reason` renders the phrase used
    /// for each unsatisfied criterion in the explanation.
    pub fn from_criteria<F>(criteria: Vec<CriterionResult>, failure_reason: F) -> Self
    where
        F: Fn(&CriterionResult) -> String,
    {
        let overall_eligible = criteria.iter().all(CriterionResult::satisfied);

        let explanation = if overall_eligible {
            SUCCESS_MESSAGE.to_string()
        } else {
            let failed: Vec<String> = criteria
                .iter()
                .filter(|c| !c.satisfied())
                .map(&failure_reason)
                .collect();
            format!("Your wallet is not eligible due to: {}.", failed.join(", "))
        };

        Self {
            criteria,
            overall_eligible,
            explanation,
        }
    }

    pub fn criteria(&self) -> &[CriterionResult] {
        &self.criteria
    }

    pub fn criterion(&self, criterion: Criterion) -> Option<&CriterionResult> {
        self.criteria.iter().find(|c| c.criterion() == criterion)
    }

    pub fn overall_eligible(&self) -> bool {
        self.overall_eligible
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    pub fn failing(&self) -> impl Iterator<Item = &CriterionResult> {
        self.criteria.iter().filter(|c| !c.satisfied())
    }
}
