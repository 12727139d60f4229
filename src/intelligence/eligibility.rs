use crate::models::{
    format_timestamp, Criterion, CriterionResult, EligibilityRequirements, EligibilityVerdict,
    WalletSignals,
};

/// Evaluate the five airdrop criteria against `requirements`.
///
/// Pure: the same inputs always produce the same verdict. Criteria whose
/// requirement is switched off are still evaluated as equality checks, so the
/// per-criterion flags and the overall verdict never disagree.
pub fn evaluate(
    signals: &WalletSignals,
    requirements: &EligibilityRequirements,
    token_symbol: &str,
) -> EligibilityVerdict {
    let cutoff = requirements.early_adopter_cutoff;
    let early = signals.is_early_adopter(cutoff);

    let criteria = vec![
        CriterionResult::at_least(
            Criterion::ReferenceTransactions,
            requirements.min_reference_transactions,
            signals.reference_transaction_count,
        ),
        CriterionResult::matches(
            Criterion::NftOwnership,
            requirements.require_nft,
            signals.has_required_nft,
        ),
        CriterionResult::amount(
            Criterion::TokenBalance,
            requirements.min_balance,
            signals.balance,
            token_symbol,
        ),
        CriterionResult::at_least(
            Criterion::TargetTransactions,
            requirements.min_target_transactions,
            signals.transaction_count,
        ),
        CriterionResult::matches(Criterion::EarlyAdopter, requirements.require_early_adopter, early)
            .with_date(format_timestamp(signals.first_activity_timestamp)),
    ];

    EligibilityVerdict::from_criteria(criteria, |result| failure_reason(result, requirements))
}

fn failure_reason(result: &CriterionResult, requirements: &EligibilityRequirements) -> String {
    match result.criterion() {
        Criterion::ReferenceTransactions => "not enough reference-chain transactions".into(),
        Criterion::NftOwnership if requirements.require_nft => "missing required NFT".into(),
        Criterion::NftOwnership => "holds an NFT that must not be held".into(),
        Criterion::TokenBalance => "insufficient token balance".into(),
        Criterion::TargetTransactions => "not enough target-chain transactions".into(),
        Criterion::EarlyAdopter => {
            let date = format_timestamp(requirements.early_adopter_cutoff);
            if requirements.require_early_adopter {
                format!("no activity before {date}")
            } else {
                format!("activity before {date}")
            }
        }
    }
}
