use std::time::Instant;

use metrics::{counter, histogram};

use crate::ingestion::SignalCollector;
use crate::intelligence::evaluate;
use crate::models::{format_timestamp, EligibilityVerdict, WalletAddress, WalletReport, WalletSignals};
use crate::services::RequirementsStore;

/// Collects signals, evaluates them and shapes the response for one wallet.
#[derive(Clone)]
pub struct ReportService {
    collector: SignalCollector,
    requirements: RequirementsStore,
    token_symbol: String,
}

impl ReportService {
    pub fn new(
        collector: SignalCollector,
        requirements: RequirementsStore,
        token_symbol: impl Into<String>,
    ) -> Self {
        Self {
            collector,
            requirements,
            token_symbol: token_symbol.into(),
        }
    }

    pub fn collector(&self) -> &SignalCollector {
        &self.collector
    }

    pub fn requirements(&self) -> &RequirementsStore {
        &self.requirements
    }

    pub async fn build_report(&self, address: &WalletAddress) -> WalletReport {
        let started = Instant::now();

        let requirements = self.requirements.snapshot().await;
        let signals = self
            .collector
            .collect(address, requirements.early_adopter_cutoff)
            .await;
        let verdict = evaluate(&signals, &requirements, &self.token_symbol);

        let eligible = verdict.overall_eligible();
        let report = assemble(&signals, verdict, requirements.early_adopter_cutoff, &self.token_symbol);

        let elapsed = started.elapsed().as_secs_f64();
        counter!("wallet_reports_total", "eligible" => eligible.to_string()).increment(1);
        histogram!("report_latency_seconds").record(elapsed);

        tracing::info!(
            address = %address.short(),
            eligible,
            degraded = signals.degraded.len(),
            elapsed_ms = (elapsed * 1000.0) as u64,
            "Wallet report built"
        );

        report
    }
}

/// Compose signals and verdict into the response body.
pub fn assemble(
    signals: &WalletSignals,
    verdict: EligibilityVerdict,
    cutoff: i64,
    token_symbol: &str,
) -> WalletReport {
    WalletReport {
        address: signals.address.clone(),
        checksum_address: signals.address.checksummed(),
        balance: format!("{} {}", signals.balance, token_symbol),
        balance_wei: signals.balance_wei.to_string(),
        total_transactions: signals.transaction_count,
        reference_transactions: signals.reference_transaction_count,
        unique_contracts: signals.unique_contracts,
        first_activity: format_timestamp(signals.first_activity_timestamp),
        first_activity_timestamp: signals.first_activity_timestamp,
        first_activity_source: signals.first_activity_source,
        last_activity: format_timestamp(signals.last_activity_timestamp),
        last_activity_timestamp: signals.last_activity_timestamp,
        last_activity_source: signals.last_activity_source,
        has_nft: signals.has_required_nft,
        is_early_adopter: signals.is_early_adopter(cutoff),
        degraded_signals: signals.degraded.clone(),
        airdrop_eligibility: verdict,
    }
}
