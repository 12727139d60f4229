use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use rust_decimal::Decimal;

use crate::ingestion::{CollectorConfig, FirstActivityFallback};
use crate::models::{EligibilityRequirements, WalletAddress};

const DEFAULT_TARGET_RPC_URL: &str = "https://testnet-rpc.monad.xyz";
const DEFAULT_NFT_CONTRACT: &str = "0x922dA3512e2BEBBe32bccE59adf7E6759fB8CEA2";

/// Largest scale `rust_decimal` can represent.
const MAX_UNIT_DECIMALS: u32 = 28;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub log_json: bool,
    pub api_token: Option<String>,

    // Upstream JSON-RPC
    pub target_rpc_url: String,
    pub reference_rpc_url: Option<String>,
    pub rpc_timeout: Duration,

    // Chain specifics
    pub nft_contract: WalletAddress,
    pub token_symbol: String,
    pub unit_decimals: u32,
    pub display_precision: u32,

    // Log scan
    pub log_window_blocks: u64,
    pub historical_anchor_block: u64,
    pub historical_span_blocks: u64,
    pub max_block_lookups: usize,

    // Fallback policy
    pub tx_count_ceiling: u64,
    pub first_activity_fallback: FirstActivityFallback,

    /// Initial requirement set; replaceable at runtime through the API.
    pub requirements: EligibilityRequirements,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let nft_contract_raw = env_string("NFT_CONTRACT", DEFAULT_NFT_CONTRACT);
        let nft_contract = WalletAddress::parse(&nft_contract_raw)
            .with_context(|| format!("NFT_CONTRACT {nft_contract_raw:?} is not a valid address"))?;

        let unit_decimals: u32 = env_parse("UNIT_DECIMALS", "18")?;
        if unit_decimals > MAX_UNIT_DECIMALS {
            anyhow::bail!("UNIT_DECIMALS must be at most {MAX_UNIT_DECIMALS}, got {unit_decimals}");
        }

        let requirements = EligibilityRequirements {
            min_reference_transactions: env_parse("MIN_REFERENCE_TXS", "10")?,
            min_target_transactions: env_parse("MIN_TARGET_TXS", "200")?,
            min_balance: env_parse::<Decimal>("MIN_TOKEN_BALANCE", "10.0")?,
            require_nft: env_parse("REQUIRE_NFT", "true")?,
            require_early_adopter: env_parse("REQUIRE_EARLY_ADOPTER", "true")?,
            early_adopter_cutoff: env_parse("EARLY_ADOPTER_CUTOFF", "1708905600")?,
        };
        crate::services::requirements::validate(&requirements)?;

        Ok(Self {
            host: env_string("HOST", "0.0.0.0"),
            port: env_parse("PORT", "8080")?,
            log_json: env_string("LOG_FORMAT", "text").eq_ignore_ascii_case("json"),
            api_token: env::var("API_TOKEN").ok().filter(|s| !s.is_empty()),

            target_rpc_url: env_string("TARGET_RPC_URL", DEFAULT_TARGET_RPC_URL),
            reference_rpc_url: env::var("REFERENCE_RPC_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            rpc_timeout: Duration::from_millis(env_parse("RPC_TIMEOUT_MS", "10000")?),

            nft_contract,
            token_symbol: env_string("TOKEN_SYMBOL", "MON"),
            unit_decimals,
            display_precision: env_parse("DISPLAY_PRECISION", "3")?,

            log_window_blocks: env_parse("LOG_WINDOW_BLOCKS", "100")?,
            historical_anchor_block: env_parse("HISTORICAL_ANCHOR_BLOCK", "7340032")?,
            historical_span_blocks: env_parse("HISTORICAL_SPAN_BLOCKS", "16")?,
            max_block_lookups: env_parse("MAX_BLOCK_LOOKUPS", "20")?,

            tx_count_ceiling: env_parse("TX_COUNT_CEILING", "10000")?,
            first_activity_fallback: env_parse("FIRST_ACTIVITY_FALLBACK", "conservative")?,

            requirements,
        })
    }

    pub fn collector_config(&self) -> CollectorConfig {
        CollectorConfig {
            nft_contract: self.nft_contract.clone(),
            unit_decimals: self.unit_decimals,
            display_precision: self.display_precision,
            log_window_blocks: self.log_window_blocks,
            historical_anchor_block: self.historical_anchor_block,
            historical_span_blocks: self.historical_span_blocks,
            max_block_lookups: self.max_block_lookups,
            tx_count_ceiling: self.tx_count_ceiling,
            first_activity_fallback: self.first_activity_fallback,
        }
    }

    /// Host of an RPC URL, for log lines that must not leak API keys
    /// embedded in the userinfo, path or query.
    pub fn redacted_host(url: &str) -> &str {
        let rest = url.split_once("://").map(|(_, r)| r).unwrap_or(url);
        let authority = rest.split(['/', '?', '#']).next().unwrap_or(rest);
        authority
            .rsplit_once('@')
            .map(|(_, host)| host)
            .unwrap_or(authority)
    }
}

fn env_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.into())
}

fn env_parse<T>(key: &str, default: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = env_string(key, default);
    raw.trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("{key}={raw:?} is invalid: {e}"))
}
