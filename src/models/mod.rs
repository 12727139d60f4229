pub mod address;
pub mod eligibility;
pub mod report;
pub mod signals;

pub use address::{AddressError, WalletAddress};
pub use eligibility::{
    Criterion, CriterionResult, CriterionValue, EligibilityRequirements, EligibilityVerdict,
};
pub use report::WalletReport;
pub use signals::{format_timestamp, SignalField, TimestampSource, WalletSignals};
