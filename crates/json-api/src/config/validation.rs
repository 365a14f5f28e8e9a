//! Validation Config

use aurum::attributes::WeightPolicy;
use clap::Args;

/// How `gross == net + extra` is checked on inventory writes.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum WeightPolicyArg {
    /// Log mismatches and accept the item.
    Advisory,

    /// Reject mismatching items.
    Enforce,
}

impl From<WeightPolicyArg> for WeightPolicy {
    fn from(policy: WeightPolicyArg) -> Self {
        match policy {
            WeightPolicyArg::Advisory => Self::Advisory,
            WeightPolicyArg::Enforce => Self::Enforce,
        }
    }
}

/// Inventory validation settings.
#[derive(Debug, Args)]
pub struct ValidationConfig {
    /// Weight consistency policy (advisory, enforce)
    #[arg(long, env = "WEIGHT_POLICY", value_enum, default_value_t = WeightPolicyArg::Advisory)]
    pub weight_policy: WeightPolicyArg,
}
