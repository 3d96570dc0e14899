use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of the execution endpoint a run talks to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkIdentity {
    pub name: String,
    pub endpoint_url: String,
    pub chain_id: u64,
}

impl fmt::Display for NetworkIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (chain id {}) at {}",
            self.name, self.chain_id, self.endpoint_url
        )
    }
}

/// Account exposed by the execution endpoint, balance in wei
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub address: String,
    pub balance_wei: u128,
}

impl AccountBalance {
    /// Balance in ether with full 18-decimal precision, trailing zeros trimmed
    pub fn balance_ether(&self) -> String {
        const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

        let whole = self.balance_wei / WEI_PER_ETHER;
        let fraction = self.balance_wei % WEI_PER_ETHER;
        if fraction == 0 {
            return format!("{whole}.0");
        }
        let fraction = format!("{fraction:018}");
        format!("{whole}.{}", fraction.trim_end_matches('0'))
    }
}
