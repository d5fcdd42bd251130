use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reserved wallet holding platform fee revenue.
pub const PLATFORM_WALLET_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0002);

/// Reserved wallet tracking gross inbound funds from the PSP.
pub const EXTERNAL_WALLET_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0001);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletType {
    Holding,
    Settlement,
    Revenue,
}

impl WalletType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Holding => "holding",
            Self::Settlement => "settlement",
            Self::Revenue => "revenue",
        }
    }
}

impl std::str::FromStr for WalletType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "holding" => Ok(Self::Holding),
            "settlement" => Ok(Self::Settlement),
            "revenue" => Ok(Self::Revenue),
            other => Err(format!("unknown wallet type: {other}")),
        }
    }
}

/// A user or system wallet. Balances are integer minor units and never negative at rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub id: Uuid,
    pub user_id: Uuid,
    pub balance: i64,
    pub locked_balance: i64,
    pub currency: String,
    pub wallet_type: WalletType,
}
