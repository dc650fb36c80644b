use core::{fmt, str::FromStr};
use serde_json::Value;

/// Numeric identifier of an EVM network (EIP-155).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct ChainId(u64);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid chain id `{0}'")]
pub struct InvalidChainId(pub String);

impl ChainId {
    pub const MAINNET: Self = Self(1);
    pub const OPTIMISM: Self = Self(10);
    pub const BSC: Self = Self(56);
    pub const POLYGON: Self = Self(137);
    pub const FANTOM: Self = Self(250);
    pub const ZKSYNC: Self = Self(324);
    pub const CORE: Self = Self(1116);
    pub const BASE: Self = Self(8453);
    pub const ARBITRUM_ONE: Self = Self(42161);
    pub const AVALANCHE: Self = Self(43114);
    pub const LINEA: Self = Self(59144);
    pub const ZKLINK_NOVA: Self = Self(810180);

    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// `0x` prefixed hexadecimal form, as used by `eth_chainId` and
    /// `chainChanged` payloads.
    pub fn to_hex(self) -> String {
        format!("{:#x}", self.0)
    }

    /// decode the chain id carried by a provider event
    ///
    /// Wallets are inconsistent here: some send a JSON number, others the
    /// hexadecimal string (`"0x89"`) and a few the decimal string (`"137"`).
    pub fn from_json(value: &Value) -> Result<Self, InvalidChainId> {
        match value {
            Value::Number(number) => number
                .as_u64()
                .map(Self)
                .ok_or_else(|| InvalidChainId(number.to_string())),
            Value::String(string) => string.parse(),
            other => Err(InvalidChainId(other.to_string())),
        }
    }
}

impl Default for ChainId {
    fn default() -> Self {
        Self::MAINNET
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(chain_id: ChainId) -> Self {
        chain_id.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChainId {
    type Err = InvalidChainId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (digits, radix) = match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            Some(hex) => (hex, 16),
            None => (trimmed, 10),
        };

        // `from_str_radix` tolerates a leading `+`
        if digits.starts_with('+') {
            return Err(InvalidChainId(s.to_owned()));
        }

        u64::from_str_radix(digits, radix)
            .map(Self)
            .map_err(|_| InvalidChainId(s.to_owned()))
    }
}

/// format a list of chain ids as `[1, 137]` for error messages
pub(crate) struct ChainList<'a>(pub &'a [ChainId]);

impl fmt::Display for ChainList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (index, chain_id) in self.0.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{chain_id}")?;
        }
        write!(f, "]")
    }
}
