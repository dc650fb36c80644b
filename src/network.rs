use crate::chain::ChainId;
use std::collections::BTreeMap;

/// RPC endpoints of a network.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    pub name: String,
    /// endpoint reserved to the application, preferred when present
    #[serde(default, rename = "privateJsonRPCUrl")]
    pub private_json_rpc_url: Option<String>,
    #[serde(rename = "publicJsonRPCUrl")]
    pub public_json_rpc_url: Vec<String>,
}

impl NetworkConfig {
    /// the private endpoint if configured, the first public one otherwise
    pub fn rpc_url(&self) -> Option<&str> {
        self.private_json_rpc_url
            .as_deref()
            .or_else(|| self.public_json_rpc_url.first().map(String::as_str))
    }
}

/// Source of the per chain network configuration.
pub trait NetworkRegistry {
    fn network(&self, chain_id: ChainId) -> Option<NetworkConfig>;
}

#[derive(Debug, thiserror::Error)]
pub enum NetworksError {
    #[error("Invalid networks configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Network {0} has no public RPC url")]
    NoPublicRpcUrl(ChainId),
}

/// Table of network configurations keyed by chain id.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Networks(BTreeMap<ChainId, NetworkConfig>);

impl Networks {
    pub fn empty() -> Self {
        Self::default()
    }

    /// parse a JSON object mapping chain ids to [`NetworkConfig`]
    ///
    /// ```
    /// # use evm_wallet_connector::{ChainId, network::Networks};
    /// let networks = Networks::from_json(r#"{
    ///     "137": { "name": "Polygon", "publicJsonRPCUrl": ["https://polygon-rpc.com"] }
    /// }"#).unwrap();
    /// assert!(networks.get(ChainId::POLYGON).is_some());
    /// ```
    pub fn from_json(json: &str) -> Result<Self, NetworksError> {
        let networks: Self = serde_json::from_str(json)?;
        for (chain_id, config) in &networks.0 {
            if config.public_json_rpc_url.is_empty() {
                return Err(NetworksError::NoPublicRpcUrl(*chain_id));
            }
        }
        Ok(networks)
    }

    pub fn insert(&mut self, chain_id: ChainId, config: NetworkConfig) -> Option<NetworkConfig> {
        self.0.insert(chain_id, config)
    }

    pub fn get(&self, chain_id: ChainId) -> Option<&NetworkConfig> {
        self.0.get(&chain_id)
    }

    pub fn chain_ids(&self) -> impl Iterator<Item = ChainId> + '_ {
        self.0.keys().copied()
    }

    /// networks known out of the box, public endpoints only
    pub fn builtin() -> Self {
        let table: [(ChainId, &str, &str); 9] = [
            (ChainId::MAINNET, "Ethereum", "https://cloudflare-eth.com"),
            (ChainId::OPTIMISM, "Optimism", "https://mainnet.optimism.io"),
            (ChainId::BSC, "BNB Chain", "https://bsc-dataseed.binance.org"),
            (ChainId::POLYGON, "Polygon", "https://polygon-rpc.com"),
            (ChainId::FANTOM, "Fantom", "https://rpc.ftm.tools"),
            (ChainId::ZKSYNC, "zkSync Era", "https://mainnet.era.zksync.io"),
            (ChainId::BASE, "Base", "https://mainnet.base.org"),
            (ChainId::ARBITRUM_ONE, "Arbitrum One", "https://arb1.arbitrum.io/rpc"),
            (
                ChainId::AVALANCHE,
                "Avalanche",
                "https://api.avax.network/ext/bc/C/rpc",
            ),
        ];

        Self(
            table
                .into_iter()
                .map(|(chain_id, name, url)| {
                    (
                        chain_id,
                        NetworkConfig {
                            name: name.to_owned(),
                            private_json_rpc_url: None,
                            public_json_rpc_url: vec![url.to_owned()],
                        },
                    )
                })
                .collect(),
        )
    }
}

impl NetworkRegistry for Networks {
    fn network(&self, chain_id: ChainId) -> Option<NetworkConfig> {
        self.get(chain_id).cloned()
    }
}
