use crate::chain::{ChainId, ChainList};

/// Error codes of the EIP-1193 provider errors and the JSON-RPC errors
/// wallets forward as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
pub enum ProviderRpcErrorCode {
    #[error("The user rejected the request.")]
    UserRejectedRequest,
    #[error("The requested method and/or account has not been authorized by the user.")]
    Unauthorized,
    #[error("The provider does not support the requested method.")]
    UnsupportedMethod,
    /// The provider is disconnected from all chains.
    #[error("The provider is disconnected.")]
    Disconnected,
    #[error("The provider is not connected to the requested chain.")]
    ChainDisconnected,
    #[error("Invalid method parameters.")]
    InvalidParams,
    #[error("An error occured during the execution of this request.")]
    InternalError,
    #[error("Unknown error code `{0}'")]
    Unknown(i64),
}

impl ProviderRpcErrorCode {
    pub fn from_code(code: i64) -> Self {
        match code {
            4001 => Self::UserRejectedRequest,
            4100 => Self::Unauthorized,
            4200 => Self::UnsupportedMethod,
            4900 => Self::Disconnected,
            4901 => Self::ChainDisconnected,
            -32602 => Self::InvalidParams,
            -32603 => Self::InternalError,
            unknown => Self::Unknown(unknown),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::UserRejectedRequest => 4001,
            Self::Unauthorized => 4100,
            Self::UnsupportedMethod => 4200,
            Self::Disconnected => 4900,
            Self::ChainDisconnected => 4901,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
            Self::Unknown(code) => code,
        }
    }
}

/// Error object a provider rejects its `request` promise with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, serde::Deserialize)]
#[error("{code} {message}")]
pub struct ProviderRpcError {
    pub code: ProviderRpcErrorCode,
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl ProviderRpcError {
    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self {
            code: ProviderRpcErrorCode::InternalError,
            message: message.into(),
            data: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Storage access failed: {0}")]
pub struct StorageError(pub String);

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConnectorError {
    #[error("Unsupported wallet `{0}'")]
    UnsupportedWallet(String),
    #[error("Unsupported chain id: {chain_id}. Supported chain ids are: {}", ChainList(.supported))]
    UnsupportedChain {
        chain_id: ChainId,
        supported: Vec<ChainId>,
    },
    /// Observe mode has to be set up (an address stored) before activating.
    #[error("No address found in local storage for read-only mode")]
    MissingAddress,
    #[error("{0}")]
    Environment(String),
    #[error(transparent)]
    ProviderRequest(#[from] ProviderRpcError),
    #[error("Couldn't load the wallet SDK: {0}")]
    ModuleLoad(String),
    #[error("The connector has not been activated")]
    NotActivated,
    #[error("No network configuration for chain id {0}")]
    UnknownNetwork(ChainId),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Unexpected provider response: {0}")]
    InvalidResponse(String),
}

impl<'de> serde::Deserialize<'de> for ProviderRpcErrorCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct Visitor;
        impl serde::de::Visitor<'_> for Visitor {
            type Value = ProviderRpcErrorCode;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(formatter, "Expecting an integer ProviderRpcErrorCode")
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(ProviderRpcErrorCode::from_code(v))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                let v = i64::try_from(v).map_err(|_| {
                    E::invalid_value(serde::de::Unexpected::Unsigned(v), &self)
                })?;
                self.visit_i64(v)
            }

            fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                if v.fract() != 0.0 {
                    return Err(E::invalid_value(serde::de::Unexpected::Float(v), &self));
                }
                self.visit_i64(v as i64)
            }
        }

        deserializer.deserialize_i64(Visitor)
    }
}
