use crate::{
    WalletKind,
    chain::ChainId,
    connector::{
        Connector, ConnectorUpdate, EventEmitter, ProviderEvent, ProviderHandle, validate_chain,
    },
    error::ConnectorError,
    sdk::SdkLoader,
};
use async_trait::async_trait;
use serde_json::Value;
use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

/// Chains the UXUY Telegram wallet can be connected to.
pub const UXUY_SUPPORTED_CHAIN_IDS: [ChainId; 12] = [
    ChainId::MAINNET,
    ChainId::BSC,
    ChainId::BASE,
    ChainId::ARBITRUM_ONE,
    ChainId::POLYGON,
    ChainId::FANTOM,
    ChainId::OPTIMISM,
    ChainId::AVALANCHE,
    ChainId::ZKSYNC,
    ChainId::LINEA,
    ChainId::CORE,
    ChainId::ZKLINK_NOVA,
];

/// Network the embedded wallets are started on.
///
/// Polygon goes by its legacy `"matic"` name, every other network by its
/// chain id.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum NetworkHost {
    Named(String),
    Chain(ChainId),
}

impl NetworkHost {
    pub fn for_chain(chain_id: ChainId) -> Self {
        if chain_id == ChainId::POLYGON {
            Self::Named("matic".to_owned())
        } else {
            Self::Chain(chain_id)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SdkNetwork {
    pub host: NetworkHost,
}

/// Initialisation options shared by the embedded wallet SDKs (Torus, UXUY).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkInitOptions {
    pub network: SdkNetwork,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_torus_button: Option<bool>,
    #[serde(default)]
    pub enable_logging: bool,
    #[serde(default)]
    pub enabled_verifiers: bool,
}

impl SdkInitOptions {
    /// options for `chain_id` with logging and verifiers disabled
    pub fn quiet(chain_id: ChainId) -> Self {
        Self {
            network: SdkNetwork {
                host: NetworkHost::for_chain(chain_id),
            },
            show_torus_button: None,
            enable_logging: false,
            enabled_verifiers: false,
        }
    }
}

/// Connector bridging the UXUY Telegram mini-app wallet SDK.
///
/// The SDK is loaded on the first activation and kept until [`close`] so
/// that a later activation reuses it.
///
/// [`close`]: Connector::close
pub struct UxuyConnector {
    chain_id: ChainId,
    constructor_options: Value,
    /// kept for the SDK's `init`, the connector does not apply them
    init_options: SdkInitOptions,
    loader: Rc<dyn SdkLoader>,
    ethereum: RefCell<Option<ProviderHandle>>,
    /// bumped by every `close`, activations started before it give up
    session: Cell<u64>,
    events: EventEmitter,
}

impl UxuyConnector {
    pub fn new(
        chain_id: ChainId,
        constructor_options: Value,
        init_options: SdkInitOptions,
        loader: Rc<dyn SdkLoader>,
    ) -> Self {
        Self {
            chain_id,
            constructor_options,
            init_options,
            loader,
            ethereum: RefCell::new(None),
            session: Cell::new(0),
            events: EventEmitter::new(),
        }
    }

    pub fn init_options(&self) -> &SdkInitOptions {
        &self.init_options
    }

    pub fn constructor_options(&self) -> &Value {
        &self.constructor_options
    }

    fn loaded(&self) -> Result<ProviderHandle, ConnectorError> {
        self.ethereum
            .borrow()
            .clone()
            .ok_or(ConnectorError::NotActivated)
    }

    /// fails once the connector was closed after `session` started
    fn still_open(&self, session: u64) -> Result<(), ConnectorError> {
        if self.session.get() == session {
            Ok(())
        } else {
            tracing::debug!("activation interrupted by close");
            Err(ConnectorError::NotActivated)
        }
    }

    async fn ensure_loaded(&self, session: u64) -> Result<ProviderHandle, ConnectorError> {
        if let Some(ethereum) = self.ethereum.borrow().clone() {
            return Ok(ethereum);
        }

        let ethereum = self.loader.load(&self.constructor_options).await?;
        self.still_open(session)?;
        *self.ethereum.borrow_mut() = Some(Rc::clone(&ethereum));
        Ok(ethereum)
    }

    fn register_listeners(&self, ethereum: &ProviderHandle) {
        ethereum.remove_all_listeners();

        ethereum.on(
            ProviderEvent::AccountsChanged,
            Box::new(|accounts| {
                let account = first_account(&accounts);
                tracing::debug!(account = ?account, "active account changed");
            }),
        );

        let events = self.events.clone();
        let weak = Rc::downgrade(ethereum);
        ethereum.on(
            ProviderEvent::ChainChanged,
            Box::new(move |payload| match ChainId::from_json(&payload) {
                Ok(chain_id) => {
                    tracing::info!(%chain_id, "network changed");
                    events.emit_update(ConnectorUpdate {
                        chain_id: Some(chain_id),
                        account: None,
                        provider: weak.upgrade(),
                    });
                }
                Err(error) => tracing::warn!(%error, "ignoring chainChanged notification"),
            }),
        );
    }
}

fn first_account(accounts: &Value) -> Option<String> {
    accounts
        .as_array()
        .and_then(|accounts| accounts.first())
        .and_then(Value::as_str)
        .map(str::to_owned)
}

async fn accounts(ethereum: &ProviderHandle) -> Result<Option<String>, ConnectorError> {
    let accounts = ethereum.request("eth_accounts", None).await?;
    if !accounts.is_array() {
        return Err(ConnectorError::InvalidResponse(format!(
            "eth_accounts returned {accounts}"
        )));
    }
    Ok(first_account(&accounts))
}

#[async_trait(?Send)]
impl Connector for UxuyConnector {
    fn kind(&self) -> WalletKind {
        WalletKind::Uxuy
    }

    fn supported_chain_ids(&self) -> Option<&[ChainId]> {
        Some(&UXUY_SUPPORTED_CHAIN_IDS)
    }

    async fn activate(&self) -> Result<ConnectorUpdate, ConnectorError> {
        validate_chain(self.chain_id, &UXUY_SUPPORTED_CHAIN_IDS)?;

        let session = self.session.get();
        let ethereum = self.ensure_loaded(session).await?;

        let mut account = accounts(&ethereum).await?;
        self.still_open(session)?;
        if account.is_none() {
            tracing::debug!("no connected account, prompting the user");
            ethereum.request("eth_requestAccounts", None).await?;
            self.still_open(session)?;
            account = accounts(&ethereum).await?;
            self.still_open(session)?;
        }

        self.register_listeners(&ethereum);

        tracing::info!(chain_id = %self.chain_id, account = ?account, "UXUY wallet activated");
        Ok(ConnectorUpdate {
            chain_id: None,
            account,
            provider: Some(ethereum),
        })
    }

    async fn provider(&self) -> Result<ProviderHandle, ConnectorError> {
        self.loaded()
    }

    async fn chain_id(&self) -> Result<ChainId, ConnectorError> {
        Ok(self.chain_id)
    }

    async fn account(&self) -> Result<Option<String>, ConnectorError> {
        let ethereum = self.loaded()?;
        accounts(&ethereum).await
    }

    fn deactivate(&self) {}

    async fn close(&self) {
        self.session.set(self.session.get().wrapping_add(1));
        let ethereum = self.ethereum.borrow_mut().take();
        if let Some(ethereum) = ethereum {
            ethereum.remove_all_listeners();
        }
        tracing::debug!("UXUY wallet closed");
        self.events.emit_deactivate();
    }

    fn events(&self) -> &EventEmitter {
        &self.events
    }
}
