use crate::{
    chain::ChainId,
    connector::Connector,
    error::ConnectorError,
    network::{NetworkRegistry, Networks},
    read_only::ReadOnlyConnector,
    sdk::{SdkLoader, TG_SDK_MODULE, TgSdkLoader},
    storage::{KeyValueStore, LocalStorage},
    uxuy::{SdkInitOptions, UxuyConnector},
};
use core::{fmt, str::FromStr};
use std::rc::Rc;
use wasm_bindgen::JsValue;

/// The wallet integrations a user can pick from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletKind {
    /// browser extension injecting `window.ethereum`
    Injected,
    WalletConnect,
    /// Coinbase wallet mobile bridge
    WalletLink,
    Torus,
    /// UXUY Telegram mini-app wallet
    Uxuy,
    Frame,
    /// Gnosis Safe app
    Gnosis,
    /// Recognised but without a connector: selecting it fails.
    Ledger,
    ReadOnlyMode,
}

impl WalletKind {
    pub const ALL: [Self; 9] = [
        Self::Injected,
        Self::WalletConnect,
        Self::WalletLink,
        Self::Torus,
        Self::Uxuy,
        Self::Frame,
        Self::Gnosis,
        Self::Ledger,
        Self::ReadOnlyMode,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Injected => "injected",
            Self::WalletConnect => "wallet_connect",
            Self::WalletLink => "wallet_link",
            Self::Torus => "torus",
            Self::Uxuy => "uxuy",
            Self::Frame => "frame",
            Self::Gnosis => "gnosis",
            Self::Ledger => "ledger",
            Self::ReadOnlyMode => "read_only_mode",
        }
    }
}

impl fmt::Display for WalletKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WalletKind {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ConnectorError::UnsupportedWallet(s.to_owned()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletLinkOptions {
    pub app_name: String,
    pub app_logo_url: String,
    /// JSON-RPC endpoint of the requested network
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TorusOptions {
    pub chain_id: ChainId,
    pub init_options: SdkInitOptions,
}

/// Constructors of the connectors implemented outside of this crate.
pub trait ExternalConnectors {
    fn injected(&self) -> Box<dyn Connector>;

    fn wallet_link(&self, options: WalletLinkOptions) -> Box<dyn Connector>;

    /// `chain_id` is the chain the application currently runs on
    fn wallet_connect(&self, chain_id: ChainId) -> Box<dyn Connector>;

    fn safe_app(&self) -> Box<dyn Connector>;

    fn torus(&self, options: TorusOptions) -> Box<dyn Connector>;

    fn frame(&self, supported_chain_ids: Vec<ChainId>) -> Box<dyn Connector>;
}

/// What the host context offers.
pub trait Environment {
    /// `true` when running with a browser `window` global
    fn has_window(&self) -> bool;
}

/// The actual JavaScript global scope.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserWindow;

impl Environment for BrowserWindow {
    fn has_window(&self) -> bool {
        js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str("window"))
            .map(|window| window.is_object())
            .unwrap_or(false)
    }
}

fn default_app_name() -> String {
    "Aave".to_owned()
}

fn default_app_logo_url() -> String {
    "https://aave.com/favicon.ico".to_owned()
}

fn default_sdk_module() -> String {
    TG_SDK_MODULE.to_owned()
}

/// Settings of the [`ConnectorFactory`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactoryConfig {
    /// name shown by the mobile wallets
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_app_logo_url")]
    pub app_logo_url: String,
    /// ES module specifier of the UXUY SDK
    #[serde(default = "default_sdk_module")]
    pub sdk_module: String,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            app_logo_url: default_app_logo_url(),
            sdk_module: default_sdk_module(),
        }
    }
}

impl FactoryConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Builds the connector matching the wallet the user picked.
///
/// A fresh connector is built on every call, only the storage slots are
/// shared between them.
pub struct ConnectorFactory {
    config: FactoryConfig,
    external: Rc<dyn ExternalConnectors>,
    store: Rc<dyn KeyValueStore>,
    networks: Rc<dyn NetworkRegistry>,
    sdk_loader: Rc<dyn SdkLoader>,
    environment: Rc<dyn Environment>,
}

impl ConnectorFactory {
    /// factory wired to the browser: `localStorage`, the built-in networks
    /// and the UXUY SDK loaded with a dynamic import
    pub fn new(external: Rc<dyn ExternalConnectors>) -> Self {
        Self::with_config(external, FactoryConfig::default())
    }

    pub fn with_config(external: Rc<dyn ExternalConnectors>, config: FactoryConfig) -> Self {
        let sdk_loader = Rc::new(TgSdkLoader::new(config.sdk_module.clone()));
        Self {
            config,
            external,
            store: Rc::new(LocalStorage),
            networks: Rc::new(Networks::builtin()),
            sdk_loader,
            environment: Rc::new(BrowserWindow),
        }
    }

    pub fn store(mut self, store: Rc<dyn KeyValueStore>) -> Self {
        self.store = store;
        self
    }

    pub fn networks(mut self, networks: Rc<dyn NetworkRegistry>) -> Self {
        self.networks = networks;
        self
    }

    pub fn sdk_loader(mut self, sdk_loader: Rc<dyn SdkLoader>) -> Self {
        self.sdk_loader = sdk_loader;
        self
    }

    pub fn environment(mut self, environment: Rc<dyn Environment>) -> Self {
        self.environment = environment;
        self
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    /// build the connector for `kind`
    ///
    /// `chain_id` is the chain the user asked for, `current_chain_id` the one
    /// the application is on. Only WalletConnect looks at the latter.
    pub fn select_connector(
        &self,
        kind: WalletKind,
        chain_id: ChainId,
        current_chain_id: ChainId,
    ) -> Result<Box<dyn Connector>, ConnectorError> {
        tracing::debug!(wallet = %kind, %chain_id, %current_chain_id, "selecting connector");

        match kind {
            WalletKind::ReadOnlyMode => Ok(Box::new(ReadOnlyConnector::new(Rc::clone(
                &self.store,
            )))),
            WalletKind::Injected => Ok(self.external.injected()),
            WalletKind::WalletLink => {
                let network = self
                    .networks
                    .network(chain_id)
                    .ok_or(ConnectorError::UnknownNetwork(chain_id))?;
                let url = network
                    .rpc_url()
                    .ok_or(ConnectorError::UnknownNetwork(chain_id))?
                    .to_owned();

                Ok(self.external.wallet_link(WalletLinkOptions {
                    app_name: self.config.app_name.clone(),
                    app_logo_url: self.config.app_logo_url.clone(),
                    url,
                }))
            }
            WalletKind::WalletConnect => Ok(self.external.wallet_connect(current_chain_id)),
            WalletKind::Gnosis => {
                if self.environment.has_window() {
                    Ok(self.external.safe_app())
                } else {
                    Err(ConnectorError::Environment("Safe app not working".to_owned()))
                }
            }
            WalletKind::Torus => Ok(self.external.torus(TorusOptions {
                chain_id,
                init_options: SdkInitOptions {
                    show_torus_button: Some(false),
                    ..SdkInitOptions::quiet(chain_id)
                },
            })),
            WalletKind::Uxuy => Ok(Box::new(UxuyConnector::new(
                chain_id,
                serde_json::Value::Object(serde_json::Map::new()),
                SdkInitOptions::quiet(chain_id),
                Rc::clone(&self.sdk_loader),
            ))),
            WalletKind::Frame => {
                if chain_id != ChainId::MAINNET {
                    return Err(ConnectorError::UnsupportedChain {
                        chain_id,
                        supported: vec![ChainId::MAINNET],
                    });
                }
                Ok(self.external.frame(vec![ChainId::MAINNET]))
            }
            WalletKind::Ledger => Err(ConnectorError::UnsupportedWallet(kind.to_string())),
        }
    }

    /// same as [`select_connector`] with the wallet given by name
    ///
    /// [`select_connector`]: Self::select_connector
    pub fn select_connector_by_name(
        &self,
        name: &str,
        chain_id: ChainId,
        current_chain_id: ChainId,
    ) -> Result<Box<dyn Connector>, ConnectorError> {
        self.select_connector(name.parse()?, chain_id, current_chain_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        connector::{ConnectorUpdate, EventEmitter, ProviderHandle},
        network::NetworkConfig,
        read_only::{READ_ONLY_ADDRESS_KEY, store_read_only_address},
        storage::MemoryStore,
    };
    use async_trait::async_trait;
    use futures::executor::block_on;
    use serde_json::json;
    use std::cell::RefCell;

    /// stands in for the connectors of the third party libraries
    struct StubConnector {
        kind: WalletKind,
        events: EventEmitter,
    }

    #[async_trait(?Send)]
    impl Connector for StubConnector {
        fn kind(&self) -> WalletKind {
            self.kind
        }

        async fn activate(&self) -> Result<ConnectorUpdate, ConnectorError> {
            Err(ConnectorError::NotActivated)
        }

        async fn provider(&self) -> Result<ProviderHandle, ConnectorError> {
            Err(ConnectorError::NotActivated)
        }

        async fn chain_id(&self) -> Result<ChainId, ConnectorError> {
            Err(ConnectorError::NotActivated)
        }

        async fn account(&self) -> Result<Option<String>, ConnectorError> {
            Ok(None)
        }

        fn deactivate(&self) {}

        fn events(&self) -> &EventEmitter {
            &self.events
        }
    }

    #[derive(Debug, PartialEq)]
    enum Built {
        Injected,
        WalletLink(WalletLinkOptions),
        WalletConnect(ChainId),
        SafeApp,
        Torus(TorusOptions),
        Frame(Vec<ChainId>),
    }

    #[derive(Default)]
    struct RecordingConnectors {
        built: RefCell<Vec<Built>>,
    }

    impl RecordingConnectors {
        fn stub(&self, kind: WalletKind, built: Built) -> Box<dyn Connector> {
            self.built.borrow_mut().push(built);
            Box::new(StubConnector {
                kind,
                events: EventEmitter::new(),
            })
        }
    }

    impl ExternalConnectors for RecordingConnectors {
        fn injected(&self) -> Box<dyn Connector> {
            self.stub(WalletKind::Injected, Built::Injected)
        }

        fn wallet_link(&self, options: WalletLinkOptions) -> Box<dyn Connector> {
            self.stub(WalletKind::WalletLink, Built::WalletLink(options))
        }

        fn wallet_connect(&self, chain_id: ChainId) -> Box<dyn Connector> {
            self.stub(WalletKind::WalletConnect, Built::WalletConnect(chain_id))
        }

        fn safe_app(&self) -> Box<dyn Connector> {
            self.stub(WalletKind::Gnosis, Built::SafeApp)
        }

        fn torus(&self, options: TorusOptions) -> Box<dyn Connector> {
            self.stub(WalletKind::Torus, Built::Torus(options))
        }

        fn frame(&self, supported_chain_ids: Vec<ChainId>) -> Box<dyn Connector> {
            self.stub(WalletKind::Frame, Built::Frame(supported_chain_ids))
        }
    }

    struct Headless(bool);

    impl Environment for Headless {
        fn has_window(&self) -> bool {
            self.0
        }
    }

    struct NoSdk;

    #[async_trait(?Send)]
    impl SdkLoader for NoSdk {
        async fn load(&self, _options: &serde_json::Value) -> Result<ProviderHandle, ConnectorError> {
            Err(ConnectorError::ModuleLoad("not available in tests".to_owned()))
        }
    }

    fn networks() -> Networks {
        let mut networks = Networks::empty();
        networks.insert(
            ChainId::MAINNET,
            NetworkConfig {
                name: "Ethereum".to_owned(),
                private_json_rpc_url: Some("https://private".to_owned()),
                public_json_rpc_url: vec!["https://public".to_owned()],
            },
        );
        networks.insert(
            ChainId::POLYGON,
            NetworkConfig {
                name: "Polygon".to_owned(),
                private_json_rpc_url: None,
                public_json_rpc_url: vec!["https://a".to_owned(), "https://b".to_owned()],
            },
        );
        networks
    }

    fn factory(has_window: bool) -> (Rc<RecordingConnectors>, Rc<MemoryStore>, ConnectorFactory) {
        let external = Rc::new(RecordingConnectors::default());
        let store = Rc::new(MemoryStore::new());
        let factory = ConnectorFactory::new(external.clone())
            .store(store.clone())
            .networks(Rc::new(networks()))
            .sdk_loader(Rc::new(NoSdk))
            .environment(Rc::new(Headless(has_window)));
        (external, store, factory)
    }

    #[test]
    fn wallet_kind_names() {
        for kind in WalletKind::ALL {
            assert_eq!(kind.as_str().parse::<WalletKind>().unwrap(), kind);
            assert_eq!(
                serde_json::to_value(kind).unwrap(),
                json!(kind.as_str())
            );
        }
        assert_eq!(
            "metamask".parse::<WalletKind>(),
            Err(ConnectorError::UnsupportedWallet("metamask".to_owned()))
        );
    }

    #[test]
    fn unsupported_wallets_build_nothing() {
        let (external, _store, factory) = factory(true);

        assert_eq!(
            factory
                .select_connector(WalletKind::Ledger, ChainId::MAINNET, ChainId::MAINNET)
                .err(),
            Some(ConnectorError::UnsupportedWallet("ledger".to_owned()))
        );
        assert_eq!(
            factory
                .select_connector_by_name("trezor", ChainId::MAINNET, ChainId::MAINNET)
                .err(),
            Some(ConnectorError::UnsupportedWallet("trezor".to_owned()))
        );
        assert!(external.built.borrow().is_empty());
    }

    #[test]
    fn read_only_mode_uses_factory_store() -> anyhow::Result<()> {
        let (external, store, factory) = factory(false);
        store_read_only_address(store.as_ref(), "0xABC")?;

        let connector =
            factory.select_connector(WalletKind::ReadOnlyMode, ChainId::POLYGON, ChainId::MAINNET)?;
        assert_eq!(connector.kind(), WalletKind::ReadOnlyMode);

        let update = block_on(connector.activate())?;
        assert_eq!(update.account.as_deref(), Some("0xABC"));
        assert_eq!(update.chain_id, Some(ChainId::MAINNET));

        connector.deactivate();
        assert_eq!(store.get(READ_ONLY_ADDRESS_KEY)?, None);
        assert!(external.built.borrow().is_empty());
        Ok(())
    }

    #[test]
    fn injected_takes_no_options() -> anyhow::Result<()> {
        let (external, _store, factory) = factory(false);

        let connector =
            factory.select_connector(WalletKind::Injected, ChainId::BSC, ChainId::MAINNET)?;

        assert_eq!(connector.kind(), WalletKind::Injected);
        assert_eq!(*external.built.borrow(), vec![Built::Injected]);
        Ok(())
    }

    #[test]
    fn wallet_link_falls_back_to_first_public_url() -> anyhow::Result<()> {
        let (external, _store, factory) = factory(false);

        factory.select_connector(WalletKind::WalletLink, ChainId::POLYGON, ChainId::MAINNET)?;
        factory.select_connector(WalletKind::WalletLink, ChainId::MAINNET, ChainId::MAINNET)?;

        assert_eq!(
            *external.built.borrow(),
            vec![
                Built::WalletLink(WalletLinkOptions {
                    app_name: "Aave".to_owned(),
                    app_logo_url: "https://aave.com/favicon.ico".to_owned(),
                    url: "https://a".to_owned(),
                }),
                Built::WalletLink(WalletLinkOptions {
                    app_name: "Aave".to_owned(),
                    app_logo_url: "https://aave.com/favicon.ico".to_owned(),
                    url: "https://private".to_owned(),
                }),
            ]
        );
        Ok(())
    }

    #[test]
    fn wallet_link_requires_known_network() {
        let (external, _store, factory) = factory(false);

        assert_eq!(
            factory
                .select_connector(WalletKind::WalletLink, ChainId::BASE, ChainId::MAINNET)
                .err(),
            Some(ConnectorError::UnknownNetwork(ChainId::BASE))
        );
        assert!(external.built.borrow().is_empty());
    }

    #[test]
    fn wallet_connect_uses_current_chain() -> anyhow::Result<()> {
        let (external, _store, factory) = factory(false);

        factory.select_connector(WalletKind::WalletConnect, ChainId::POLYGON, ChainId::BASE)?;

        assert_eq!(*external.built.borrow(), vec![Built::WalletConnect(ChainId::BASE)]);
        Ok(())
    }

    #[test]
    fn gnosis_requires_window() -> anyhow::Result<()> {
        let (external, _store, headless) = factory(false);
        assert!(matches!(
            headless.select_connector(WalletKind::Gnosis, ChainId::MAINNET, ChainId::MAINNET),
            Err(ConnectorError::Environment(_))
        ));
        assert!(external.built.borrow().is_empty());

        let (external, _store, browser) = factory(true);
        browser.select_connector(WalletKind::Gnosis, ChainId::MAINNET, ChainId::MAINNET)?;
        assert_eq!(*external.built.borrow(), vec![Built::SafeApp]);
        Ok(())
    }

    #[test]
    fn frame_only_on_mainnet() -> anyhow::Result<()> {
        let (external, _store, factory) = factory(false);

        assert_eq!(
            factory
                .select_connector(WalletKind::Frame, ChainId::POLYGON, ChainId::POLYGON)
                .err(),
            Some(ConnectorError::UnsupportedChain {
                chain_id: ChainId::POLYGON,
                supported: vec![ChainId::MAINNET],
            })
        );
        assert!(external.built.borrow().is_empty());

        let connector =
            factory.select_connector(WalletKind::Frame, ChainId::MAINNET, ChainId::POLYGON)?;
        assert_eq!(connector.kind(), WalletKind::Frame);
        assert_eq!(*external.built.borrow(), vec![Built::Frame(vec![ChainId::MAINNET])]);
        Ok(())
    }

    #[test]
    fn torus_network_host() -> anyhow::Result<()> {
        let (external, _store, factory) = factory(false);

        factory.select_connector(WalletKind::Torus, ChainId::POLYGON, ChainId::MAINNET)?;

        let built = external.built.borrow();
        let Built::Torus(options) = &built[0] else {
            panic!("expected torus options, got {built:?}");
        };
        assert_eq!(options.chain_id, ChainId::POLYGON);
        assert_eq!(
            serde_json::to_value(&options.init_options)?,
            json! { {
                "network": { "host": "matic" },
                "showTorusButton": false,
                "enableLogging": false,
                "enabledVerifiers": false,
            }}
        );
        Ok(())
    }

    #[test]
    fn uxuy_connector_is_configured_for_chain() -> anyhow::Result<()> {
        let (external, _store, factory) = factory(false);

        let connector =
            factory.select_connector(WalletKind::Uxuy, ChainId::BASE, ChainId::MAINNET)?;

        assert_eq!(connector.kind(), WalletKind::Uxuy);
        assert_eq!(block_on(connector.chain_id())?, ChainId::BASE);
        assert!(
            connector
                .supported_chain_ids()
                .is_some_and(|chains| chains.contains(&ChainId::BASE))
        );
        assert!(matches!(
            block_on(connector.activate()),
            Err(ConnectorError::ModuleLoad(_))
        ));
        assert!(external.built.borrow().is_empty());
        Ok(())
    }

    #[test]
    fn factory_config_json() {
        let config = FactoryConfig::from_json(r#"{ "appName": "Lending" }"#).unwrap();

        assert_eq!(config.app_name, "Lending");
        assert_eq!(config.app_logo_url, "https://aave.com/favicon.ico");
        assert_eq!(config.sdk_module, TG_SDK_MODULE);
        assert_eq!(FactoryConfig::from_json("{}").unwrap(), FactoryConfig::default());
    }
}
