/*!

# Wallet connectors for EVM dApps

This library is meant to be used by web applications that let their users
connect an Ethereum (or EVM compatible) wallet. It hides the different wallet
integrations behind a single [`Connector`] lifecycle.

## Features

- Pick the connector matching the wallet chosen by the user
- Observe an address without any wallet (read-only mode)
- Connect the UXUY Telegram mini-app wallet
- Follow the account and network changes of the session

## Usage

The connectors of the third party libraries (injected, WalletConnect,
WalletLink, Gnosis Safe, Torus and Frame) are provided by the application
through [`ExternalConnectors`]. The factory takes care of everything else:

```no_run
# use std::rc::Rc;
# use evm_wallet_connector::{ChainId, Connector, ConnectorFactory, ExternalConnectors, WalletKind};
# async fn test(external: Rc<dyn ExternalConnectors>) -> anyhow::Result<()> {
let factory = ConnectorFactory::new(external);
let connector = factory.select_connector(WalletKind::Uxuy, ChainId::POLYGON, ChainId::MAINNET)?;

let session = connector.activate().await?;
println!("connected account: {:?}", session.account);

connector.events().subscribe(|event| println!("{event:?}"));
# connector.close().await;
# Ok(()) }
```

Read-only mode observes the address stored by the application:

```no_run
# use std::rc::Rc;
# use evm_wallet_connector::{ChainId, Connector, ConnectorFactory, ExternalConnectors, WalletKind};
# use evm_wallet_connector::{read_only::store_read_only_address, storage::LocalStorage};
# async fn test(external: Rc<dyn ExternalConnectors>) -> anyhow::Result<()> {
store_read_only_address(&LocalStorage, "0x464C71f6c2F760DdA6093dCB91C24c39e5d6e18c")?;

let factory = ConnectorFactory::new(external);
let connector =
    factory.select_connector(WalletKind::ReadOnlyMode, ChainId::MAINNET, ChainId::MAINNET)?;
let session = connector.activate().await?;
# Ok(()) }
```

The library logs through [`tracing`], installing a subscriber is left to the
application.

*/

pub mod chain;
pub mod connector;
pub mod error;
pub mod ffi;
pub mod network;
pub mod read_only;
pub mod sdk;
pub mod storage;
pub mod uxuy;
mod wallet;

pub use self::{
    chain::ChainId,
    connector::{Connector, ConnectorEvent, ConnectorUpdate, Provider, ProviderHandle},
    error::ConnectorError,
    read_only::ReadOnlyConnector,
    uxuy::UxuyConnector,
    wallet::{
        BrowserWindow, ConnectorFactory, Environment, ExternalConnectors, FactoryConfig,
        TorusOptions, WalletKind, WalletLinkOptions,
    },
};
