use crate::{
    WalletKind,
    chain::ChainId,
    connector::{Connector, ConnectorUpdate, EventEmitter, NoopProvider, ProviderHandle},
    error::{ConnectorError, StorageError},
    storage::KeyValueStore,
};
use async_trait::async_trait;
use std::{cell::RefCell, rc::Rc};

/// slot holding the address observed in read-only mode
pub const READ_ONLY_ADDRESS_KEY: &str = "readOnlyModeAddress";

/// start observe mode: the next [`ReadOnlyConnector`] activation will pick
/// up this address
pub fn store_read_only_address(
    store: &dyn KeyValueStore,
    address: &str,
) -> Result<(), StorageError> {
    store.set(READ_ONLY_ADDRESS_KEY, address)
}

/// Connector observing an address without any wallet software.
///
/// Activation expects the address to be in the [`READ_ONLY_ADDRESS_KEY`]
/// slot. The session is always on mainnet and the provider is a
/// [`NoopProvider`].
pub struct ReadOnlyConnector {
    store: Rc<dyn KeyValueStore>,
    provider: ProviderHandle,
    address: RefCell<Option<String>>,
    events: EventEmitter,
}

impl ReadOnlyConnector {
    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            provider: Rc::new(NoopProvider),
            address: RefCell::new(None),
            events: EventEmitter::new(),
        }
    }
}

#[async_trait(?Send)]
impl Connector for ReadOnlyConnector {
    fn kind(&self) -> WalletKind {
        WalletKind::ReadOnlyMode
    }

    fn supported_chain_ids(&self) -> Option<&[ChainId]> {
        Some(&[ChainId::MAINNET])
    }

    async fn activate(&self) -> Result<ConnectorUpdate, ConnectorError> {
        let address = match self.store.get(READ_ONLY_ADDRESS_KEY)? {
            Some(address) if !address.is_empty() && address != "undefined" => address,
            _ => return Err(ConnectorError::MissingAddress),
        };

        tracing::info!(account = %address, "observing address in read-only mode");
        *self.address.borrow_mut() = Some(address.clone());

        Ok(ConnectorUpdate {
            provider: Some(Rc::clone(&self.provider)),
            chain_id: Some(ChainId::MAINNET),
            account: Some(address),
        })
    }

    async fn provider(&self) -> Result<ProviderHandle, ConnectorError> {
        Ok(Rc::clone(&self.provider))
    }

    async fn chain_id(&self) -> Result<ChainId, ConnectorError> {
        Ok(ChainId::MAINNET)
    }

    async fn account(&self) -> Result<Option<String>, ConnectorError> {
        Ok(self.address.borrow().clone())
    }

    /// Clears the slot only when it still holds the address captured at
    /// activation: when the user switches to another observed address the
    /// new connector is activated before this one is deactivated.
    fn deactivate(&self) {
        let captured = self.address.borrow().clone();
        let stored = match self.store.get(READ_ONLY_ADDRESS_KEY) {
            Ok(stored) => stored,
            Err(error) => {
                tracing::warn!(%error, "couldn't read the read-only address on deactivation");
                return;
            }
        };

        if stored.is_some() && stored == captured {
            if let Err(error) = self.store.remove(READ_ONLY_ADDRESS_KEY) {
                tracing::warn!(%error, "couldn't clear the read-only address");
            }
        } else {
            tracing::debug!("read-only address slot was overwritten, leaving it untouched");
        }
    }

    fn events(&self) -> &EventEmitter {
        &self.events
    }
}
