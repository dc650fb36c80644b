use crate::{
    WalletKind,
    chain::ChainId,
    error::{ConnectorError, ProviderRpcError},
};
use async_trait::async_trait;
use serde_json::Value;
use std::{cell::RefCell, fmt, rc::Rc};

/// Events a [`Provider`] notifies its listeners of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderEvent {
    AccountsChanged,
    ChainChanged,
    Connect,
    Disconnect,
}

impl ProviderEvent {
    /// the name of the event as emitted by EIP-1193 providers
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AccountsChanged => "accountsChanged",
            Self::ChainChanged => "chainChanged",
            Self::Connect => "connect",
            Self::Disconnect => "disconnect",
        }
    }
}

/// Handle to an EIP-1193 like provider: a `request` method plus an event
/// emitter.
#[async_trait(?Send)]
pub trait Provider {
    async fn request(&self, method: &str, params: Option<Value>)
    -> Result<Value, ProviderRpcError>;

    /// register a listener for the given event
    ///
    /// Providers without events ignore the handler.
    fn on(&self, event: ProviderEvent, handler: Box<dyn Fn(Value)>) {
        let _ = (event, handler);
    }

    fn remove_all_listeners(&self) {}
}

pub type ProviderHandle = Rc<dyn Provider>;

/// Provider handed out in read-only mode.
///
/// There is no wallet behind it: requests never complete. Code that needs
/// live RPC calls must not go through it.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProvider;

#[async_trait(?Send)]
impl Provider for NoopProvider {
    async fn request(
        &self,
        method: &str,
        _params: Option<Value>,
    ) -> Result<Value, ProviderRpcError> {
        tracing::debug!(method, "request on the read-only provider will never resolve");
        futures::future::pending().await
    }
}

/// Result of an activation, or a change in the active session.
#[derive(Clone, Default)]
pub struct ConnectorUpdate {
    pub chain_id: Option<ChainId>,
    pub account: Option<String>,
    pub provider: Option<ProviderHandle>,
}

impl fmt::Debug for ConnectorUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorUpdate")
            .field("chain_id", &self.chain_id)
            .field("account", &self.account)
            .field("provider", &self.provider.as_ref().map(|_| "Provider"))
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum ConnectorEvent {
    Update(ConnectorUpdate),
    Deactivate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Rc<dyn Fn(&ConnectorEvent)>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(SubscriptionId, Listener)>,
}

/// Subscription list of a connector.
///
/// Cloning gives another handle on the same list, this is how the
/// listeners registered on a provider emit on behalf of their connector.
#[derive(Clone, Default)]
pub struct EventEmitter {
    listeners: Rc<RefCell<Listeners>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl Fn(&ConnectorEvent) + 'static) -> SubscriptionId {
        let mut listeners = self.listeners.borrow_mut();
        let id = SubscriptionId(listeners.next_id);
        listeners.next_id += 1;
        listeners.entries.push((id, Rc::new(listener)));
        id
    }

    /// returns `false` if the subscription was already removed
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.entries.len();
        listeners.entries.retain(|(entry, _)| *entry != id);
        listeners.entries.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().entries.len()
    }

    pub fn emit_update(&self, update: ConnectorUpdate) {
        self.emit(&ConnectorEvent::Update(update));
    }

    pub fn emit_deactivate(&self) {
        self.emit(&ConnectorEvent::Deactivate);
    }

    fn emit(&self, event: &ConnectorEvent) {
        // listeners may (un)subscribe while being notified
        let snapshot: Vec<Listener> = self
            .listeners
            .borrow()
            .entries
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();

        for listener in snapshot {
            listener(event);
        }
    }
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Common lifecycle of every wallet adapter.
#[async_trait(?Send)]
pub trait Connector {
    fn kind(&self) -> WalletKind;

    /// `None` when the connector accepts any chain.
    fn supported_chain_ids(&self) -> Option<&[ChainId]> {
        None
    }

    /// perform the handshake with the wallet and return the live provider
    /// with the active account and chain
    async fn activate(&self) -> Result<ConnectorUpdate, ConnectorError>;

    /// the provider, without triggering a new handshake
    async fn provider(&self) -> Result<ProviderHandle, ConnectorError>;

    async fn chain_id(&self) -> Result<ChainId, ConnectorError>;

    async fn account(&self) -> Result<Option<String>, ConnectorError>;

    /// best-effort cleanup of the state held by the connector
    fn deactivate(&self);

    /// full teardown, the session is over once this returns
    async fn close(&self) {
        self.deactivate();
        self.events().emit_deactivate();
    }

    fn events(&self) -> &EventEmitter;
}

/// check `chain_id` against an allow-list of chains
pub fn validate_chain(chain_id: ChainId, supported: &[ChainId]) -> Result<(), ConnectorError> {
    if supported.contains(&chain_id) {
        Ok(())
    } else {
        Err(ConnectorError::UnsupportedChain {
            chain_id,
            supported: supported.to_vec(),
        })
    }
}
