use crate::{
    connector::{Provider, ProviderEvent, ProviderHandle},
    error::{ConnectorError, ProviderRpcError},
    ffi,
};
use async_trait::async_trait;
use serde::Serialize as _;
use serde_json::Value;
use std::{cell::RefCell, rc::Rc};
use wasm_bindgen::{JsCast as _, JsValue, closure::Closure};

/// default module specifier of the UXUY Telegram wallet SDK
pub const TG_SDK_MODULE: &str = "@uxuycom/web3-tg-sdk";

/// Loads an embedded wallet SDK and hands out its provider.
#[async_trait(?Send)]
pub trait SdkLoader {
    /// load the SDK module and instantiate it with the given constructor
    /// options
    async fn load(&self, constructor_options: &Value) -> Result<ProviderHandle, ConnectorError>;
}

/// Loads the SDK with a dynamic `import()` of the ES module.
#[derive(Debug, Clone)]
pub struct TgSdkLoader {
    module: String,
}

impl TgSdkLoader {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
        }
    }
}

impl Default for TgSdkLoader {
    fn default() -> Self {
        Self::new(TG_SDK_MODULE)
    }
}

fn load_error(context: &str, error: JsValue) -> ConnectorError {
    ConnectorError::ModuleLoad(format!("{context}: {error:?}"))
}

#[async_trait(?Send)]
impl SdkLoader for TgSdkLoader {
    async fn load(&self, constructor_options: &Value) -> Result<ProviderHandle, ConnectorError> {
        tracing::debug!(module = %self.module, "loading wallet SDK");

        let promise = ffi::tg_sdk::import_module(&self.module)
            .map_err(|error| load_error("import failed", error))?;
        let module = wasm_bindgen_futures::JsFuture::from(promise)
            .await
            .map_err(|error| load_error("import failed", error))?;

        // CommonJS bundles put the exports under `default`
        let exports = js_sys::Reflect::get(&module, &JsValue::from_str("default"))
            .ok()
            .filter(|exports| exports.is_object())
            .unwrap_or(module);

        let constructor = js_sys::Reflect::get(&exports, &JsValue::from_str("WalletTgSdk"))
            .map_err(|error| load_error("missing WalletTgSdk export", error))?;
        let Some(constructor) = constructor.dyn_ref::<js_sys::Function>() else {
            return Err(ConnectorError::ModuleLoad(format!(
                "WalletTgSdk is not a constructor: {constructor:?}"
            )));
        };

        let options = constructor_options
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|error| ConnectorError::ModuleLoad(error.to_string()))?;
        let sdk = js_sys::Reflect::construct(constructor, &js_sys::Array::of1(&options))
            .map_err(|error| load_error("WalletTgSdk constructor failed", error))?
            .unchecked_into::<ffi::WalletTgSdk>();

        Ok(Rc::new(JsProvider::new(sdk.ethereum())))
    }
}

/// [`Provider`] over a JavaScript EIP-1193 provider object.
pub struct JsProvider {
    ethereum: ffi::EthereumProvider,
    // keep the closures alive as long as they are registered
    listeners: RefCell<Vec<Closure<dyn FnMut(JsValue)>>>,
}

#[derive(serde::Serialize)]
struct RequestArguments<'a> {
    method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Value>,
}

impl JsProvider {
    pub fn new(ethereum: ffi::EthereumProvider) -> Self {
        Self {
            ethereum,
            listeners: RefCell::new(Vec::new()),
        }
    }
}

#[async_trait(?Send)]
impl Provider for JsProvider {
    async fn request(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<Value, ProviderRpcError> {
        let args = RequestArguments { method, params }
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|error| {
                ProviderRpcError::internal(format!("Couldn't encode the request: {error}"))
            })?;

        match self.ethereum.request(args).await {
            Ok(result) => serde_wasm_bindgen::from_value(result).map_err(|decode_error| {
                ProviderRpcError::internal(format!(
                    "Couldn't decode the response content: {decode_error}"
                ))
            }),
            Err(error) => serde_wasm_bindgen::from_value(error.clone())
                .map_err(|decode_error| {
                    ProviderRpcError::internal(format!(
                        "Couldn't decode the error content: {decode_error} ({error:?})"
                    ))
                })
                .and_then(Err),
        }
    }

    fn on(&self, event: ProviderEvent, handler: Box<dyn Fn(Value)>) {
        let listener = Closure::<dyn FnMut(JsValue)>::new(move |payload: JsValue| {
            let payload = serde_wasm_bindgen::from_value(payload).unwrap_or(Value::Null);
            handler(payload)
        });
        self.ethereum.on(event.as_str(), &listener);
        self.listeners.borrow_mut().push(listener);
    }

    fn remove_all_listeners(&self) {
        self.ethereum.remove_all_listeners();
        self.listeners.borrow_mut().clear();
    }
}
