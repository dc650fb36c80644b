use js_sys::{Function, Promise};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// Instance of the Telegram mini-app wallet SDK (`new WalletTgSdk(options)`).
    #[derive(Clone)]
    pub type WalletTgSdk;

    /// The EIP-1193 provider exposed by the SDK.
    #[wasm_bindgen(method, getter)]
    pub fn ethereum(this: &WalletTgSdk) -> EthereumProvider;
}

#[wasm_bindgen]
extern "C" {
    #[derive(Clone)]
    pub type EthereumProvider;

    /// Submit a JSON-RPC request `{ method, params }` to the wallet.
    ///
    /// The promise rejects with a `ProviderRpcError` like object
    /// (`{ code, message, data? }`), e.g. code `4001` when the user declined.
    #[wasm_bindgen(method, catch)]
    pub async fn request(this: &EthereumProvider, args: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method)]
    pub fn on(this: &EthereumProvider, event: &str, listener: &Closure<dyn FnMut(JsValue)>);

    #[wasm_bindgen(method, js_name = "removeAllListeners")]
    pub fn remove_all_listeners(this: &EthereumProvider);
}

/// dynamic `import(specifier)` of an ES module
pub fn import_module(specifier: &str) -> Result<Promise, JsValue> {
    let import = Function::new_with_args("specifier", "return import(specifier)");
    import
        .call1(&JsValue::UNDEFINED, &JsValue::from_str(specifier))
        .map(Promise::from)
}
