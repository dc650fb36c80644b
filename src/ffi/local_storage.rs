use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// `window.localStorage`, absent outside of a browsing context or when
    /// the user disabled storage for the site.
    #[wasm_bindgen(thread_local_v2, js_namespace = ["window"], js_name = "localStorage")]
    pub static LOCAL_STORAGE: Option<Storage>;
}

#[wasm_bindgen]
extern "C" {
    #[derive(Clone, PartialEq)]
    pub type Storage;

    /// Returns the current value associated with the given key, or null if
    /// the given key does not exist.
    #[wasm_bindgen(method, catch, js_name = "getItem")]
    pub fn get_item(this: &Storage, key: &str) -> Result<Option<String>, JsValue>;

    /// Sets the value of the pair identified by key to value, creating a new
    /// key/value pair if none existed for key previously.
    ///
    /// Throws a "QuotaExceededError" DOMException if the new value couldn't
    /// be set.
    #[wasm_bindgen(method, catch, js_name = "setItem")]
    pub fn set_item(this: &Storage, key: &str, value: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = "removeItem")]
    pub fn remove_item(this: &Storage, key: &str) -> Result<(), JsValue>;
}
