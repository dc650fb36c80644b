pub mod local_storage;
pub mod tg_sdk;

pub use self::{
    local_storage::Storage,
    tg_sdk::{EthereumProvider, WalletTgSdk},
};
