//! 静态链表：链名称 → 链 ID、原生币符号，以及各地址格式族的占位地址。

pub mod address;
pub mod chains;

pub use address::{AddressFamily, default_address, looks_like_address};
pub use chains::{
    ChainId, ChainRef, canonical_chain_name, chain_id, known_chains, native_asset_symbol,
};
