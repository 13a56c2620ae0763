use std::fmt;

use serde::{Deserialize, Serialize};

/// LI.FI 使用的链 ID。EVM 链沿用原生 chainId，非 EVM 链为 LI.FI 分配的合成 ID。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub u64);

impl ChainId {
    pub const BITCOIN: ChainId = ChainId(20_000_000_000_001);
    pub const SOLANA: ChainId = ChainId(1_151_111_081_099_710);
    pub const SUI: ChainId = ChainId(9_270_000_000_000_000);

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// 已解析的链引用：表内规范名称 + 链 ID。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainRef {
    pub name: &'static str,
    pub id: ChainId,
}

const KNOWN_CHAINS: &[(&str, u64)] = &[
    ("Abstract", 2741),
    ("Apechain", 33139),
    ("Arbitrum", 42161),
    ("Aurora", 1313161554),
    ("Avalanche", 43114),
    ("Base", 8453),
    ("Berachain", 80094),
    ("Bitcoin", 20_000_000_000_001),
    ("Blast", 81457),
    ("BOB", 60808),
    ("Boba", 288),
    ("BSC", 56),
    ("Celo", 42220),
    ("Corn", 21000000),
    ("Cronos", 25),
    ("Ethereum", 1),
    ("Etherlink", 42793),
    ("Fantom", 250),
    ("FUSE", 122),
    ("Gnosis", 100),
    ("Gravity", 1625),
    ("HyperEVM", 999),
    ("Immutable zkEVM", 13371),
    ("Ink", 57073),
    ("Kaia", 8217),
    ("Lens", 232),
    ("Linea", 59144),
    ("Lisk", 1135),
    ("Mantle", 5000),
    ("Metis", 1088),
    ("Mode", 34443),
    ("Moonbeam", 1284),
    ("Moonriver", 1285),
    ("opBNB", 204),
    ("Optimism", 10),
    ("Polygon", 137),
    ("Polygon zkEVM", 1101),
    ("Rootstock", 30),
    ("Scroll", 534352),
    ("Sei", 1329),
    ("Solana", 1_151_111_081_099_710),
    ("Soneium", 1868),
    ("Sonic", 146),
    ("Sui", 9_270_000_000_000_000),
    ("Superposition", 55244),
    ("Swellchain", 1923),
    ("Taiko", 167000),
    ("Unichain", 130),
    ("World Chain", 480),
    ("XDC", 50),
    ("zkSync", 324),
];

// 未列出的链按 EVM 处理，原生币为 ETH。
const SPECIAL_NATIVES: &[(&str, &str)] = &[
    ("Solana", "SOL"),
    ("Sui", "SUI"),
    ("Binance", "BNB"),
    ("Avalanche", "AVAX"),
    ("Gnosis", "xDAI"),
    ("Lens", "GHO"),
    ("Metis", "METIS"),
    ("Rootstock", "RBTC"),
    ("Bitcoin", "bitcoin"),
];

const DEFAULT_NATIVE: &str = "ETH";

fn lookup(name: &str) -> Option<(&'static str, u64)> {
    let trimmed = name.trim();
    KNOWN_CHAINS
        .iter()
        .find(|(known, _)| *known == trimmed)
        .or_else(|| {
            KNOWN_CHAINS
                .iter()
                .find(|(known, _)| known.eq_ignore_ascii_case(trimmed))
        })
        .copied()
}

/// 链名称 → 链 ID；未知名称返回 `None`，调用方须视为硬失败。
pub fn chain_id(name: &str) -> Option<ChainId> {
    lookup(name).map(|(_, id)| ChainId(id))
}

/// 解析为表内规范写法，便于与枢纽链名称比较。
pub fn canonical_chain_name(name: &str) -> Option<&'static str> {
    lookup(name).map(|(known, _)| known)
}

pub fn native_asset_symbol(name: &str) -> &'static str {
    let canonical = canonical_chain_name(name).unwrap_or(name.trim());
    SPECIAL_NATIVES
        .iter()
        .find(|(chain, _)| *chain == canonical)
        .map(|(_, symbol)| *symbol)
        .unwrap_or(DEFAULT_NATIVE)
}

pub fn known_chains() -> impl Iterator<Item = ChainRef> {
    KNOWN_CHAINS.iter().map(|(name, id)| ChainRef {
        name,
        id: ChainId(*id),
    })
}
