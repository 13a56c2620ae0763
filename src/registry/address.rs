use super::chains::ChainId;

const SUI_PLACEHOLDER: &str = "0xfd0c1c20e31915f318a219e04ba237b730d15f96a20d37835bff2041e2d1efd8";
const BITCOIN_PLACEHOLDER: &str = "bc1qf68dp726r5dta0nwfpldtcfug9c9dx4vygtw5j";
const SOLANA_PLACEHOLDER: &str = "FgkkFMTgYURGN9y6NsJKbnTWXBEb5UGHovf9ZhBQhEHZ";
const EVM_PLACEHOLDER: &str = "0xb29601eB52a052042FB6c68C69a442BD0AE90082";

/// 地址格式族。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFamily {
    Evm,
    Sui,
    Bitcoin,
    Solana,
}

impl AddressFamily {
    pub fn for_chain(chain: ChainId) -> Self {
        match chain {
            ChainId::SUI => AddressFamily::Sui,
            ChainId::BITCOIN => AddressFamily::Bitcoin,
            ChainId::SOLANA => AddressFamily::Solana,
            _ => AddressFamily::Evm,
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            AddressFamily::Evm => EVM_PLACEHOLDER,
            AddressFamily::Sui => SUI_PLACEHOLDER,
            AddressFamily::Bitcoin => BITCOIN_PLACEHOLDER,
            AddressFamily::Solana => SOLANA_PLACEHOLDER,
        }
    }

    /// 按格式族判断字符串是否像链上地址。
    pub fn matches(self, token: &str) -> bool {
        match self {
            AddressFamily::Evm => is_hex_address(token, 40),
            AddressFamily::Sui => is_hex_address(token, 64),
            AddressFamily::Bitcoin => {
                token.len() >= 14
                    && token.len() <= 74
                    && token
                        .get(..3)
                        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("bc1"))
                    && token.chars().all(|c| c.is_ascii_alphanumeric())
            }
            AddressFamily::Solana => {
                (32..=44).contains(&token.len())
                    && bs58::decode(token)
                        .into_vec()
                        .map(|bytes| bytes.len() == 32)
                        .unwrap_or(false)
            }
        }
    }
}

/// 报价接口要求的 from/to 地址；不是真实钱包，仅按链的地址格式取固定占位值。
pub fn default_address(chain: ChainId) -> &'static str {
    AddressFamily::for_chain(chain).placeholder()
}

/// 任一格式族匹配即视为地址，否则按代币符号处理。
pub fn looks_like_address(token: &str) -> bool {
    let token = token.trim();
    [
        AddressFamily::Evm,
        AddressFamily::Sui,
        AddressFamily::Bitcoin,
        AddressFamily::Solana,
    ]
    .into_iter()
    .any(|family| family.matches(token))
}

fn is_hex_address(token: &str, hex_len: usize) -> bool {
    token.len() == hex_len + 2
        && token.starts_with("0x")
        && token[2..].chars().all(|c| c.is_ascii_hexdigit())
}
