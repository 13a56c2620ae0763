use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::registry::ChainId;

/// 传给聚合器的排序提示；评估器自身始终按效率选优。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RouteOrder {
    #[default]
    #[serde(alias = "cheapest")]
    Cheapest,
    #[serde(alias = "fastest")]
    Fastest,
}

impl RouteOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteOrder::Cheapest => "CHEAPEST",
            RouteOrder::Fastest => "FASTEST",
        }
    }
}

impl fmt::Display for RouteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一次评估的输入。
#[derive(Debug, Clone)]
pub struct RouteRequest {
    pub src_chain: String,
    pub dst_chain: String,
    pub src_asset: String,
    pub dst_asset: String,
    pub amount: Decimal,
    pub order: RouteOrder,
}

/// 单跳请求：链名称 + 代币符号或地址。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hop {
    pub source_chain: String,
    pub dest_chain: String,
    pub source_asset: String,
    pub dest_asset: String,
}

impl Hop {
    pub fn new(
        source_chain: impl Into<String>,
        dest_chain: impl Into<String>,
        source_asset: impl Into<String>,
        dest_asset: impl Into<String>,
    ) -> Self {
        Self {
            source_chain: source_chain.into(),
            dest_chain: dest_chain.into(),
            source_asset: source_asset.into(),
            dest_asset: dest_asset.into(),
        }
    }
}

impl fmt::Display for Hop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{} -> {}@{}",
            self.source_asset, self.source_chain, self.dest_asset, self.dest_chain
        )
    }
}

/// 代币解析结果。`decimals` 缺失时金额按原始整数处理。
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAsset {
    pub address: String,
    pub decimals: Option<u8>,
    pub price_usd: Option<Decimal>,
}

/// 单跳报价的归一化结果。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HopResult {
    pub tool: String,
    pub from_chain: ChainId,
    pub to_chain: ChainId,
    pub from_token: String,
    pub to_token: String,
    pub from_amount: Decimal,
    pub expected_amount: Decimal,
    pub efficiency: Option<Decimal>,
    pub execution_time_seconds: f64,
    pub link: String,
}

/// 路线累计效率，保存为展示字符串（`"99.1234%"`、`"N/A"`、`"0%"`）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EfficiencyPercent(String);

impl EfficiencyPercent {
    pub const NOT_AVAILABLE: &'static str = "N/A";

    /// `usd_out / usd_in * 100`，保留四位小数；任一侧缺失或为零时为 `N/A`。
    pub fn from_usd(usd_in: Option<Decimal>, usd_out: Option<Decimal>) -> Self {
        match (usd_in, usd_out) {
            (Some(usd_in), Some(usd_out)) if !usd_in.is_zero() && !usd_out.is_zero() => {
                match usd_out
                    .checked_mul(Decimal::ONE_HUNDRED)
                    .and_then(|scaled| scaled.checked_div(usd_in))
                {
                    Some(percent) => Self::from_percent(percent, 4),
                    None => Self::not_available(),
                }
            }
            _ => Self::not_available(),
        }
    }

    pub fn from_percent(percent: Decimal, dp: u32) -> Self {
        let rounded = percent.round_dp(dp);
        Self(format!("{rounded:.prec$}%", prec = dp as usize))
    }

    pub fn not_available() -> Self {
        Self(Self::NOT_AVAILABLE.to_string())
    }

    pub fn zero() -> Self {
        Self("0%".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 用于排序的数值；无法解析（含 `N/A`）时记为 0。
    pub fn value(&self) -> Decimal {
        self.0
            .trim()
            .trim_end_matches('%')
            .trim()
            .parse::<Decimal>()
            .unwrap_or(Decimal::ZERO)
    }
}

impl fmt::Display for EfficiencyPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 全部跳成功时的路线结果。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResult {
    pub steps: Vec<HopResult>,
    #[serde(rename = "finalAmountUSD")]
    pub final_amount_usd: Option<Decimal>,
    pub total_time_seconds: f64,
    pub cumulative_efficiency: EfficiencyPercent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    Direct,
    NativeBridge,
    ViaBaseDirect,
    ViaBaseWithNative,
    Unavailable,
}

impl RouteKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteKind::Direct => "direct",
            RouteKind::NativeBridge => "native_bridge",
            RouteKind::ViaBaseDirect => "via_base_direct",
            RouteKind::ViaBaseWithNative => "via_base_with_native",
            RouteKind::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    #[serde(rename = "type")]
    pub kind: RouteKind,
    pub description: String,
    #[serde(flatten)]
    pub route: RouteResult,
}

impl Candidate {
    pub fn new(kind: RouteKind, description: impl Into<String>, route: RouteResult) -> Self {
        Self {
            kind,
            description: description.into(),
            route,
        }
    }

    pub fn unavailable() -> Self {
        Self::new(
            RouteKind::Unavailable,
            "No available route found.",
            RouteResult {
                steps: Vec::new(),
                final_amount_usd: Some(Decimal::ZERO),
                total_time_seconds: 0.0,
                cumulative_efficiency: EfficiencyPercent::zero(),
            },
        )
    }

    pub fn efficiency_value(&self) -> Decimal {
        self.route.cumulative_efficiency.value()
    }
}

/// 非最优候选，附带两位小数的效率字符串。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alternative {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub efficiency: EfficiencyPercent,
}

impl From<Candidate> for Alternative {
    fn from(candidate: Candidate) -> Self {
        let efficiency = EfficiencyPercent::from_percent(candidate.efficiency_value(), 2);
        Self {
            candidate,
            efficiency,
        }
    }
}

/// 一次评估的输出。序列化时 `Found` 带 `best`/`alternatives` 键，
/// `Unavailable` 直接展开为 unavailable 候选，不含 `best` 键。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Evaluation {
    Found {
        best: Candidate,
        alternatives: Vec<Alternative>,
    },
    Unavailable(Candidate),
}

impl Evaluation {
    pub fn best(&self) -> Option<&Candidate> {
        match self {
            Evaluation::Found { best, .. } => Some(best),
            Evaluation::Unavailable(_) => None,
        }
    }

    pub fn alternatives(&self) -> &[Alternative] {
        match self {
            Evaluation::Found { alternatives, .. } => alternatives,
            Evaluation::Unavailable(_) => &[],
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Evaluation::Found { .. })
    }
}
