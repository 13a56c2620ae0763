use crate::registry::{canonical_chain_name, native_asset_symbol};

use super::types::{Hop, RouteKind, RouteRequest};

/// 四种固定的路线形态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Direct,
    NativeBridge,
    ViaHubDirect,
    ViaHubWithNative,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Direct,
        Strategy::NativeBridge,
        Strategy::ViaHubDirect,
        Strategy::ViaHubWithNative,
    ];

    pub fn kind(self) -> RouteKind {
        match self {
            Strategy::Direct => RouteKind::Direct,
            Strategy::NativeBridge => RouteKind::NativeBridge,
            Strategy::ViaHubDirect => RouteKind::ViaBaseDirect,
            Strategy::ViaHubWithNative => RouteKind::ViaBaseWithNative,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Strategy::Direct => "Direct quote found.",
            Strategy::NativeBridge => "Swap to native, bridge, swap from native.",
            Strategy::ViaHubDirect => "Bridge to Base native, then to destination.",
            Strategy::ViaHubWithNative => "Swap to native → Base → dst native → final token",
        }
    }

    /// 结果被接受所需的最少成功跳数。
    pub fn min_hops(self) -> usize {
        match self {
            Strategy::Direct | Strategy::ViaHubDirect => 1,
            Strategy::NativeBridge => 2,
            Strategy::ViaHubWithNative => 3,
        }
    }

    fn uses_hub(self) -> bool {
        matches!(self, Strategy::ViaHubDirect | Strategy::ViaHubWithNative)
    }

    /// 生成跳序列；经中转链的策略在任一端点即为中转链时返回 `None`。
    pub fn plan(self, request: &RouteRequest, hub_chain: &str) -> Option<Vec<Hop>> {
        if self.uses_hub() && touches_hub(request, hub_chain) {
            return None;
        }

        let src_chain = request.src_chain.as_str();
        let dst_chain = request.dst_chain.as_str();
        let src_asset = request.src_asset.as_str();
        let dst_asset = request.dst_asset.as_str();
        let src_native = native_asset_symbol(src_chain);
        let dst_native = native_asset_symbol(dst_chain);
        let hub_native = native_asset_symbol(hub_chain);

        let hops = match self {
            Strategy::Direct => vec![Hop::new(src_chain, dst_chain, src_asset, dst_asset)],
            Strategy::NativeBridge => {
                let mut hops = Vec::with_capacity(3);
                if src_asset != src_native {
                    hops.push(Hop::new(src_chain, src_chain, src_asset, src_native));
                }
                hops.push(Hop::new(src_chain, dst_chain, src_native, dst_native));
                if dst_asset != dst_native {
                    hops.push(Hop::new(dst_chain, dst_chain, dst_native, dst_asset));
                }
                hops
            }
            Strategy::ViaHubDirect => vec![
                Hop::new(src_chain, hub_chain, src_asset, hub_native),
                Hop::new(hub_chain, dst_chain, hub_native, dst_asset),
            ],
            Strategy::ViaHubWithNative => {
                let mut hops = Vec::with_capacity(4);
                if src_asset != src_native {
                    hops.push(Hop::new(src_chain, src_chain, src_asset, src_native));
                }
                hops.push(Hop::new(src_chain, hub_chain, src_native, hub_native));
                hops.push(Hop::new(hub_chain, dst_chain, hub_native, dst_native));
                if dst_asset != dst_native {
                    hops.push(Hop::new(dst_chain, dst_chain, dst_native, dst_asset));
                }
                hops
            }
        };
        Some(hops)
    }
}

fn same_chain(left: &str, right: &str) -> bool {
    match (canonical_chain_name(left), canonical_chain_name(right)) {
        (Some(left), Some(right)) => left == right,
        _ => left == right,
    }
}

fn touches_hub(request: &RouteRequest, hub_chain: &str) -> bool {
    same_chain(&request.src_chain, hub_chain) || same_chain(&request.dst_chain, hub_chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::RouteOrder;

    fn request(src_chain: &str, dst_chain: &str, src_asset: &str, dst_asset: &str) -> RouteRequest {
        RouteRequest {
            src_chain: src_chain.to_string(),
            dst_chain: dst_chain.to_string(),
            src_asset: src_asset.to_string(),
            dst_asset: dst_asset.to_string(),
            amount: "100".parse().expect("amount"),
            order: RouteOrder::Cheapest,
        }
    }

    #[test]
    fn direct_is_single_hop() {
        let plan = Strategy::Direct
            .plan(&request("Ethereum", "Base", "USDC", "ETH"), "Base")
            .expect("plan");
        assert_eq!(plan, vec![Hop::new("Ethereum", "Base", "USDC", "ETH")]);
    }

    #[test]
    fn native_bridge_wraps_with_optional_swaps() {
        let plan = Strategy::NativeBridge
            .plan(&request("Solana", "Arbitrum", "USDC", "ARB"), "Base")
            .expect("plan");
        assert_eq!(
            plan,
            vec![
                Hop::new("Solana", "Solana", "USDC", "SOL"),
                Hop::new("Solana", "Arbitrum", "SOL", "ETH"),
                Hop::new("Arbitrum", "Arbitrum", "ETH", "ARB"),
            ]
        );

        let plan = Strategy::NativeBridge
            .plan(&request("Ethereum", "Base", "USDC", "ETH"), "Base")
            .expect("plan");
        assert_eq!(
            plan,
            vec![
                Hop::new("Ethereum", "Ethereum", "USDC", "ETH"),
                Hop::new("Ethereum", "Base", "ETH", "ETH"),
            ]
        );
    }

    #[test]
    fn native_to_native_plan_falls_below_minimum() {
        let plan = Strategy::NativeBridge
            .plan(&request("Ethereum", "Arbitrum", "ETH", "ETH"), "Base")
            .expect("plan");
        assert_eq!(plan.len(), 1);
        assert!(plan.len() < Strategy::NativeBridge.min_hops());
    }

    #[test]
    fn hub_strategies_route_through_hub() {
        let req = request("Solana", "Arbitrum", "USDC", "ARB");
        let direct = Strategy::ViaHubDirect.plan(&req, "Base").expect("plan");
        assert_eq!(
            direct,
            vec![
                Hop::new("Solana", "Base", "USDC", "ETH"),
                Hop::new("Base", "Arbitrum", "ETH", "ARB"),
            ]
        );
        let with_native = Strategy::ViaHubWithNative.plan(&req, "Base").expect("plan");
        assert_eq!(with_native.len(), 4);
        assert_eq!(with_native[1], Hop::new("Solana", "Base", "SOL", "ETH"));
        assert_eq!(with_native[2], Hop::new("Base", "Arbitrum", "ETH", "ETH"));
    }

    #[test]
    fn hub_strategies_skipped_when_endpoint_is_hub() {
        for req in [
            request("Ethereum", "Base", "USDC", "ETH"),
            request("base", "Arbitrum", "ETH", "ARB"),
        ] {
            assert!(Strategy::ViaHubDirect.plan(&req, "Base").is_none());
            assert!(Strategy::ViaHubWithNative.plan(&req, "Base").is_none());
            assert!(Strategy::Direct.plan(&req, "Base").is_some());
        }
    }

    #[test]
    fn configurable_hub_uses_its_native_asset() {
        let req = request("Ethereum", "Arbitrum", "USDC", "ARB");
        let plan = Strategy::ViaHubDirect.plan(&req, "Solana").expect("plan");
        assert_eq!(plan[0], Hop::new("Ethereum", "Solana", "USDC", "SOL"));
        assert!(Strategy::ViaHubDirect.plan(&req, "Arbitrum").is_none());
    }
}
