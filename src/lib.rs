//! meridian：多策略跨链兑换路线评估。
//!
//! 入口为 [`routing::RouteEvaluator::evaluate`]，报价来自 LI.FI 聚合器。

pub mod api;
pub mod cli;
pub mod config;
pub mod monitoring;
pub mod registry;
pub mod routing;
