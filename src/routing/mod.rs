//! 跨链路线评估：代币解析、单跳报价、多跳执行、策略规划与并发择优。

pub mod error;
pub mod evaluator;
pub mod planner;
pub mod quoter;
pub mod resolver;
pub mod runner;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{RoutingError, RoutingResult};
pub use evaluator::{RouteEvaluator, rank_candidates};
pub use planner::Strategy;
pub use quoter::{HopQuoter, PreparedHop};
pub use resolver::{AssetResolver, convert_amount, scale_down};
pub use runner::MultiHopRunner;
pub use types::*;
