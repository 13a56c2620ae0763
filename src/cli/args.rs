use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;

use crate::routing::RouteOrder;

#[derive(Parser, Debug)]
#[command(name = "meridian", version, about = "跨链兑换路线评估工具（基于 LI.FI 报价）")]
pub struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "配置文件路径（默认查找 meridian.toml 或 config/meridian.toml）"
    )]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 评估一次跨链兑换的全部候选路线
    Route(RouteCmd),
    /// 列出支持的链及其原生资产
    Chains,
    /// 初始化配置模版文件
    Init(InitCmd),
}

#[derive(Args, Debug)]
pub struct RouteCmd {
    #[arg(long, value_name = "CHAIN", help = "源链名称，例如 Ethereum")]
    pub from_chain: String,
    #[arg(long, value_name = "CHAIN", help = "目标链名称，例如 Base")]
    pub to_chain: String,
    #[arg(long, value_name = "TOKEN", help = "源代币符号或地址")]
    pub from_token: String,
    #[arg(long, value_name = "TOKEN", help = "目标代币符号或地址")]
    pub to_token: String,
    #[arg(long, help = "发送数量（人类可读单位，例如 100 或 0.5）")]
    pub amount: Decimal,
    #[arg(long, value_enum, help = "上游排序偏好，缺省取配置 routing.default_order")]
    pub order: Option<OrderArg>,
    #[arg(long, help = "以 JSON 输出评估结果")]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OrderArg {
    Cheapest,
    Fastest,
}

impl From<OrderArg> for RouteOrder {
    fn from(value: OrderArg) -> Self {
        match value {
            OrderArg::Cheapest => RouteOrder::Cheapest,
            OrderArg::Fastest => RouteOrder::Fastest,
        }
    }
}

#[derive(Args, Debug)]
pub struct InitCmd {
    #[arg(long, value_name = "DIR", help = "可选输出目录（默认当前目录）")]
    pub output: Option<PathBuf>,
    #[arg(long, help = "若文件存在则覆盖")]
    pub force: bool,
}
