use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::api::{AggregatorApi, LifiApiClient};
use crate::cli::args::{Cli, Command, RouteCmd};
use crate::cli::context::{build_http_client, init_configs};
use crate::config::MeridianConfig;
use crate::monitoring::format::short_token;
use crate::registry::{known_chains, native_asset_symbol};
use crate::routing::{Candidate, Evaluation, HopResult, RouteEvaluator, RouteRequest};

pub const NO_ROUTE_MESSAGE: &str = "No valid route found.";

pub async fn run(cli: Cli, config: MeridianConfig) -> Result<()> {
    if crate::monitoring::init_from_config(&config.prometheus)? {
        info!(
            target: "monitoring",
            listen = %config.prometheus.listen,
            "Prometheus exporter 已启动"
        );
    }

    dispatch(cli.command, config).await
}

async fn dispatch(command: Command, config: MeridianConfig) -> Result<()> {
    match command {
        Command::Route(cmd) => run_route(cmd, &config).await?,
        Command::Chains => print!("{}", render_chains()),
        Command::Init(args) => {
            init_configs(args)?;
        }
    }
    Ok(())
}

async fn run_route(cmd: RouteCmd, config: &MeridianConfig) -> Result<()> {
    let api_key = config.api.resolve_api_key();
    if api_key.is_none() {
        warn!(
            target: "lifi",
            env = %config.api.api_key_env,
            "未配置 LI.FI API key，将以匿名额度请求"
        );
    }

    let http = build_http_client(config)?;
    let client = LifiApiClient::new(http, &config.api, api_key.as_ref(), &config.global.logging)
        .context("failed to build LI.FI client")?;
    let api: Arc<dyn AggregatorApi> = Arc::new(client);
    let evaluator = RouteEvaluator::from_config(api, &config.api, &config.routing)
        .with_context(|| format!("invalid api.link_base: {}", config.api.link_base))?;

    let request = RouteRequest {
        src_chain: cmd.from_chain,
        dst_chain: cmd.to_chain,
        src_asset: cmd.from_token,
        dst_asset: cmd.to_token,
        amount: cmd.amount,
        order: cmd
            .order
            .map(Into::into)
            .unwrap_or(config.routing.default_order),
    };

    let spinner = (!cmd.json).then(|| evaluating_spinner(&request));
    let evaluation = evaluator.evaluate(request).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    if cmd.json {
        let rendered =
            serde_json::to_string_pretty(&evaluation).context("failed to encode evaluation")?;
        println!("{rendered}");
    } else {
        print!("{}", render_evaluation(&evaluation));
    }
    Ok(())
}

fn evaluating_spinner(request: &RouteRequest) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(format!(
        "评估路线 {} {} -> {} {}",
        request.src_chain,
        short_token(&request.src_asset),
        request.dst_chain,
        short_token(&request.dst_asset)
    ));
    pb
}

pub fn render_evaluation(evaluation: &Evaluation) -> String {
    let Some(best) = evaluation.best() else {
        return format!("{NO_ROUTE_MESSAGE}\n");
    };

    let mut out = String::new();
    let _ = writeln!(out, "Best Route");
    render_candidate(&mut out, best);

    let alternatives = evaluation.alternatives();
    if !alternatives.is_empty() {
        let _ = writeln!(out, "\nAlternative Routes");
        for alt in alternatives {
            let _ = writeln!(
                out,
                "- {} (efficiency {}): {}",
                alt.candidate.kind, alt.efficiency, alt.candidate.description
            );
            for (index, step) in alt.candidate.route.steps.iter().enumerate() {
                let _ = writeln!(out, "    {}", render_step_line(index + 1, step));
            }
        }
    }
    out
}

fn render_candidate(out: &mut String, candidate: &Candidate) {
    let route = &candidate.route;
    let _ = writeln!(out, "  Type: {}", candidate.kind);
    let _ = writeln!(out, "  Description: {}", candidate.description);
    for (index, step) in route.steps.iter().enumerate() {
        let _ = writeln!(out, "  {}", render_step_line(index + 1, step));
        let _ = writeln!(out, "      link: {}", step.link);
    }
    let final_usd = route
        .final_amount_usd
        .map(|usd| format!("${}", usd.round_dp(2)))
        .unwrap_or_else(|| "N/A".to_string());
    let _ = writeln!(out, "  Final amount (USD): {final_usd}");
    let _ = writeln!(out, "  Total time: {}s", route.total_time_seconds);
    let _ = writeln!(
        out,
        "  Cumulative efficiency: {}",
        route.cumulative_efficiency
    );
}

fn render_step_line(position: usize, step: &HopResult) -> String {
    let efficiency = step
        .efficiency
        .map(|eff| format!("{:.4}%", (eff * Decimal::ONE_HUNDRED).round_dp(4)))
        .unwrap_or_else(|| "N/A".to_string());
    format!(
        "Step {position} - {}: {} {} -> {} {} (chain {} -> {}), efficiency {efficiency}, {}s",
        step.tool,
        step.from_amount.normalize(),
        short_token(&step.from_token),
        step.expected_amount.normalize(),
        short_token(&step.to_token),
        step.from_chain,
        step.to_chain,
        step.execution_time_seconds
    )
}

fn render_chains() -> String {
    let mut out = String::new();
    for chain in known_chains() {
        let _ = writeln!(
            out,
            "{:<20} {:>20}  {}",
            chain.name,
            chain.id,
            native_asset_symbol(chain.name)
        );
    }
    out
}
