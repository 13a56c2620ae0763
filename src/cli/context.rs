use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use time::{UtcOffset, macros::format_description};
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::args::InitCmd;
use crate::config::{ConfigError, LoggingConfig, LoggingProfile, MeridianConfig, load_config};

const CONFIG_TEMPLATE: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/meridian.toml"));

/// 初始化 tracing，兼顾 JSON 与文本输出模式。
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = build_env_filter(config);

    let time_format =
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]");
    let offset = UtcOffset::from_hms(config.timezone_offset_hours, 0, 0).map_err(|err| {
        anyhow!(
            "invalid logging timezone offset {}: {err}",
            config.timezone_offset_hours
        )
    })?;
    let offset_timer = OffsetTime::new(offset, time_format);

    let base = fmt()
        .with_timer(offset_timer)
        .with_writer(std::io::stderr)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(true)
        .with_level(true);

    if config.json {
        base.json()
            .with_current_span(false)
            .with_span_list(false)
            .with_env_filter(filter)
            .try_init()
            .map_err(|err| anyhow!(err.to_string()))?;
    } else {
        base.with_env_filter(filter)
            .event_format(fmt::format().compact())
            .try_init()
            .map_err(|err| anyhow!(err.to_string()))?;
    }
    Ok(())
}

fn build_env_filter(config: &LoggingConfig) -> EnvFilter {
    let mut filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if matches!(config.profile, LoggingProfile::Lean) {
        const QUIET_TARGETS: &[(&str, &str)] = &[
            ("hyper", "warn"),
            ("hyper_util::client::legacy", "warn"),
            ("reqwest", "info"),
            ("rustls", "warn"),
        ];
        for (module, level) in QUIET_TARGETS {
            if !config.level.contains(module) {
                if let Ok(directive) = format!("{module}={level}").parse() {
                    filter = filter.add_directive(directive);
                }
            }
        }
    }

    if matches!(config.profile, LoggingProfile::Verbose) {
        const VERBOSE_TARGETS: &[(&str, &str)] = &[
            ("lifi::token", "debug"),
            ("lifi::quote", "debug"),
            ("routing::runner", "debug"),
            ("routing::evaluator", "debug"),
            ("monitoring::route", "debug"),
        ];
        for (module, level) in VERBOSE_TARGETS {
            if let Ok(directive) = format!("{module}={level}").parse() {
                filter = filter.add_directive(directive);
            }
        }
    }

    filter
}

/// 加载主配置；用于 `meridian --config` 的入口。
pub fn load_configuration(path: Option<PathBuf>) -> Result<MeridianConfig, ConfigError> {
    load_config(path)
}

/// 共享的 HTTP 客户端；单次调用的超时由 API 客户端按端点设置。
pub fn build_http_client(config: &MeridianConfig) -> Result<reqwest::Client> {
    let connect_timeout = Duration::from_millis(config.api.timeouts.token_ms.max(1_000));
    reqwest::Client::builder()
        .user_agent(concat!("meridian/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(connect_timeout)
        .pool_idle_timeout(Duration::from_secs(30))
        .build()
        .context("failed to build http client")
}

pub fn init_configs(args: InitCmd) -> Result<Vec<PathBuf>> {
    let output_dir = match args.output {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    fs::create_dir_all(&output_dir)
        .with_context(|| format!("无法创建目录 {}", output_dir.display()))?;

    let templates: [(&str, &str); 1] = [("meridian.toml", CONFIG_TEMPLATE)];

    let mut written = Vec::new();
    for (filename, contents) in templates {
        let target_path = output_dir.join(filename);
        if target_path.exists() && !args.force {
            println!(
                "跳过 {}（文件已存在，如需覆盖请加 --force）",
                target_path.display()
            );
            continue;
        }

        fs::write(&target_path, contents)
            .with_context(|| format!("写入 {} 失败", target_path.display()))?;
        println!("已写入 {}", target_path.display());
        written.push(target_path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses_into_defaults() {
        let config: MeridianConfig = toml::from_str(CONFIG_TEMPLATE).expect("template parses");
        assert_eq!(config.api.base_url, "https://li.quest/v1");
        assert_eq!(config.routing.hub_chain, "Base");
        assert_eq!(config.api.api_key_env, "LIFI_API_KEY");
    }

    #[test]
    fn init_respects_force_flag() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("meridian.toml");
        fs::write(&target, "# custom").expect("seed file");

        let written = init_configs(InitCmd {
            output: Some(dir.path().to_path_buf()),
            force: false,
        })
        .expect("init");
        assert!(written.is_empty());
        assert_eq!(fs::read_to_string(&target).unwrap(), "# custom");

        let written = init_configs(InitCmd {
            output: Some(dir.path().to_path_buf()),
            force: true,
        })
        .expect("init");
        assert_eq!(written, vec![target.clone()]);
        assert_eq!(fs::read_to_string(&target).unwrap(), CONFIG_TEMPLATE);
    }

    #[test]
    fn lean_profile_quiets_http_stack() {
        let config = LoggingConfig::default();
        let rendered = build_env_filter(&config).to_string();
        assert!(rendered.contains("hyper=warn"));
        assert!(rendered.contains("reqwest=info"));
    }
}
