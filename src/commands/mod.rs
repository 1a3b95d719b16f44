pub mod analyze;
pub mod threads;
pub mod write;

pub use analyze::{analyze_repository, AnalyzeOutcome};
pub use write::{write_commit, WriteOutcome};

use crate::ai::agents::{AgentContext, AgentManager};
use crate::ai::provider::ProviderFactory;
use crate::cli::args::Args;
use crate::config::Config;
use crate::infrastructure::CriticError;
use crate::storage::{get_or_create_thread_id, open_thread_store};
use crate::ui;
use std::path::PathBuf;

/// 打印运行中的错误并给出退出码
///
/// 只有配置错误返回 1，其余失败照常结束。
pub(crate) fn report_failure(err: &CriticError) -> i32 {
    eprintln!("❌ {}", err);
    if err.is_retryable() {
        eprintln!("服务暂时不可用或返回格式有误，可以稍后重试。");
    }
    if err.is_fatal() {
        1
    } else {
        0
    }
}

/// 命令路由器，返回进程退出码
///
/// 顺序：`--threads`、`--clear-threads`、模式检查、凭据检查，最后才建立 agent。
pub async fn route_command(args: &Args, config: &Config) -> anyhow::Result<i32> {
    if args.threads {
        let store = open_thread_store(config).await;
        return threads::list_threads(store.as_ref(), config).await;
    }

    if args.clear_threads {
        let store = open_thread_store(config).await;
        return threads::clear_threads(store.as_ref(), args.thread.as_deref()).await;
    }

    if !args.analyze && !args.write {
        eprintln!("Please specify --analyze, --write, or --threads (see --help)");
        return Ok(1);
    }

    let offline = args.analyze && args.offline;
    if !offline {
        if let Err(e) = config.validate() {
            eprintln!("Error: {}", e);
            if config.validate_provider().is_ok() {
                eprintln!("Set it with: export {}=...", config.api_key_var());
            }
            return Ok(1);
        }
    }

    if !args.quiet && !args.json {
        ui::print_banner();
    }

    let repo_path = match &args.repo {
        Some(path) => path.clone(),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };

    let provider = if offline {
        None
    } else {
        Some(ProviderFactory::create(&config.provider)?)
    };
    let context = AgentContext::new(provider, config.provider_config(), config.max_retries);
    let store = open_thread_store(config).await;
    let manager = AgentManager::with_default_agents(context, store);
    let thread_id = get_or_create_thread_id(args.thread.as_deref());
    tracing::debug!("Using thread {}", thread_id);

    if args.analyze {
        analyze::run(args, &manager, &thread_id, repo_path).await
    } else {
        write::run(&manager, &thread_id, &repo_path, ui::LinePrompter::stdin()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    fn isolated_config(home: &TempDir) -> Config {
        Config {
            anthropic_api_key: Some("sk-ant-test".into()),
            home_dir: home.path().to_path_buf(),
            ..Config::defaults()
        }
    }

    #[tokio::test]
    async fn test_offline_analyze_outside_repo_exits_with_zero() {
        let home = TempDir::new().unwrap();
        let not_a_repo = TempDir::new().unwrap();
        let args = Args {
            analyze: true,
            offline: true,
            quiet: true,
            repo: Some(not_a_repo.path().to_path_buf()),
            ..Args::default()
        };
        assert_eq!(route_command(&args, &isolated_config(&home)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_write_outside_repo_exits_with_zero() {
        let home = TempDir::new().unwrap();
        let not_a_repo = TempDir::new().unwrap();
        let args = Args {
            write: true,
            quiet: true,
            repo: Some(not_a_repo.path().to_path_buf()),
            ..Args::default()
        };
        assert_eq!(route_command(&args, &isolated_config(&home)).await.unwrap(), 0);
    }

    #[test]
    fn test_only_configuration_failures_exit_with_one() {
        assert_eq!(report_failure(&CriticError::provider("anthropic", "503 Service Unavailable", true)), 0);
        assert_eq!(report_failure(&CriticError::malformed("analyze_commits", "not json")), 0);
        assert_eq!(report_failure(&CriticError::tool("git log", "not a git repository")), 0);
        assert_eq!(report_failure(&CriticError::config("ANTHROPIC_API_KEY environment variable not set.")), 1);
    }

    #[tokio::test]
    async fn test_no_mode_exits_with_one() {
        let args = Args::default();
        assert_eq!(route_command(&args, &Config::defaults()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_api_key_exits_with_one() {
        let args = Args {
            write: true,
            quiet: true,
            ..Args::default()
        };
        let config = Config {
            provider: "anthropic".into(),
            anthropic_api_key: None,
            ..Config::defaults()
        };
        assert_eq!(route_command(&args, &config).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unknown_provider_exits_with_one() {
        let args = Args {
            analyze: true,
            quiet: true,
            ..Args::default()
        };
        let config = Config {
            provider: "ollama".into(),
            ..Config::defaults()
        };
        assert_eq!(route_command(&args, &config).await.unwrap(), 1);
    }
}
