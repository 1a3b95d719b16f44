use crate::ai::agents::{AgentManager, CommitSource};
use crate::cli::args::Args;
use crate::infrastructure::CriticResult;
use crate::models::{AnalysisReport, CloneResult};
use crate::ui;
use std::path::{Path, PathBuf};
use tracing::info;

/// 一次分析的结果
#[derive(Debug)]
pub enum AnalyzeOutcome {
    Report {
        report: AnalysisReport,
        /// 远程仓库的克隆位置
        clone: Option<CloneResult>,
    },
    /// 克隆或读取历史失败
    FetchFailed(String),
}

/// 读取提交并评分
pub async fn analyze_repository(
    manager: &AgentManager,
    thread_id: &str,
    repo_path: &Path,
    url: Option<&str>,
    limit: i64,
) -> CriticResult<AnalyzeOutcome> {
    let source = match url {
        Some(url) => CommitSource::Remote(url.to_string()),
        None => CommitSource::Local(repo_path.to_path_buf()),
    };

    let (list, clone) = manager.fetch_commits(thread_id, source, limit).await?;
    if let Some(error) = list.error {
        return Ok(AnalyzeOutcome::FetchFailed(error));
    }

    info!("Fetched {} commits", list.commits.len());
    let analyses = if list.commits.is_empty() {
        Vec::new()
    } else {
        manager.analyze_commits(thread_id, list.commits).await?
    };

    Ok(AnalyzeOutcome::Report {
        report: AnalysisReport::from_analyses(analyses),
        clone,
    })
}

/// `--analyze`
pub async fn run(args: &Args, manager: &AgentManager, thread_id: &str, repo_path: PathBuf) -> anyhow::Result<i32> {
    let url = args.url.as_deref().map(str::trim).filter(|u| !u.is_empty());

    if !args.json {
        match url {
            Some(url) => println!("\n分析远程仓库: {}", url),
            None => println!("\n分析本地仓库: {}", repo_path.display()),
        }
        println!("读取最近 {} 条提交...\n", crate::git::clamp_limit(args.limit));
    }

    let outcome = match analyze_repository(manager, thread_id, &repo_path, url, args.limit).await {
        Ok(outcome) => outcome,
        Err(e) => return Ok(super::report_failure(&e)),
    };

    match outcome {
        AnalyzeOutcome::FetchFailed(error) => {
            eprintln!("❌ {}", error);
            Ok(0)
        }
        AnalyzeOutcome::Report { report, clone } => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(0);
            }
            if let Some(path) = clone.as_ref().and_then(|c| c.repo_path.as_ref()) {
                println!("克隆位置: {}\n", path.display());
            }
            print!("{}", ui::render_report(&report));
            println!("\nThread ID: {}", thread_id);
            Ok(0)
        }
    }
}
