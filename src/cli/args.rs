use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_LIMIT: i64 = 50;

#[derive(Parser, Debug)]
#[command(
    name = "commit-critic",
    version,
    about = "Commit Critic - 用 AI 评估提交信息质量，并为暂存改动撰写 conventional commit",
    after_help = "示例:
  commit-critic --analyze                    分析当前仓库最近 50 条提交
  commit-critic --analyze --limit 100        分析最近 100 条提交
  commit-critic --analyze --url URL          分析远程仓库
  commit-critic --write                      为暂存改动撰写提交信息
  commit-critic --threads                    列出所有会话线程
  commit-critic --thread ID --write          继续指定线程
  commit-critic --clear-threads              清空所有线程

环境变量:
  ANTHROPIC_API_KEY    使用 anthropic 时必需
  OPENAI_API_KEY       使用 openai 时必需"
)]
pub struct Args {
    /// 分析仓库的提交历史
    #[arg(long, default_value_t = false)]
    pub analyze: bool,

    /// 交互式撰写暂存改动的提交信息
    #[arg(long, default_value_t = false)]
    pub write: bool,

    /// 远程仓库地址（仅 --analyze）
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// 分析的提交数量，会被限制在 1..=500
    #[arg(long, default_value_t = DEFAULT_LIMIT, allow_negative_numbers = true)]
    pub limit: i64,

    /// 不显示横幅
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,

    /// 继续已有的会话线程
    #[arg(long, value_name = "ID")]
    pub thread: Option<String>,

    /// 列出所有会话线程
    #[arg(long, default_value_t = false)]
    pub threads: bool,

    /// 清空线程历史（配合 --thread 只清除指定线程）
    #[arg(long = "clear-threads", default_value_t = false)]
    pub clear_threads: bool,

    /// 不调用模型，使用本地启发式评分
    #[arg(long, default_value_t = false)]
    pub offline: bool,

    /// 以 JSON 输出分析报告
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// 仓库路径（默认当前目录）
    #[arg(long, value_name = "PATH")]
    pub repo: Option<PathBuf>,

    /// AI provider to use (anthropic or openai)
    #[arg(short = 'P', long, default_value = "")] // 空字符串表示未指定
    pub provider: String,

    /// Model to use
    #[arg(short, long, default_value = "")] // 空字符串表示未指定
    pub model: String,

    /// 输出调试日志
    #[arg(long, default_value_t = false)]
    pub debug: bool,
}

/// 与 clap 的默认值保持一致
impl Default for Args {
    fn default() -> Self {
        Self {
            analyze: false,
            write: false,
            url: None,
            limit: DEFAULT_LIMIT,
            quiet: false,
            thread: None,
            threads: false,
            clear_threads: false,
            offline: false,
            json: false,
            repo: None,
            provider: String::new(),
            model: String::new(),
            debug: false,
        }
    }
}
