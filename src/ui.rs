//! 终端界面：报告、建议和确认交互
//!
//! 渲染函数只返回字符串，由调用方决定输出位置。

use crate::infrastructure::{CriticError, CriticResult};
use crate::models::{AnalysisReport, CommitAnalysis, CommitResult, RepoInfo, SuggestedCommit};
use crate::storage::ThreadSummary;
use crate::workflow::Prompter;
use std::fmt::Write as _;
use std::io::{self, BufRead, Write};
use std::path::Path;

const RULE: &str = "────────────────────────────────────────────────────────────";

pub fn banner() -> String {
    format!(
        "{rule}\n  COMMIT CRITIC  ·  AI-powered commit message analyzer\n{rule}",
        rule = RULE
    )
}

pub fn print_banner() {
    println!("{}", banner());
}

fn push_analysis(out: &mut String, analysis: &CommitAnalysis) {
    let _ = writeln!(out, "  {}  \"{}\"  ({}/10)", analysis.hash, analysis.message, analysis.score);
    if let Some(issue) = &analysis.issue {
        let _ = writeln!(out, "     问题: {}", issue);
    }
    if let Some(suggestion) = &analysis.suggestion {
        let _ = writeln!(out, "     建议: {}", suggestion);
    }
    if let Some(why_good) = &analysis.why_good {
        let _ = writeln!(out, "     优点: {}", why_good);
    }
}

/// 分析报告的文本形式
pub fn render_report(report: &AnalysisReport) -> String {
    let mut out = String::new();

    if report.total_commits == 0 {
        out.push_str("没有可分析的提交。\n");
        return out;
    }

    if !report.needs_work.is_empty() {
        let _ = writeln!(out, "❌ 需要改进 ({})", report.needs_work.len());
        let _ = writeln!(out, "{}", RULE);
        for analysis in &report.needs_work {
            push_analysis(&mut out, analysis);
        }
        out.push('\n');
    }

    if !report.acceptable.is_empty() {
        let _ = writeln!(out, "⚠️  尚可 ({})", report.acceptable.len());
        let _ = writeln!(out, "{}", RULE);
        for analysis in &report.acceptable {
            push_analysis(&mut out, analysis);
        }
        out.push('\n');
    }

    if !report.excellent.is_empty() {
        let _ = writeln!(out, "✅ 写得好 ({})", report.excellent.len());
        let _ = writeln!(out, "{}", RULE);
        for analysis in &report.excellent {
            push_analysis(&mut out, analysis);
        }
        out.push('\n');
    }

    let _ = writeln!(out, "📊 统计");
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "  提交总数:   {}", report.total_commits);
    let _ = writeln!(out, "  平均分:     {:.1}/10", report.average_score);
    for (label, count) in [
        ("需要改进", report.needs_work_count),
        ("尚可", report.acceptable_count),
        ("写得好", report.excellent_count),
        ("含糊", report.vague_count),
        ("单个词", report.one_word_count),
        ("无 scope", report.no_scope_count),
    ] {
        let _ = writeln!(out, "  {:<10} {} ({:.0}%)", label, count, report.percentage(count));
    }
    out
}

/// 暂存区的建议提交信息
pub fn render_suggestion(suggestion: &SuggestedCommit, revision: usize) -> String {
    let mut out = String::new();
    if revision == 0 {
        out.push_str("🤖 建议的提交信息:\n");
    } else {
        let _ = writeln!(out, "🤖 修改后的提交信息 (第 {} 次修改):", revision);
    }
    let _ = writeln!(out, "{}", RULE);
    for line in suggestion.full_message().lines() {
        let _ = writeln!(out, "  {}", line);
    }
    let _ = writeln!(out, "{}", RULE);
    out
}

pub fn render_options() -> &'static str {
    "选项:
  y/yes     接受并提交
  r/revise  给出修改意见
  c/custom  输入自己的提交信息
  n/no      取消，不提交"
}

pub fn render_commit_result(result: &CommitResult) -> String {
    if result.success {
        let mut out = String::from("✅ 提交成功\n");
        if let Some(output) = result.output.as_deref().filter(|o| !o.trim().is_empty()) {
            let _ = writeln!(out, "{}", output.trim_end());
        }
        out
    } else {
        format!("❌ 提交失败: {}\n", result.error.as_deref().unwrap_or("unknown error"))
    }
}

pub fn render_repo_info(info: &RepoInfo) -> String {
    format!(
        "仓库: {}\n分支: {}\n远程: {}\n",
        info.repo_path.display(),
        info.branch,
        info.remote
    )
}

/// `--threads` 的输出
pub fn render_threads(threads: &[ThreadSummary], persistent: bool, db_path: &Path) -> String {
    let mut out = String::new();
    if !persistent {
        out.push_str("⚠️  线程持久化不可用，本次运行使用内存存储。\n");
    }
    if threads.is_empty() {
        out.push_str("No conversation threads found.\n");
        if persistent {
            let _ = writeln!(out, "Checkpoint DB: {}", db_path.display());
        }
        return out;
    }

    let _ = writeln!(out, "Conversation Threads ({} total)", threads.len());
    let _ = writeln!(out, "Stored in: {}\n", db_path.display());
    for thread in threads {
        let _ = writeln!(
            out,
            "  • {}  {} turns  {}",
            thread.thread_id,
            thread.turn_count,
            thread.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    out.push_str("\nUse --thread <id> to continue a conversation\n");
    out
}

/// 按行读取用户输入的 `Prompter`
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl LinePrompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn ask(&mut self, question: &str) -> CriticResult<String> {
        if !question.is_empty() {
            writeln!(self.output, "{}", question).map_err(io_error)?;
        }
        write!(self.output, "> ").map_err(io_error)?;
        self.output.flush().map_err(io_error)?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line).map_err(io_error)?;
        if read == 0 {
            return Err(CriticError::tool("stdin", "input closed"));
        }
        Ok(line.trim().to_string())
    }
}

fn io_error(err: io::Error) -> CriticError {
    CriticError::tool("terminal", err.to_string())
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn present(&mut self, suggestion: &SuggestedCommit, revision: usize) {
        let _ = writeln!(self.output, "\n{}\n{}\n", render_suggestion(suggestion, revision), render_options());
    }

    fn choose(&mut self) -> CriticResult<String> {
        self.ask("")
    }

    fn feedback(&mut self) -> CriticResult<String> {
        self.ask("需要怎么修改？")
    }

    fn custom_message(&mut self) -> CriticResult<String> {
        self.ask("输入提交信息:")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Commit, CommitType};
    use chrono::Utc;
    use std::io::Cursor;

    #[test]
    fn test_line_prompter_trims_input_and_reports_eof() {
        let mut prompter = LinePrompter::new(Cursor::new("  r \nshorter please\n"), Vec::new());
        assert_eq!(prompter.choose().unwrap(), "r");
        assert_eq!(prompter.feedback().unwrap(), "shorter please");
        assert!(prompter.custom_message().is_err());

        let output = String::from_utf8(prompter.into_output()).unwrap();
        assert!(output.contains("需要怎么修改？"));
    }

    #[test]
    fn test_present_shows_options() {
        let mut prompter = LinePrompter::new(Cursor::new(""), Vec::new());
        let suggestion = SuggestedCommit::new(CommitType::Docs, None, "fix typo in readme", None);
        prompter.present(&suggestion, 0);
        let output = String::from_utf8(prompter.into_output()).unwrap();
        assert!(output.contains("docs: fix typo in readme"));
        assert!(output.contains("r/revise"));
    }

    #[test]
    fn test_render_report_sections() {
        let analyses = vec![
            CommitAnalysis::needs_improvement(&Commit::new("abc12345", "fix", ""), 1, "Single word", "fix(ui): x")
                .unwrap(),
            CommitAnalysis::praised(&Commit::new("def67890", "feat(api): add cache", ""), 8, "Clear").unwrap(),
        ];
        let text = render_report(&AnalysisReport::from_analyses(analyses));
        assert!(text.contains("需要改进 (1)"));
        assert!(text.contains("写得好 (1)"));
        assert!(text.contains("提交总数:   2"));
        assert!(!text.contains("尚可 ("));
    }

    #[test]
    fn test_render_threads() {
        let db = Path::new("/tmp/checkpoints.db");
        assert!(render_threads(&[], true, db).contains("No conversation threads found."));
        assert!(render_threads(&[], false, db).contains("持久化不可用"));

        let threads = vec![ThreadSummary {
            thread_id: "thread_0123456789ab".into(),
            turn_count: 4,
            updated_at: Utc::now(),
        }];
        let text = render_threads(&threads, true, db);
        assert!(text.contains("(1 total)"));
        assert!(text.contains("thread_0123456789ab  4 turns"));
    }

    #[test]
    fn test_render_commit_result() {
        assert!(render_commit_result(&CommitResult::failed("nothing to commit")).contains("nothing to commit"));
        assert!(render_commit_result(&CommitResult::committed("docs: x", "[main abc] docs: x".into()))
            .contains("[main abc]"));
    }
}
