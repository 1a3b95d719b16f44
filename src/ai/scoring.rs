//! 提交信息评分细则的本地近似
//!
//! 四个维度：clarity (0-3)、context (0-3)、format (0-2)、scope (0-2)，总分最低为 1。
//! 报告里的 vague / one-word / no-scope 计数和 `--offline` 模式都基于这里的结果。

use crate::ai::validation::CONVENTIONAL_HEADER;
use crate::infrastructure::CriticResult;
use crate::models::{Category, Commit, CommitAnalysis, CommitType};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// `type(scope):` 中显式的 scope
static EXPLICIT_SCOPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]+\([^()\s]+\)!?:").unwrap());

/// `word:` / `path/to:` 形式的前缀
static AREA_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w./-]+(\([^()]*\))?!?:\s*").unwrap());

/// 不说明改了什么的词
const VAGUE_WORDS: &[&str] = &[
    "fix", "fixes", "fixed", "fixing", "wip", "update", "updates", "updated", "change", "changes", "changed",
    "stuff", "misc", "tweak", "tweaks", "cleanup", "minor", "bug", "bugs", "code", "things", "commit", "temp",
    "tmp", "more", "some", "small", "various", "work", "done", "final", "again", "it", "this", "the", "a",
];

const CONTEXT_MINIMAL_CHARS: usize = 40;
const CONTEXT_FULL_CHARS: usize = 120;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RubricScore {
    pub clarity: u8,
    pub context: u8,
    pub format: u8,
    pub scope: u8,
}

impl RubricScore {
    pub fn total(&self) -> u8 {
        (self.clarity + self.context + self.format + self.scope).max(1)
    }

    pub fn category(&self) -> Category {
        // total() 落在 1..=10
        match self.total() {
            1..=3 => Category::NeedsWork,
            4..=6 => Category::Acceptable,
            _ => Category::Excellent,
        }
    }

    pub fn is_vague(&self) -> bool {
        self.clarity <= 1
    }

    fn problems(&self) -> Vec<&'static str> {
        let mut problems = Vec::new();
        match self.clarity {
            0 => problems.push("Single word - no indication of what changed"),
            1 => problems.push("Vague description of the change"),
            _ => {}
        }
        if self.format == 0 {
            problems.push("No conventional commit structure");
        }
        if self.scope == 0 {
            problems.push("No indication of the affected area");
        }
        if self.context == 0 {
            problems.push("No body explaining why the change was made");
        }
        problems
    }

    fn strengths(&self) -> Vec<&'static str> {
        let mut strengths = Vec::new();
        if self.format == 2 {
            strengths.push("conventional type");
        }
        if self.scope == 2 {
            strengths.push("explicit scope");
        }
        if self.clarity == 3 {
            strengths.push("specific subject");
        }
        if self.context >= 2 {
            strengths.push("body explains the change");
        }
        strengths
    }
}

/// 主题行去掉 `type(scope):` 前缀后的描述部分
fn description(subject: &str) -> &str {
    match AREA_PREFIX.find(subject) {
        Some(m) => subject[m.end()..].trim(),
        None => subject.trim(),
    }
}

fn words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

pub fn is_one_word(message: &str) -> bool {
    message.split_whitespace().count() == 1
}

fn score_clarity(subject: &str) -> u8 {
    if subject.split_whitespace().count() <= 1 {
        return 0;
    }
    let words = words(description(subject));
    let all_vague = words.iter().all(|w| VAGUE_WORDS.contains(&w.as_str()));
    match words.len() {
        _ if all_vague => 1,
        0..=2 => 1,
        3..=4 => 2,
        _ => 3,
    }
}

fn score_context(body: &str) -> u8 {
    match body.trim().chars().count() {
        0 => 0,
        n if n < CONTEXT_MINIMAL_CHARS => 1,
        n if n < CONTEXT_FULL_CHARS => 2,
        _ => 3,
    }
}

fn score_format(subject: &str) -> u8 {
    if CONVENTIONAL_HEADER.is_match(subject) {
        return 2;
    }
    let capitalised = subject.chars().next().is_some_and(char::is_uppercase) && subject.split_whitespace().count() > 1;
    if AREA_PREFIX.is_match(subject) || capitalised {
        1
    } else {
        0
    }
}

fn score_scope(subject: &str) -> u8 {
    if EXPLICIT_SCOPE.is_match(subject) {
        return 2;
    }
    let path_like = description(subject)
        .split_whitespace()
        .any(|w| w.contains('/') || w.contains("::"));
    if AREA_PREFIX.is_match(subject) || path_like {
        1
    } else {
        0
    }
}

/// 按细则给一条提交信息打分
pub fn heuristic_score(subject: &str, body: &str) -> RubricScore {
    let subject = subject.trim();
    RubricScore {
        clarity: score_clarity(subject),
        context: score_context(body),
        format: score_format(subject),
        scope: score_scope(subject),
    }
}

/// 从主题行推断 conventional commit 类型
pub fn infer_commit_type(subject: &str) -> CommitType {
    // `fix(auth):` / `feat!:` 的类型在括号、感叹号或冒号之前
    let declared = subject.trim().split(['(', '!', ':']).next().unwrap_or_default();
    if let Ok(commit_type) = declared.parse::<CommitType>() {
        return commit_type;
    }
    let first = words(subject).into_iter().next().unwrap_or_default();
    if let Ok(commit_type) = first.parse::<CommitType>() {
        return commit_type;
    }
    match first.as_str() {
        "add" | "added" | "adds" | "implement" | "implemented" | "introduce" | "support" | "create" => CommitType::Feat,
        "fixed" | "fixes" | "fixing" | "resolve" | "resolved" | "bug" | "bugfix" | "hotfix" | "patch" => CommitType::Fix,
        "doc" | "readme" | "documentation" | "comment" | "comments" => CommitType::Docs,
        "tests" | "testing" | "spec" => CommitType::Test,
        "rename" | "move" | "moved" | "extract" | "restructure" | "simplify" | "cleanup" | "clean" => {
            CommitType::Refactor
        }
        "format" | "formatting" | "lint" | "whitespace" => CommitType::Style,
        "optimize" | "optimise" | "speed" | "faster" | "cache" => CommitType::Perf,
        _ => CommitType::Chore,
    }
}

fn improved_message(commit: &Commit, rubric: &RubricScore) -> String {
    let subject = commit.message.trim();
    let commit_type = infer_commit_type(subject);
    let scope = EXPLICIT_SCOPE
        .find(subject)
        .and_then(|m| {
            let header = m.as_str();
            header.find('(').map(|start| header[start + 1..header.len() - 1].trim_end_matches(['!', ')']).to_string())
        })
        .unwrap_or_else(|| "<area>".to_string());

    let what = if rubric.clarity <= 1 {
        "describe what was changed".to_string()
    } else {
        let desc = description(subject);
        let mut chars = desc.chars();
        match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect::<String>().trim_end_matches('.').to_string(),
            None => "describe what was changed".to_string(),
        }
    };

    let header = format!("{}({}): {}", commit_type, scope, what);
    if rubric.context == 0 {
        format!("{}\n\nExplain why the change was needed.", header)
    } else {
        header
    }
}

/// 不调用模型的本地评分
pub fn offline_analysis(commit: &Commit) -> CriticResult<CommitAnalysis> {
    let rubric = heuristic_score(&commit.message, &commit.body);
    let score = rubric.total();

    match rubric.category() {
        Category::Excellent => {
            let strengths = rubric.strengths();
            let why_good = if strengths.is_empty() {
                "Clear, well-structured message".to_string()
            } else {
                let mut text = strengths.join(", ");
                if let Some(first) = text.get(0..1) {
                    text = first.to_uppercase() + &text[1..];
                }
                text
            };
            CommitAnalysis::praised(commit, score, why_good)
        }
        Category::NeedsWork | Category::Acceptable => {
            let problems = rubric.problems();
            let issue = if problems.is_empty() {
                "Could be more specific".to_string()
            } else {
                problems.join("; ")
            };
            CommitAnalysis::needs_improvement(commit, score, issue, improved_message(commit, &rubric))
        }
    }
}
