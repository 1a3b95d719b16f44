//! 模型输出的解析与校验
//!
//! 解析宽松（去掉代码块、提取第一个 JSON 值），校验严格。

use crate::infrastructure::{CriticError, CriticResult};
use crate::models::{Category, Commit, CommitAnalysis, CommitType, SuggestedCommit};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

pub const ANALYZE_AGENT: &str = "analyze_commits";
pub const SUGGEST_AGENT: &str = "suggest_commit_message";

/// Conventional commit 首行格式
pub static CONVENTIONAL_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(feat|fix|refactor|docs|test|chore|style|perf)(\([^()\s]+\))?!?: \S").unwrap()
});

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```(?:[A-Za-z]+)?\s*([\s\S]*?)```").unwrap());

/// 从模型回复中取出第一个 JSON 值
pub fn extract_json(text: &str) -> Option<Value> {
    let body = CODE_FENCE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(text)
        .trim();

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return Some(value);
    }

    let start = body.find(['[', '{'])?;
    let end = matching_bracket(&body[start..])?;
    serde_json::from_str(&body[start..start + end + 1]).ok()
}

/// 返回与首字符配对的括号下标，跳过字符串内的括号
fn matching_bracket(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' | '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    hash: String,
    #[serde(default)]
    score: Value,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    issue: Option<String>,
    #[serde(default)]
    suggestion: Option<String>,
    #[serde(default)]
    why_good: Option<String>,
}

fn malformed_analysis(message: impl Into<String>) -> CriticError {
    CriticError::malformed(ANALYZE_AGENT, message)
}

fn parse_score(hash: &str, value: &Value) -> CriticResult<u8> {
    let score = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    match score {
        Some(s) if (1..=10).contains(&s) => Ok(s as u8),
        _ => Err(malformed_analysis(format!(
            "commit {}: score must be an integer in 1..=10, got {}",
            hash, value
        ))),
    }
}

fn non_blank(field: Option<String>) -> Option<String> {
    field.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// 找到模型回复中的 hash 对应的提交下标，允许长短 hash 互为前缀
///
/// 短 hash 可能重复，优先返回还没有结果的那一条。
fn find_commit(batch: &[Commit], filled: &[Option<CommitAnalysis>], hash: &str) -> Option<usize> {
    let hash = hash.trim().to_lowercase();
    if hash.len() < 4 {
        return None;
    }
    let matches = |c: &Commit| {
        let own = c.hash.to_lowercase();
        own.starts_with(&hash) || hash.starts_with(&own)
    };
    batch
        .iter()
        .zip(filled)
        .position(|(c, slot)| slot.is_none() && matches(c))
        .or_else(|| batch.iter().position(matches))
}

/// 解析并校验一批提交的评分结果
///
/// 分数为准：与分数不符的 category 会被重新计算。返回顺序与 `batch` 一致。
pub fn parse_analyses(response: &str, batch: &[Commit]) -> CriticResult<Vec<CommitAnalysis>> {
    let value = extract_json(response).ok_or_else(|| malformed_analysis("response contains no JSON"))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match ["analyses", "results", "commits"]
            .iter()
            .find_map(|key| map.remove(*key))
        {
            Some(Value::Array(items)) => items,
            _ => return Err(malformed_analysis("expected a JSON array of analyses")),
        },
        _ => return Err(malformed_analysis("expected a JSON array of analyses")),
    };

    let mut by_hash: Vec<Option<CommitAnalysis>> = vec![None; batch.len()];

    for item in items {
        let raw: RawAnalysis =
            serde_json::from_value(item).map_err(|e| malformed_analysis(format!("invalid analysis record: {}", e)))?;

        let index = find_commit(batch, &by_hash, &raw.hash)
            .ok_or_else(|| malformed_analysis(format!("hash {} is not in the submitted batch", raw.hash)))?;
        let commit = &batch[index];
        if by_hash[index].is_some() {
            tracing::debug!(hash = %commit.hash, "Ignoring duplicate analysis");
            continue;
        }

        let score = parse_score(&commit.hash, &raw.score)?;
        let category = Category::from_score(score).ok_or_else(|| malformed_analysis("score out of range"))?;
        if let Some(claimed) = raw.category.as_deref() {
            if claimed != category.as_str() {
                tracing::debug!(
                    hash = %commit.hash,
                    claimed,
                    actual = category.as_str(),
                    "Category disagrees with score, using score"
                );
            }
        }

        let analysis = match category {
            Category::Excellent => {
                let why_good = non_blank(raw.why_good).ok_or_else(|| {
                    malformed_analysis(format!("commit {}: excellent commits need why_good", commit.hash))
                })?;
                CommitAnalysis::praised(commit, score, why_good)
            }
            Category::NeedsWork | Category::Acceptable => {
                let (issue, suggestion) = match (non_blank(raw.issue), non_blank(raw.suggestion)) {
                    (Some(issue), Some(suggestion)) => (issue, suggestion),
                    _ => {
                        return Err(malformed_analysis(format!(
                            "commit {}: {} commits need issue and suggestion",
                            commit.hash, category
                        )))
                    }
                };
                CommitAnalysis::needs_improvement(commit, score, issue, suggestion)
            }
        }
        .map_err(|e| malformed_analysis(e.to_string()))?;

        by_hash[index] = Some(analysis);
    }

    let missing: Vec<&str> = batch
        .iter()
        .zip(&by_hash)
        .filter(|(_, a)| a.is_none())
        .map(|(c, _)| c.hash.as_str())
        .collect();
    if !missing.is_empty() {
        return Err(malformed_analysis(format!("missing analyses for: {}", missing.join(", "))));
    }

    Ok(by_hash.into_iter().flatten().collect())
}

#[derive(Debug, Deserialize)]
struct RawSuggestion {
    #[serde(rename = "type")]
    commit_type: String,
    #[serde(default)]
    scope: Option<String>,
    subject: String,
    #[serde(default)]
    body: Option<String>,
}

/// 解析并校验模型给出的提交信息
pub fn parse_suggestion(response: &str) -> CriticResult<SuggestedCommit> {
    let malformed = |message: String| CriticError::malformed(SUGGEST_AGENT, message);

    let value = extract_json(response).ok_or_else(|| malformed("response contains no JSON".to_string()))?;
    let raw: RawSuggestion =
        serde_json::from_value(value).map_err(|e| malformed(format!("invalid suggestion: {}", e)))?;

    let commit_type: CommitType = raw.commit_type.parse().map_err(|e: CriticError| malformed(e.to_string()))?;
    let suggestion = SuggestedCommit {
        commit_type,
        scope: raw.scope,
        subject: raw.subject,
        body: raw.body,
    }
    .normalized();

    suggestion.validate().map_err(|e| malformed(e.to_string()))?;
    Ok(suggestion)
}
