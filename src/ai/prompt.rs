use crate::models::repo::MAX_DIFF_CHARS;
use crate::models::{Commit, StagedChanges, SuggestedCommit};
use serde::Serialize;

pub const ANALYZE_SYSTEM_PROMPT: &str = r#"You are a commit message analyzer.

Your ONLY job: analyze commit messages and score them 1-10.

SCORING CRITERIA (10 points total):
- Clarity (0-3): does it explain WHAT changed?
  0 = completely unclear ("fix", "wip", "update"), 1 = vague ("fixed bug", "changes"),
  2 = somewhat clear ("fix login issue"), 3 = specific ("fix session timeout on login page")
- Context (0-3): does it explain WHY? 0 = none, 1 = minimal, 2 = some, 3 = body explains the reasoning
- Format (0-2): 0 = no structure, 1 = some structure, 2 = conventional commit format type(scope): subject
- Scope (0-2): 0 = no affected area, 1 = implicit, 2 = explicit scope

The score is the sum of the four sub-scores, never lower than 1.

CATEGORY MAPPING:
- 1-3: "needs_work"
- 4-6: "acceptable"
- 7-10: "excellent"

For needs_work and acceptable commits set "issue" (what is wrong) and "suggestion" (a concrete better message).
For excellent commits set "why_good" instead and leave issue/suggestion null.

OUTPUT: a JSON array with one object per commit, nothing else:
[{"hash": "abc12345", "score": 1, "category": "needs_work",
  "issue": "Single word - no indication of what was fixed",
  "suggestion": "fix(component): describe what was fixed", "why_good": null}]

Use the hash exactly as given."#;

pub const SUGGEST_SYSTEM_PROMPT: &str = r#"You are a commit message generator.

Your ONLY job: write a conventional commit message for the staged changes.

1. TYPE: feat, fix, refactor, docs, test, chore, style or perf
2. SCOPE: the affected area, taken from the file paths (api, auth, ui, db, ...), lower case, or null
3. SUBJECT: at most 50 characters, imperative mood ("add" not "added"), no trailing period
4. BODY: optional, explains WHY for non-trivial changes, or null

The diff may be truncated at {{max_diff_chars}} characters; use the stat and file list for the full picture.

OUTPUT: a single JSON object, nothing else:
{"type": "feat", "scope": "api", "subject": "add user authentication endpoint", "body": null}"#;

#[derive(Serialize)]
struct CommitPayload<'a> {
    hash: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "is_blank")]
    body: &'a str,
}

fn is_blank(s: &&str) -> bool {
    s.trim().is_empty()
}

/// 当前日期，附加在系统提示词后
pub fn date_context() -> String {
    format!("Current date: {}", chrono::Local::now().format("%A, %B %d, %Y"))
}

pub fn analyze_system_prompt() -> String {
    format!("{}\n\n{}", ANALYZE_SYSTEM_PROMPT, date_context())
}

pub fn suggest_system_prompt() -> String {
    let prompt = SUGGEST_SYSTEM_PROMPT.replace("{{max_diff_chars}}", &MAX_DIFF_CHARS.to_string());
    format!("{}\n\n{}", prompt, date_context())
}

/// 评分请求：提交以 JSON 数组传入
pub fn build_analyze_input(commits: &[Commit]) -> String {
    let payload: Vec<CommitPayload> = commits
        .iter()
        .map(|c| CommitPayload {
            hash: &c.hash,
            message: &c.message,
            body: c.body.trim(),
        })
        .collect();
    let json = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| "[]".to_string());
    format!("Analyze these {} commits:\n{}", commits.len(), json)
}

/// 撰写请求；revision 时附带上一版建议和用户反馈
pub fn build_suggest_input(
    changes: &StagedChanges,
    previous: Option<&SuggestedCommit>,
    feedback: Option<&str>,
) -> String {
    let mut input = format!(
        "Suggest a commit message for these staged changes.\n\nFiles ({}):\n{}\n\nStat:\n{}\n\nDiff:\n{}",
        changes.file_count.unwrap_or(changes.files.len()),
        changes.files.join("\n"),
        changes.stat.as_deref().unwrap_or(""),
        changes.diff.as_deref().unwrap_or(""),
    );

    if let Some(previous) = previous {
        input.push_str(&format!("\n\nPrevious suggestion:\n{}", previous.full_message()));
    }
    if let Some(feedback) = feedback {
        input.push_str(&format!(
            "\n\nPlease revise the commit message based on this feedback: {}",
            feedback
        ));
    }
    input
}

/// 模型输出不合规时追加的纠正消息
pub fn correction_message(error: &str) -> String {
    format!(
        "Your previous answer could not be used: {}\nReply again with only the JSON described in your instructions.",
        error
    )
}
