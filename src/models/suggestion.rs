use crate::infrastructure::{CriticError, CriticResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 主题行最大长度（字符数）
pub const MAX_SUBJECT_CHARS: usize = 50;

/// Conventional commit 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitType {
    Feat,
    Fix,
    Refactor,
    Docs,
    Test,
    Chore,
    Style,
    Perf,
}

impl CommitType {
    pub const ALL: [CommitType; 8] = [
        CommitType::Feat,
        CommitType::Fix,
        CommitType::Refactor,
        CommitType::Docs,
        CommitType::Test,
        CommitType::Chore,
        CommitType::Style,
        CommitType::Perf,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommitType::Feat => "feat",
            CommitType::Fix => "fix",
            CommitType::Refactor => "refactor",
            CommitType::Docs => "docs",
            CommitType::Test => "test",
            CommitType::Chore => "chore",
            CommitType::Style => "style",
            CommitType::Perf => "perf",
        }
    }
}

impl fmt::Display for CommitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommitType {
    type Err = CriticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        CommitType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == lowered)
            .ok_or_else(|| CriticError::validation(format!("unknown commit type: {}", s), Some("type")))
    }
}

/// 模型为暂存改动生成的提交信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedCommit {
    #[serde(rename = "type")]
    pub commit_type: CommitType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl SuggestedCommit {
    pub fn new(commit_type: CommitType, scope: Option<&str>, subject: &str, body: Option<&str>) -> Self {
        Self {
            commit_type,
            scope: scope.map(str::to_string),
            subject: subject.to_string(),
            body: body.map(str::to_string),
        }
        .normalized()
    }

    /// `type(scope): subject`，无 scope 时省略括号
    pub fn header(&self) -> String {
        match &self.scope {
            Some(scope) => format!("{}({}): {}", self.commit_type, scope, self.subject),
            None => format!("{}: {}", self.commit_type, self.subject),
        }
    }

    /// 完整提交信息：header，若有 body 则空一行接 body
    pub fn full_message(&self) -> String {
        match &self.body {
            Some(body) => format!("{}\n\n{}", self.header(), body),
            None => self.header(),
        }
    }

    /// 规整模型输出：去空白、scope 转小写、丢弃空字段、去掉主题末尾句号
    pub fn normalized(mut self) -> Self {
        self.scope = self
            .scope
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        self.subject = self.subject.trim().trim_end_matches('.').trim_end().to_string();
        self.body = self
            .body
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty());
        self
    }

    pub fn validate(&self) -> CriticResult<()> {
        if self.subject.trim().is_empty() {
            return Err(CriticError::validation("subject must not be empty", Some("subject")));
        }
        let len = self.subject.chars().count();
        if len > MAX_SUBJECT_CHARS {
            return Err(CriticError::validation(
                format!("subject is {} characters, limit is {}", len, MAX_SUBJECT_CHARS),
                Some("subject"),
            ));
        }
        if self.subject.ends_with('.') {
            return Err(CriticError::validation("subject must not end with a period", Some("subject")));
        }
        if let Some(scope) = &self.scope {
            if scope.chars().any(|c| c.is_whitespace() || c == '(' || c == ')') {
                return Err(CriticError::validation(format!("invalid scope: {}", scope), Some("scope")));
            }
        }
        Ok(())
    }
}

impl fmt::Display for SuggestedCommit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_message_with_scope_and_body() {
        let commit = SuggestedCommit::new(
            CommitType::Feat,
            Some("api"),
            "add user authentication endpoint",
            Some("- Implement JWT token validation"),
        );
        assert_eq!(
            commit.full_message(),
            "feat(api): add user authentication endpoint\n\n- Implement JWT token validation"
        );
    }

    #[test]
    fn test_full_message_without_scope() {
        let commit = SuggestedCommit::new(CommitType::Docs, None, "fix typo", None);
        assert_eq!(commit.full_message(), "docs: fix typo");
    }

    #[test]
    fn test_normalized_cleans_model_output() {
        let commit = SuggestedCommit::new(CommitType::Fix, Some("  Auth "), " resolve token expiry. ", Some("   "));
        assert_eq!(commit.scope.as_deref(), Some("auth"));
        assert_eq!(commit.subject, "resolve token expiry");
        assert!(commit.body.is_none());
        assert!(commit.validate().is_ok());
    }

    #[test]
    fn test_validate_subject_length() {
        let long = "a".repeat(51);
        let commit = SuggestedCommit::new(CommitType::Chore, None, &long, None);
        assert!(commit.validate().is_err());

        let exact = "a".repeat(50);
        let commit = SuggestedCommit::new(CommitType::Chore, None, &exact, None);
        assert!(commit.validate().is_ok());
    }

    #[test]
    fn test_type_serde_uses_lowercase_and_type_key() {
        let commit = SuggestedCommit::new(CommitType::Perf, Some("db"), "batch inserts", None);
        let json = serde_json::to_value(&commit).unwrap();
        assert_eq!(json["type"], "perf");
        assert!(json.get("body").is_none());

        let parsed: SuggestedCommit =
            serde_json::from_str(r#"{"type":"refactor","scope":null,"subject":"split parser"}"#).unwrap();
        assert_eq!(parsed.commit_type, CommitType::Refactor);
        assert!(parsed.scope.is_none());
    }

    #[test]
    fn test_commit_type_from_str() {
        assert_eq!("FEAT".parse::<CommitType>().unwrap(), CommitType::Feat);
        assert!("build".parse::<CommitType>().is_err());
    }
}
