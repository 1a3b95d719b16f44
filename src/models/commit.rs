use crate::ai::scoring;
use crate::infrastructure::{CriticError, CriticResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 仓库历史中的一条提交
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// 8 位短哈希（浅克隆下不保证唯一）
    pub hash: String,
    /// 提交信息首行
    pub message: String,
    /// 提交信息其余部分，可能为空
    #[serde(default)]
    pub body: String,
}

impl Commit {
    pub fn new(hash: impl Into<String>, message: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            message: message.into(),
            body: body.into(),
        }
    }

    pub fn body_opt(&self) -> Option<&str> {
        let body = self.body.trim();
        if body.is_empty() {
            None
        } else {
            Some(body)
        }
    }
}

/// 提交质量分类，完全由分数决定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    NeedsWork,
    Acceptable,
    Excellent,
}

impl Category {
    pub const MIN_SCORE: u8 = 1;
    pub const MAX_SCORE: u8 = 10;

    /// 1-3 needs_work，4-6 acceptable，7-10 excellent，其余分数无分类
    pub fn from_score(score: u8) -> Option<Self> {
        match score {
            1..=3 => Some(Category::NeedsWork),
            4..=6 => Some(Category::Acceptable),
            7..=10 => Some(Category::Excellent),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::NeedsWork => "needs_work",
            Category::Acceptable => "acceptable",
            Category::Excellent => "excellent",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单条提交的评分结果
///
/// excellent 只带 `why_good`；needs_work / acceptable 只带 `issue` 和 `suggestion`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAnalysis {
    pub hash: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub score: u8,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub why_good: Option<String>,
}

impl CommitAnalysis {
    /// 构造 needs_work / acceptable 结果
    pub fn needs_improvement(
        commit: &Commit,
        score: u8,
        issue: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> CriticResult<Self> {
        let analysis = Self {
            hash: commit.hash.clone(),
            message: commit.message.clone(),
            body: commit.body_opt().map(str::to_string),
            score,
            category: category_for(score)?,
            issue: Some(issue.into()),
            suggestion: Some(suggestion.into()),
            why_good: None,
        };
        analysis.validate()?;
        Ok(analysis)
    }

    /// 构造 excellent 结果
    pub fn praised(commit: &Commit, score: u8, why_good: impl Into<String>) -> CriticResult<Self> {
        let analysis = Self {
            hash: commit.hash.clone(),
            message: commit.message.clone(),
            body: commit.body_opt().map(str::to_string),
            score,
            category: category_for(score)?,
            issue: None,
            suggestion: None,
            why_good: Some(why_good.into()),
        };
        analysis.validate()?;
        Ok(analysis)
    }

    /// 检查分数、分类与说明字段之间的约束
    pub fn validate(&self) -> CriticResult<()> {
        let expected = category_for(self.score)?;
        if expected != self.category {
            return Err(CriticError::validation(
                format!(
                    "commit {}: score {} belongs to {}, not {}",
                    self.hash, self.score, expected, self.category
                ),
                Some("category"),
            ));
        }

        let filled = |field: &Option<String>| field.as_deref().is_some_and(|s| !s.trim().is_empty());

        match self.category {
            Category::Excellent => {
                if !filled(&self.why_good) {
                    return Err(CriticError::validation(
                        format!("commit {}: excellent commits need why_good", self.hash),
                        Some("why_good"),
                    ));
                }
                if self.issue.is_some() || self.suggestion.is_some() {
                    return Err(CriticError::validation(
                        format!("commit {}: excellent commits carry no issue/suggestion", self.hash),
                        Some("issue"),
                    ));
                }
            }
            Category::NeedsWork | Category::Acceptable => {
                if !filled(&self.issue) || !filled(&self.suggestion) {
                    return Err(CriticError::validation(
                        format!(
                            "commit {}: {} commits need both issue and suggestion",
                            self.hash, self.category
                        ),
                        Some("suggestion"),
                    ));
                }
                if self.why_good.is_some() {
                    return Err(CriticError::validation(
                        format!("commit {}: only excellent commits carry why_good", self.hash),
                        Some("why_good"),
                    ));
                }
            }
        }

        Ok(())
    }
}

fn category_for(score: u8) -> CriticResult<Category> {
    Category::from_score(score).ok_or_else(|| {
        CriticError::validation(
            format!(
                "score {} is outside {}..={}",
                score,
                Category::MIN_SCORE,
                Category::MAX_SCORE
            ),
            Some("score"),
        )
    })
}

/// 多条提交的汇总报告
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub total_commits: usize,
    pub average_score: f64,

    pub needs_work_count: usize,
    pub acceptable_count: usize,
    pub excellent_count: usize,

    pub vague_count: usize,
    pub one_word_count: usize,
    pub no_scope_count: usize,

    pub needs_work: Vec<CommitAnalysis>,
    pub acceptable: Vec<CommitAnalysis>,
    pub excellent: Vec<CommitAnalysis>,
}

impl AnalysisReport {
    /// 汇总评分结果
    ///
    /// vague / one-word / no-scope 计数按提交首行在本地计算，不依赖模型。
    pub fn from_analyses(analyses: Vec<CommitAnalysis>) -> Self {
        let mut report = AnalysisReport {
            total_commits: analyses.len(),
            ..Default::default()
        };

        if analyses.is_empty() {
            return report;
        }

        let total_score: u64 = analyses.iter().map(|a| u64::from(a.score)).sum();
        report.average_score = total_score as f64 / analyses.len() as f64;

        for analysis in analyses {
            let rubric = scoring::heuristic_score(&analysis.message, analysis.body.as_deref().unwrap_or(""));
            if scoring::is_one_word(&analysis.message) {
                report.one_word_count += 1;
            }
            if rubric.is_vague() {
                report.vague_count += 1;
            }
            if rubric.scope == 0 {
                report.no_scope_count += 1;
            }

            match analysis.category {
                Category::NeedsWork => report.needs_work.push(analysis),
                Category::Acceptable => report.acceptable.push(analysis),
                Category::Excellent => report.excellent.push(analysis),
            }
        }

        report.needs_work_count = report.needs_work.len();
        report.acceptable_count = report.acceptable.len();
        report.excellent_count = report.excellent.len();
        report
    }

    /// 计数占总数的百分比
    pub fn percentage(&self, count: usize) -> f64 {
        if self.total_commits == 0 {
            0.0
        } else {
            count as f64 * 100.0 / self.total_commits as f64
        }
    }
}
