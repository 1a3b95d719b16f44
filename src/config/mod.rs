use crate::ai::provider::ProviderConfig;
use crate::infrastructure::{CriticError, CriticResult};
use std::env;
use std::path::PathBuf;

pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-5-20250929";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const SUPPORTED_PROVIDERS: [&str; 2] = ["anthropic", "openai"];

const CHECKPOINT_DB: &str = "checkpoints.db";

#[derive(Debug, Clone)]
pub struct Config {
    pub provider: String,
    /// 未设置时使用 provider 的默认模型
    pub model: Option<String>,
    pub api_url: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
    /// 线程数据库和 .env 所在目录
    pub home_dir: PathBuf,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// 不读取任何外部来源的默认配置
    pub fn defaults() -> Self {
        Config {
            provider: "anthropic".to_string(),
            model: None,
            api_url: None,
            anthropic_api_key: None,
            openai_api_key: None,
            timeout_secs: 120,
            max_retries: 2,
            home_dir: default_home_dir(),
            debug: false,
        }
    }

    pub fn new() -> Self {
        let mut config = Self::defaults();

        // 加载配置文件
        #[cfg(not(test))]
        config.load_from_env_file();
        // 加载环境变量（覆盖配置文件）
        config.load_from_env();

        config
    }

    pub fn load_from_env_file(&mut self) {
        // 用户目录下的 .env
        let user_env_path = self.home_dir.join(".env");
        if user_env_path.exists() {
            dotenvy::from_path(user_env_path).ok();
        }

        // 当前目录
        dotenvy::dotenv().ok();
    }

    pub fn load_from_env(&mut self) {
        if let Ok(provider) = env::var("COMMIT_CRITIC_PROVIDER") {
            self.provider = provider.trim().to_lowercase();
        }
        if let Some(model) = non_empty_var("COMMIT_CRITIC_MODEL") {
            self.model = Some(model);
        }
        if let Some(url) = non_empty_var("COMMIT_CRITIC_API_URL") {
            self.api_url = Some(url);
        }
        if let Some(api_key) = non_empty_var("ANTHROPIC_API_KEY") {
            self.anthropic_api_key = Some(api_key);
        }
        if let Some(api_key) = non_empty_var("OPENAI_API_KEY") {
            self.openai_api_key = Some(api_key);
        }
        if let Some(timeout) = non_empty_var("COMMIT_CRITIC_TIMEOUT") {
            match timeout.parse() {
                Ok(secs) => self.timeout_secs = secs,
                Err(_) => tracing::warn!("Ignoring invalid COMMIT_CRITIC_TIMEOUT: {}", timeout),
            }
        }
        if let Some(retries) = non_empty_var("COMMIT_CRITIC_MAX_RETRIES") {
            match retries.parse() {
                Ok(n) => self.max_retries = n,
                Err(_) => tracing::warn!("Ignoring invalid COMMIT_CRITIC_MAX_RETRIES: {}", retries),
            }
        }
        if let Some(home) = non_empty_var("COMMIT_CRITIC_HOME") {
            self.home_dir = PathBuf::from(home);
        }
        if let Some(debug) = non_empty_var("COMMIT_CRITIC_DEBUG") {
            self.debug = matches!(debug.to_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }
    }

    pub fn update_from_args(&mut self, args: &crate::cli::args::Args) {
        // 命令行参数优先级最高
        if !args.provider.is_empty() {
            self.provider = args.provider.trim().to_lowercase();
        }
        if !args.model.is_empty() {
            self.model = Some(args.model.clone());
        }
        if args.debug {
            self.debug = true;
        }
    }

    /// 校验 provider 名称与对应的 API key
    pub fn validate(&self) -> CriticResult<()> {
        self.validate_provider()?;
        self.require_api_key()
    }

    pub fn validate_provider(&self) -> CriticResult<()> {
        if !SUPPORTED_PROVIDERS.contains(&self.provider.as_str()) {
            return Err(CriticError::config(format!(
                "Unsupported provider: {} (supported: {})",
                self.provider,
                SUPPORTED_PROVIDERS.join(", ")
            )));
        }
        if self.timeout_secs == 0 {
            return Err(CriticError::config("COMMIT_CRITIC_TIMEOUT must be greater than 0"));
        }
        Ok(())
    }

    pub fn require_api_key(&self) -> CriticResult<()> {
        if self.api_key().is_none() {
            return Err(CriticError::config(format!(
                "{} environment variable not set.",
                self.api_key_var()
            )));
        }
        Ok(())
    }

    /// 当前 provider 对应的 API key 环境变量名
    pub fn api_key_var(&self) -> &'static str {
        match self.provider.as_str() {
            "openai" => "OPENAI_API_KEY",
            _ => "ANTHROPIC_API_KEY",
        }
    }

    pub fn api_key(&self) -> Option<&str> {
        match self.provider.as_str() {
            "openai" => self.openai_api_key.as_deref(),
            "anthropic" => self.anthropic_api_key.as_deref(),
            _ => None,
        }
    }

    pub fn effective_model(&self) -> String {
        if let Some(model) = &self.model {
            return model.clone();
        }
        match self.provider.as_str() {
            "openai" => DEFAULT_OPENAI_MODEL.to_string(),
            _ => DEFAULT_ANTHROPIC_MODEL.to_string(),
        }
    }

    pub fn effective_api_url(&self) -> String {
        if let Some(url) = &self.api_url {
            return url.clone();
        }
        match self.provider.as_str() {
            "openai" => OPENAI_API_URL.to_string(),
            _ => ANTHROPIC_API_URL.to_string(),
        }
    }

    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            model: self.effective_model(),
            api_key: self.api_key().map(str::to_string),
            api_url: self.effective_api_url(),
            timeout_secs: self.timeout_secs,
            ..ProviderConfig::default()
        }
    }

    pub fn checkpoint_db(&self) -> PathBuf {
        self.home_dir.join(CHECKPOINT_DB)
    }
}

fn default_home_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".commit_critic"))
        .unwrap_or_else(|| PathBuf::from(".commit_critic"))
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
