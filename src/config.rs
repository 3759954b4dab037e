use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{AppResult, ConfigError};
use crate::models::{OutputFormat, SenderCredentials};

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 参与者 CSV 文件
    pub input_file: String,
    /// 证书背景模板
    pub template_path: String,
    /// 证书输出目录
    pub output_dir: String,
    /// 证书输出格式
    pub output_format: OutputFormat,
    /// 批次结果报告（JSON）
    pub report_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- 证书内容 ---
    pub event_name: String,
    pub event_date: String,
    /// 验证链接前缀，二维码内容为 `{base_url}/verify/{token}`
    pub base_url: String,
    // --- 字体 ---
    /// 首选字体（姓名使用）
    pub preferred_font: Option<String>,
    /// 备选字体（姓名回退、活动名、日期使用）
    pub secondary_font: Option<String>,
    // --- SMTP 配置 ---
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_timeout_secs: u64,
    /// 全局发件人凭据，批次未提供时使用
    pub sender: Option<SenderCredentials>,
    /// 本批次发件人凭据，优先于全局凭据
    pub batch_sender: Option<SenderCredentials>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_file: "participants.csv".to_string(),
            template_path: "template.png".to_string(),
            output_dir: "certificates".to_string(),
            output_format: OutputFormat::Pdf,
            report_file: "certificate_report.json".to_string(),
            verbose_logging: false,
            event_name: "Hackathon 2025".to_string(),
            event_date: "Oct 3, 2025".to_string(),
            base_url: "http://127.0.0.1:5000".to_string(),
            preferred_font: Some("/usr/share/fonts/truetype/dejavu/DejaVuSerif-Bold.ttf".to_string()),
            secondary_font: Some("/usr/share/fonts/truetype/dejavu/DejaVuSerif.ttf".to_string()),
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            smtp_timeout_secs: 30,
            sender: None,
            batch_sender: None,
        }
    }
}

/// 配置文件结构（所有字段可选，未给出的沿用默认值）
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    input_file: Option<String>,
    template_path: Option<String>,
    output_dir: Option<String>,
    output_format: Option<OutputFormat>,
    report_file: Option<String>,
    verbose_logging: Option<bool>,
    event_name: Option<String>,
    event_date: Option<String>,
    base_url: Option<String>,
    preferred_font: Option<String>,
    secondary_font: Option<String>,
    smtp_host: Option<String>,
    smtp_port: Option<u16>,
    smtp_timeout_secs: Option<u64>,
    sender_email: Option<String>,
    sender_password: Option<String>,
}

impl Config {
    /// 加载配置：默认值 → `CERT_CONFIG` 指向的 TOML 文件 → 环境变量
    pub fn load() -> AppResult<Self> {
        let base = match std::env::var("CERT_CONFIG") {
            Ok(path) => Self::from_toml_file(&path)?,
            Err(_) => Self::default(),
        };
        Ok(base.with_env()?)
    }

    /// 只从环境变量加载
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env()
    }

    /// 从 TOML 文件加载，未出现的字段使用默认值
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })
    }

    fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let file: FileConfig = toml::from_str(content)?;
        let default = Self::default();
        Ok(Self {
            input_file: file.input_file.unwrap_or(default.input_file),
            template_path: file.template_path.unwrap_or(default.template_path),
            output_dir: file.output_dir.unwrap_or(default.output_dir),
            output_format: file.output_format.unwrap_or(default.output_format),
            report_file: file.report_file.unwrap_or(default.report_file),
            verbose_logging: file.verbose_logging.unwrap_or(default.verbose_logging),
            event_name: file.event_name.unwrap_or(default.event_name),
            event_date: file.event_date.unwrap_or(default.event_date),
            base_url: file.base_url.unwrap_or(default.base_url),
            preferred_font: file.preferred_font.or(default.preferred_font),
            secondary_font: file.secondary_font.or(default.secondary_font),
            smtp_host: file.smtp_host.unwrap_or(default.smtp_host),
            smtp_port: file.smtp_port.unwrap_or(default.smtp_port),
            smtp_timeout_secs: file.smtp_timeout_secs.unwrap_or(default.smtp_timeout_secs),
            sender: SenderCredentials::from_parts(file.sender_email, file.sender_password),
            batch_sender: None,
        })
    }

    /// 用环境变量覆盖已有配置
    fn with_env(self) -> Result<Self, ConfigError> {
        self.with_lookup(|name| std::env::var(name).ok())
    }

    /// 用 `lookup` 给出的变量覆盖已有配置，未给出的保持不变
    fn with_lookup(self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = |name: &str| lookup(name);
        Ok(Self {
            input_file: env("INPUT_FILE").unwrap_or(self.input_file),
            template_path: env("TEMPLATE_PATH").unwrap_or(self.template_path),
            output_dir: env("OUTPUT_DIR").unwrap_or(self.output_dir),
            output_format: match env("OUTPUT_FORMAT") {
                Some(v) => parse_env("OUTPUT_FORMAT", v, "pdf|png", OutputFormat::from_extension)?,
                None => self.output_format,
            },
            report_file: env("REPORT_FILE").unwrap_or(self.report_file),
            verbose_logging: env("VERBOSE_LOGGING").and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
            event_name: env("EVENT_NAME").unwrap_or(self.event_name),
            event_date: env("EVENT_DATE").unwrap_or(self.event_date),
            base_url: env("BASE_URL").unwrap_or(self.base_url),
            preferred_font: env("PREFERRED_FONT").or(self.preferred_font),
            secondary_font: env("SECONDARY_FONT").or(self.secondary_font),
            smtp_host: env("SMTP_HOST").unwrap_or(self.smtp_host),
            smtp_port: match env("SMTP_PORT") {
                Some(v) => parse_env("SMTP_PORT", v, "u16", |s| s.parse().ok())?,
                None => self.smtp_port,
            },
            smtp_timeout_secs: match env("SMTP_TIMEOUT_SECS") {
                Some(v) => parse_env("SMTP_TIMEOUT_SECS", v, "u64", |s| s.parse().ok())?,
                None => self.smtp_timeout_secs,
            },
            sender: SenderCredentials::from_parts(env("SENDER_EMAIL"), env("SENDER_PASSWORD")).or(self.sender),
            batch_sender: SenderCredentials::from_parts(env("BATCH_SENDER_EMAIL"), env("BATCH_SENDER_PASSWORD"))
                .or(self.batch_sender),
        })
    }

    /// 字体候选路径（按优先级）
    pub fn font_paths(&self) -> (Option<PathBuf>, Option<PathBuf>) {
        (
            self.preferred_font.as_ref().map(PathBuf::from),
            self.secondary_font.as_ref().map(PathBuf::from),
        )
    }
}

fn parse_env<T>(
    var_name: &str,
    value: String,
    expected_type: &'static str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, ConfigError> {
    parse(&value).ok_or(ConfigError::EnvVarParseFailed {
        var_name: var_name.to_string(),
        value,
        expected_type,
    })
}
