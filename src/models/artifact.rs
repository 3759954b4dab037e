//! 证书文件相关类型

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// 证书令牌
///
/// 由姓名生成，只包含 `[A-Za-z0-9_.-]`，可直接作为文件名和 URL 路径段。
/// 生成方式见 [`crate::services::token::make_token`]。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    pub(crate) fn from_safe(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 从证书路径还原令牌（`{token}.{ext}`）
    pub fn from_artifact_path(path: &Path) -> Option<Self> {
        let stem = path.file_stem()?.to_str()?;
        is_safe(stem).then(|| Self(stem.to_string()))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 是否只包含文件名安全字符
pub fn is_safe(value: &str) -> bool {
    value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

/// 证书输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pdf,
    Png,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Png => "png",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(OutputFormat::Pdf),
            "png" => Some(OutputFormat::Png),
            _ => None,
        }
    }
}

/// 已生成的证书
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateArtifact {
    pub token: Token,
    pub path: PathBuf,
    pub format: OutputFormat,
}

impl CertificateArtifact {
    /// 令牌决定的输出路径
    pub fn at(output_dir: &Path, token: Token, format: OutputFormat) -> Self {
        let path = output_dir.join(format!("{}.{}", token, format.extension()));
        Self {
            token,
            path,
            format,
        }
    }

    /// 证书文件名（作为附件名和下载名）
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("{}.{}", self.token, self.format.extension()))
    }
}
