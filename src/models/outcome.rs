//! 投递结果与批次结果行

use std::fmt;

use serde::Serialize;

use crate::error::{CoercionError, RenderError};
use crate::models::artifact::CertificateArtifact;
use crate::models::participant::ParticipantRecord;

/// 证书生成成功时的状态
pub const CERT_GENERATED: &str = "Generated";
/// 未尝试发送时的邮件状态
pub const EMAIL_SKIPPED: &str = "Skipped";

/// 邮件投递失败原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryFailure {
    /// 批次和全局配置都没有凭据
    MissingCredentials,
    /// 附件读取失败
    Attachment(String),
    /// 连接、认证等传输失败
    Transport(String),
    /// 收件人被拒绝
    RecipientRejected(String),
}

impl fmt::Display for DeliveryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryFailure::MissingCredentials => write!(
                f,
                "missing SMTP credentials (provide batch credentials or set SENDER_EMAIL/SENDER_PASSWORD)"
            ),
            DeliveryFailure::Attachment(detail) => write!(f, "attachment error: {}", detail),
            DeliveryFailure::Transport(detail) => write!(f, "SMTP error: {}", detail),
            DeliveryFailure::RecipientRejected(detail) => write!(f, "recipient rejected: {}", detail),
        }
    }
}

/// 单条记录的投递结果，不自动重试
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Sent,
    Failed(DeliveryFailure),
}

impl DeliveryOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, DeliveryOutcome::Sent)
    }
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryOutcome::Sent => f.write_str("Sent"),
            DeliveryOutcome::Failed(reason) => write!(f, "Failed: {}", reason),
        }
    }
}

/// 批次结果行，每条输入记录对应一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResultRow {
    pub name: Option<String>,
    pub email: Option<String>,
    pub cert_filename: Option<String>,
    pub cert_status: String,
    pub email_status: String,
}

impl BatchResultRow {
    /// 已生成证书并尝试发送
    pub fn delivered(
        record: &ParticipantRecord,
        artifact: &CertificateArtifact,
        outcome: &DeliveryOutcome,
    ) -> Self {
        Self {
            name: Some(record.name.clone()),
            email: Some(record.email.clone()),
            cert_filename: Some(artifact.file_name()),
            cert_status: CERT_GENERATED.to_string(),
            email_status: outcome.to_string(),
        }
    }

    /// 证书生成失败，邮件跳过
    pub fn render_failed(record: &ParticipantRecord, err: &RenderError) -> Self {
        Self {
            name: Some(record.name.clone()),
            email: Some(record.email.clone()),
            cert_filename: None,
            cert_status: format!("Certificate error: {}", err),
            email_status: EMAIL_SKIPPED.to_string(),
        }
    }

    /// 行读取失败
    pub fn unreadable(err: &CoercionError) -> Self {
        Self {
            name: None,
            email: None,
            cert_filename: None,
            cert_status: format!("Row read error: {}", err),
            email_status: EMAIL_SKIPPED.to_string(),
        }
    }

    pub fn is_generated(&self) -> bool {
        self.cert_status == CERT_GENERATED
    }

    pub fn is_sent(&self) -> bool {
        self.email_status == "Sent"
    }

    pub fn is_skipped(&self) -> bool {
        self.email_status == EMAIL_SKIPPED
    }
}

/// 批次统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub generated: usize,
    pub sent: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl BatchSummary {
    pub fn from_rows(rows: &[BatchResultRow]) -> Self {
        rows.iter().fold(
            Self {
                total: rows.len(),
                ..Default::default()
            },
            |mut summary, row| {
                if row.is_generated() {
                    summary.generated += 1;
                }
                if row.is_sent() {
                    summary.sent += 1;
                } else if row.is_skipped() {
                    summary.skipped += 1;
                } else {
                    summary.failed += 1;
                }
                summary
            },
        )
    }
}
