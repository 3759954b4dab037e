//! 邮件投递服务 - 业务能力层
//!
//! 只负责"把一张证书发给一个人"，所有失败都转换为 [`DeliveryOutcome`]，不向上抛错。

use std::path::Path;

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::Message;
use tracing::{info, warn};

use crate::infrastructure::{MailTransport, TransportError};
use crate::models::{DeliveryFailure, DeliveryOutcome, SenderCredentials};

const SUBJECT: &str = "Your Certificate of Completion!";
const BODY: &str = "Congratulations! Please find your certificate attached.";

/// 邮件投递服务
///
/// 职责：
/// - 解析发件人凭据（调用方提供的优先，其次是构造时给定的全局凭据）
/// - 构建带附件的邮件并交给传输层
/// - 不重试
pub struct NotificationDispatcher<T> {
    transport: T,
    configured: Option<SenderCredentials>,
}

impl<T: MailTransport> NotificationDispatcher<T> {
    pub fn new(transport: T, configured: Option<SenderCredentials>) -> Self {
        Self { transport, configured }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// 选出本次使用的凭据
    pub fn resolve_credentials<'a>(&'a self, per_call: Option<&'a SenderCredentials>) -> Option<&'a SenderCredentials> {
        per_call
            .filter(|c| c.is_complete())
            .or_else(|| self.configured.as_ref().filter(|c| c.is_complete()))
    }

    /// 发送证书
    ///
    /// # 参数
    /// - `recipient`: 收件人邮箱
    /// - `artifact_path`: 证书文件，附件名取其文件名
    /// - `credentials`: 本批次凭据（可选）
    pub async fn deliver(
        &self,
        recipient: &str,
        artifact_path: &Path,
        credentials: Option<&SenderCredentials>,
    ) -> DeliveryOutcome {
        let Some(credentials) = self.resolve_credentials(credentials) else {
            warn!("⚠️ 缺少 SMTP 凭据，跳过发送: {}", recipient);
            return DeliveryOutcome::Failed(DeliveryFailure::MissingCredentials);
        };

        let message = match self.build_message(recipient, artifact_path, credentials).await {
            Ok(message) => message,
            Err(failure) => {
                warn!("⚠️ 邮件构建失败 ({}): {}", recipient, failure);
                return DeliveryOutcome::Failed(failure);
            }
        };

        match self.transport.send(message, credentials).await {
            Ok(()) => {
                info!("✓ 邮件已发送: {} (发件人: {})", recipient, credentials.email);
                DeliveryOutcome::Sent
            }
            Err(TransportError::Rejected(detail)) => {
                warn!("⚠️ 收件人被拒绝 {}: {}", recipient, detail);
                DeliveryOutcome::Failed(DeliveryFailure::RecipientRejected(detail))
            }
            Err(TransportError::Failed(detail)) => {
                warn!("⚠️ 邮件发送失败 {}: {}", recipient, detail);
                DeliveryOutcome::Failed(DeliveryFailure::Transport(detail))
            }
        }
    }

    async fn build_message(
        &self,
        recipient: &str,
        artifact_path: &Path,
        credentials: &SenderCredentials,
    ) -> Result<Message, DeliveryFailure> {
        let from: Mailbox = credentials
            .email
            .trim()
            .parse()
            .map_err(|e| DeliveryFailure::Transport(format!("invalid sender address {}: {}", credentials.email, e)))?;
        let to: Mailbox = recipient
            .trim()
            .parse()
            .map_err(|e| DeliveryFailure::RecipientRejected(format!("invalid address {}: {}", recipient, e)))?;

        let bytes = tokio::fs::read(artifact_path)
            .await
            .map_err(|e| DeliveryFailure::Attachment(format!("{}: {}", artifact_path.display(), e)))?;
        let file_name = artifact_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| DeliveryFailure::Attachment(format!("{} has no file name", artifact_path.display())))?;
        let content_type = ContentType::parse("application/octet-stream")
            .map_err(|e| DeliveryFailure::Attachment(e.to_string()))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(SUBJECT)
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(BODY.to_string()))
                    .singlepart(Attachment::new(file_name).body(bytes, content_type)),
            )
            .map_err(|e| DeliveryFailure::Transport(e.to_string()))
    }
}
