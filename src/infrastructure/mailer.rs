//! 邮件传输 - 基础设施层
//!
//! 只暴露"发送一封已构建好的邮件"的能力，不关心证书和批次。

use std::time::Duration;

use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::response::{Category, Code, Severity};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::SenderCredentials;

/// 传输层错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// 服务器拒绝了收件人
    #[error("{0}")]
    Rejected(String),
    /// 连接、TLS、认证或超时等失败
    #[error("{0}")]
    Failed(String),
}

/// 邮件传输能力
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// 发送邮件，直到服务器给出结果（或超时）才返回
    async fn send(&self, message: Message, credentials: &SenderCredentials) -> Result<(), TransportError>;
}

/// STARTTLS SMTP 传输
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    host: String,
    port: u16,
    timeout: Duration,
}

impl SmtpMailer {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.smtp_host.clone(),
            config.smtp_port,
            Duration::from_secs(config.smtp_timeout_secs),
        )
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, message: Message, credentials: &SenderCredentials) -> Result<(), TransportError> {
        debug!("连接 SMTP 服务器 {}:{} (发件人: {})", self.host, self.port, credentials.email);

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
            .map_err(|e| TransportError::Failed(e.to_string()))?
            .port(self.port)
            .timeout(Some(self.timeout))
            .credentials(Credentials::new(
                credentials.email.clone(),
                credentials.password.clone(),
            ))
            .build();

        match transport.send(message).await {
            Ok(response) => {
                debug!("SMTP 响应: {:?}", response.code());
                Ok(())
            }
            Err(e) => {
                warn!("SMTP 发送失败: {}", e);
                Err(classify(&e))
            }
        }
    }
}

/// 永久性 55x 回复视为收件人被拒，其余都是传输失败
fn classify(err: &lettre::transport::smtp::Error) -> TransportError {
    if is_rejection(err.is_permanent(), err.status()) {
        TransportError::Rejected(err.to_string())
    } else {
        TransportError::Failed(err.to_string())
    }
}

fn is_rejection(permanent: bool, status: Option<Code>) -> bool {
    permanent
        && status.is_some_and(|code| {
            code.severity == Severity::PermanentNegativeCompletion && code.category == Category::MailSystem
        })
}
