//! 证书处理流程 - 流程层
//!
//! 核心职责：定义"一条记录"的完整处理流程
//!
//! 流程顺序：
//! 1. 字段转换（失败 → Row read error，跳过）
//! 2. 渲染证书（失败 → Certificate error，邮件 Skipped）
//! 3. 发送邮件（结果原样记录）
//!
//! 任何一步失败都只体现在本记录的结果行中，不会返回错误。

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::error::RenderError;
use crate::infrastructure::MailTransport;
use crate::models::{BatchJob, BatchResultRow, CertificateArtifact, RawRecord, SenderCredentials};
use crate::services::{CertificateRender, NotificationDispatcher};
use crate::utils::logging::truncate_text;
use crate::workflow::record_ctx::RecordCtx;

/// 证书处理流程
///
/// - 编排单条记录的渲染与投递
/// - 不持有批次结果，只返回本记录的结果行
pub struct CertificateFlow<R, T> {
    renderer: Arc<R>,
    dispatcher: NotificationDispatcher<T>,
}

impl<R, T> CertificateFlow<R, T>
where
    R: CertificateRender,
    T: MailTransport,
{
    pub fn new(renderer: R, dispatcher: NotificationDispatcher<T>) -> Self {
        Self {
            renderer: Arc::new(renderer),
            dispatcher,
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn dispatcher(&self) -> &NotificationDispatcher<T> {
        &self.dispatcher
    }

    pub async fn run(
        &self,
        raw: &RawRecord,
        job: &BatchJob,
        credentials: Option<&SenderCredentials>,
        ctx: &RecordCtx,
    ) -> BatchResultRow {
        // ========== 1. 字段转换 ==========
        let record = match raw.coerce() {
            Ok(record) => record,
            Err(e) => {
                warn!("{} ⚠️ 行读取失败: {}", ctx, e);
                return BatchResultRow::unreadable(&e);
            }
        };
        info!("{} 姓名: {} | 邮箱: {}", ctx, truncate_text(&record.name, 40), record.email);

        // ========== 2. 渲染证书 ==========
        let artifact = match self.render(&record.name, job).await {
            Ok(artifact) => artifact,
            Err(e) => {
                error!("{} ❌ 证书生成失败: {}", ctx, e);
                return BatchResultRow::render_failed(&record, &e);
            }
        };

        // ========== 3. 发送邮件 ==========
        let outcome = self
            .dispatcher
            .deliver(&record.email, &artifact.path, credentials)
            .await;
        if !outcome.is_sent() {
            warn!("{} ⚠️ {}", ctx, outcome);
        }

        BatchResultRow::delivered(&record, &artifact, &outcome)
    }

    /// 在阻塞线程池中渲染
    async fn render(&self, name: &str, job: &BatchJob) -> Result<CertificateArtifact, RenderError> {
        let renderer = Arc::clone(&self.renderer);
        let name = name.to_string();
        let job = job.clone();

        tokio::task::spawn_blocking(move || renderer.render(&name, &job.event_name, &job.event_date, &job.base_url))
            .await
            .unwrap_or_else(|e| Err(RenderError::Aborted(e.to_string())))
    }
}
