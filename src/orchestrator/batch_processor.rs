//! 批量证书处理器 - 编排层
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：解析字体、创建输出目录、组装渲染与投递服务
//! 2. **批量加载**：读取参与者 CSV（格式错误时整批中止）
//! 3. **顺序处理**：逐条委托 `CertificateFlow`，不并发
//! 4. **结果汇总**：写出 JSON 报告并输出全局统计

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::{FontBook, MailTransport, SmtpMailer};
use crate::models::{self, BatchJob, BatchResultRow, BatchSummary, RawRecord, SenderCredentials};
use crate::services::{CertificateRender, CertificateRenderer, NotificationDispatcher, ReportWriter};
use crate::utils::logging;
use crate::workflow::{CertificateFlow, RecordCtx};

/// 批次处理器
pub struct BatchProcessor<R, T> {
    flow: CertificateFlow<R, T>,
}

impl<R, T> BatchProcessor<R, T>
where
    R: CertificateRender,
    T: MailTransport,
{
    pub fn new(flow: CertificateFlow<R, T>) -> Self {
        Self { flow }
    }

    pub fn flow(&self) -> &CertificateFlow<R, T> {
        &self.flow
    }

    /// 处理整个批次
    ///
    /// 返回的结果行与 `records` 一一对应、顺序一致。
    pub async fn process_batch(
        &self,
        records: &[RawRecord],
        job: &BatchJob,
        credentials: Option<&SenderCredentials>,
    ) -> Vec<BatchResultRow> {
        let total = records.len();
        let mut results = Vec::with_capacity(total);

        for (idx, raw) in records.iter().enumerate() {
            let ctx = RecordCtx::new(idx + 1, total, raw.line);
            logging::log_record_start(&ctx);

            let row = self.flow.run(raw, job, credentials, &ctx).await;
            results.push(row);
        }

        results
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    processor: BatchProcessor<CertificateRenderer, SmtpMailer>,
    report_writer: ReportWriter,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        logging::log_startup(&config);

        if config.sender.is_none() && config.batch_sender.is_none() {
            warn!("⚠️ 未设置 SENDER_EMAIL / SENDER_PASSWORD，也没有批次凭据，邮件将全部标记为失败");
        }

        std::fs::create_dir_all(&config.output_dir)
            .with_context(|| format!("无法创建输出目录: {}", config.output_dir))?;

        // 字体只在启动时解析一次
        let (preferred, secondary) = config.font_paths();
        let fonts = FontBook::resolve(preferred.as_deref(), secondary.as_deref());

        let renderer = CertificateRenderer::from_config(&config, fonts);
        let dispatcher = NotificationDispatcher::new(SmtpMailer::from_config(&config), config.sender.clone());
        let processor = BatchProcessor::new(CertificateFlow::new(renderer, dispatcher));
        let report_writer = ReportWriter::new(config.report_file.clone());

        Ok(Self {
            config,
            processor,
            report_writer,
        })
    }

    /// 本次运行的证书参数
    pub fn job(&self) -> BatchJob {
        BatchJob::new(
            self.config.event_name.clone(),
            self.config.event_date.clone(),
            self.config.base_url.clone(),
        )
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<BatchSummary> {
        let records = self.load_records()?;

        if records.is_empty() {
            warn!("⚠️ CSV 中没有参与者记录");
        }
        logging::log_records_loaded(records.len(), &self.config.input_file);

        let job = self.job();
        let rows = self
            .processor
            .process_batch(&records, &job, self.config.batch_sender.as_ref())
            .await;

        // 先输出统计，报告写入失败时结果仍留在日志中
        let summary = BatchSummary::from_rows(&rows);
        logging::print_final_stats(&summary);

        self.report_writer.write(&job, &rows).await.with_context(|| {
            format!(
                "批次已处理完成（证书 {}/{}，邮件 {}/{}），但报告写入失败",
                summary.generated, summary.total, summary.sent, summary.total
            )
        })?;
        info!("\n报告已保存至: {}", self.report_writer.path());

        Ok(summary)
    }

    /// 加载参与者
    fn load_records(&self) -> AppResult<Vec<RawRecord>> {
        info!("\n📁 正在读取参与者文件: {}", self.config.input_file);
        Ok(models::load_participants(Path::new(&self.config.input_file))?)
    }
}
