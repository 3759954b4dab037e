//! # Certificate Mailer
//!
//! 批量生成带验证二维码的参会证书，并逐一通过邮件发送
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有外部资源，只暴露能力
//! - `FontBook` - 字体候选链，内置点阵字体兜底
//! - `write_canvas` - 证书落盘（PDF / PNG）
//! - `SmtpMailer` - SMTP 发送能力（`MailTransport`）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单条记录
//! - `make_token` - 令牌生成
//! - `CertificateRenderer` - 证书渲染
//! - `NotificationDispatcher` - 邮件投递
//! - `resolve` - 验证文案（有损还原）
//! - `ArtifactStore` / `ReportWriter` - 证书下载、报告写入
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一条记录"的完整处理流程
//! - `RecordCtx` - 上下文封装（序号 + 行号）
//! - `CertificateFlow` - 流程编排（coerce → render → deliver）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批次处理与应用生命周期
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{MailTransport, SmtpMailer, TransportError};
pub use models::{BatchJob, BatchResultRow, DeliveryOutcome, ParticipantRecord, RawRecord, SenderCredentials, Token};
pub use orchestrator::{App, BatchProcessor};
pub use services::{make_token, resolve, CertificateRender, CertificateRenderer, NotificationDispatcher};
pub use workflow::{CertificateFlow, RecordCtx};
