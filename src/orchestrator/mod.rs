//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批次调度和统计，是整个系统的"指挥中心"。
//!
//! ### `batch_processor`
//! - `BatchProcessor`：按输入顺序逐条调用 `CertificateFlow`，收集结果行
//! - `App`：管理应用生命周期（初始化、加载 CSV、处理、写报告、统计）
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<RawRecord>)
//!     ↓
//! workflow::CertificateFlow (处理单条记录)
//!     ↓
//! services (能力层：render / deliver / report)
//!     ↓
//! infrastructure (基础设施：fonts / artifact_writer / mailer)
//! ```
//!
//! ## 设计原则
//!
//! 1. **逐条处理**：一条记录渲染并发送完成后才开始下一条
//! 2. **故障隔离**：单条记录失败只影响自己的结果行
//! 3. **一进一出**：输入多少条记录，输出多少行结果，顺序不变

pub mod batch_processor;

pub use batch_processor::{App, BatchProcessor};
