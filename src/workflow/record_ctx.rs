//! 记录处理上下文
//!
//! 封装"我正在处理批次中的第几条记录"这一信息

use std::fmt::Display;

/// 记录处理上下文
#[derive(Debug, Clone, Copy)]
pub struct RecordCtx {
    /// 记录在批次中的序号（从1开始，仅用于日志显示）
    pub index: usize,

    /// 批次记录总数
    pub total: usize,

    /// 在源文件中的行号
    pub line: u64,
}

impl RecordCtx {
    pub fn new(index: usize, total: usize, line: u64) -> Self {
        Self { index, total, line }
    }
}

impl Display for RecordCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[记录 {}/{} 行#{}]", self.index, self.total, self.line)
    }
}
