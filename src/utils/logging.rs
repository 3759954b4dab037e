/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use tracing::info;

use crate::config::Config;
use crate::models::BatchSummary;
use crate::workflow::RecordCtx;

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 证书批量生成与发送");
    info!("🎫 活动: {} ({})", config.event_name, config.event_date);
    info!("📂 模板: {} → 输出目录: {}", config.template_path, config.output_dir);
    info!("✉️ SMTP: {}:{}", config.smtp_host, config.smtp_port);
    info!("{}", "=".repeat(60));
}

/// 记录参与者加载信息
///
/// # 参数
/// - `total`: 记录总数
/// - `input_file`: 输入文件路径
pub fn log_records_loaded(total: usize, input_file: &str) {
    info!("✓ 从 {} 读取到 {} 条参与者记录", input_file, total);
    info!("📋 将逐条生成证书并发送邮件\n");
}

/// 记录单条记录开始处理
pub fn log_record_start(ctx: &RecordCtx) {
    info!("\n{}", "─".repeat(60));
    info!("{} 开始处理", ctx);
}

/// 打印最终统计信息
pub fn print_final_stats(summary: &BatchSummary) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("🖨️ 证书生成: {}/{}", summary.generated, summary.total);
    info!("✅ 邮件发送成功: {}/{}", summary.sent, summary.total);
    info!("❌ 发送失败: {}", summary.failed);
    info!("⏭️ 跳过: {}", summary.skipped);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("Ada", 10), "Ada");
        assert_eq!(truncate_text("李雷和韩梅梅", 2), "李雷...");
    }
}
