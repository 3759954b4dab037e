//! 报告写入服务 - 业务能力层
//!
//! 只负责"把批次结果写成 JSON 报告"，不关心结果从何而来。

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use crate::models::{BatchJob, BatchResultRow, BatchSummary};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchReport<'a> {
    generated_at: String,
    event_name: &'a str,
    event_date: &'a str,
    summary: BatchSummary,
    rows: &'a [BatchResultRow],
}

/// 报告写入服务
pub struct ReportWriter {
    report_file_path: String,
}

impl ReportWriter {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            report_file_path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.report_file_path
    }

    /// 写入报告（覆盖已有文件）
    pub async fn write(&self, job: &BatchJob, rows: &[BatchResultRow]) -> Result<BatchSummary> {
        let summary = BatchSummary::from_rows(rows);
        let report = BatchReport {
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            event_name: &job.event_name,
            event_date: &job.event_date,
            summary,
            rows,
        };

        let json = serde_json::to_string_pretty(&report).context("序列化批次报告失败")?;
        tokio::fs::write(&self.report_file_path, json)
            .await
            .with_context(|| format!("无法写入报告文件: {}", self.report_file_path))?;

        debug!("报告已写入: {} ({} 行)", self.report_file_path, rows.len());
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoercionError;

    #[tokio::test]
    async fn test_report_contains_rows_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let writer = ReportWriter::new(path.to_string_lossy());
        let job = BatchJob::new("Hackathon 2025", "Oct 3, 2025", "http://x");
        let rows = vec![
            BatchResultRow::unreadable(&CoercionError::Empty { field: "Name", line: 2 }),
            BatchResultRow::unreadable(&CoercionError::Empty { field: "Email", line: 3 }),
        ];

        let summary = writer.write(&job, &rows).await.unwrap();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.skipped, 2);

        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["eventName"], "Hackathon 2025");
        assert_eq!(json["summary"]["total"], 2);
        assert_eq!(json["rows"][1]["certStatus"], "Row read error: Email on line 3 is empty");
        assert!(json["rows"][0]["certFilename"].is_null());
    }

    #[tokio::test]
    async fn test_unwritable_report_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("report.json");
        let writer = ReportWriter::new(path.to_string_lossy());
        let job = BatchJob::new("E", "D", "http://x");

        assert!(writer.write(&job, &[]).await.is_err());
    }
}
