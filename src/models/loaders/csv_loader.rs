use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::InputFormatError;
use crate::models::participant::RawRecord;

const NAME_COLUMN: &str = "Name";
const EMAIL_COLUMN: &str = "Email";

/// 从 CSV 文件加载参与者行
///
/// 文件不可读、扩展名不对、缺少 `Name`/`Email` 列或 CSV 结构损坏时返回错误，
/// 此时整个批次不会开始处理。单行字段问题留给处理阶段。
pub fn load_participants(csv_path: &Path) -> Result<Vec<RawRecord>, InputFormatError> {
    let is_csv = csv_path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return Err(InputFormatError::NotCsv {
            path: csv_path.display().to_string(),
        });
    }

    let file = File::open(csv_path).map_err(|source| InputFormatError::Unreadable {
        path: csv_path.display().to_string(),
        source,
    })?;

    let records = load_participants_from_reader(file)?;
    tracing::info!(
        "成功加载 {} 行参与者数据: {}",
        records.len(),
        csv_path.display()
    );
    Ok(records)
}

/// 从任意输入流加载参与者行
pub fn load_participants_from_reader<R: Read>(reader: R) -> Result<Vec<RawRecord>, InputFormatError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = reader.byte_headers()?.clone();
    let position = |column: &str| headers.iter().position(|h| h == column.as_bytes());
    let (name_idx, email_idx) = match (position(NAME_COLUMN), position(EMAIL_COLUMN)) {
        (Some(name_idx), Some(email_idx)) => (name_idx, email_idx),
        _ => {
            return Err(InputFormatError::MissingColumns {
                required: vec![NAME_COLUMN, EMAIL_COLUMN],
            })
        }
    };

    let mut records = Vec::new();
    for row in reader.byte_records() {
        let row = row?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        records.push(RawRecord {
            line,
            name: row.get(name_idx).map(<[u8]>::to_vec),
            email: row.get(email_idx).map(<[u8]>::to_vec),
        });
    }

    tracing::debug!("CSV 表头: {:?}, 数据行: {}", headers, records.len());
    Ok(records)
}
