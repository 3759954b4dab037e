use std::fmt;

use crate::error::CoercionError;

/// 参与者记录（姓名 + 邮箱，均已去除首尾空白且非空）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantRecord {
    pub name: String,
    pub email: String,
}

impl ParticipantRecord {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// 未经转换的输入行
///
/// 字段保持原始字节，转换推迟到处理该行时进行，
/// 这样单行的编码问题不会影响整个批次。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// 在源文件中的行号（表头为第 1 行）
    pub line: u64,
    pub name: Option<Vec<u8>>,
    pub email: Option<Vec<u8>>,
}

impl RawRecord {
    /// 由已知字符串构造（测试和程序内调用使用）
    pub fn from_pair(line: u64, name: &str, email: &str) -> Self {
        Self {
            line,
            name: Some(name.as_bytes().to_vec()),
            email: Some(email.as_bytes().to_vec()),
        }
    }

    /// 转换为参与者记录
    pub fn coerce(&self) -> Result<ParticipantRecord, CoercionError> {
        let name = coerce_field("Name", self.name.as_deref(), self.line)?;
        let email = coerce_field("Email", self.email.as_deref(), self.line)?;
        Ok(ParticipantRecord { name, email })
    }
}

fn coerce_field(field: &'static str, raw: Option<&[u8]>, line: u64) -> Result<String, CoercionError> {
    let raw = raw.ok_or(CoercionError::MissingField { field, line })?;
    let text = std::str::from_utf8(raw).map_err(|_| CoercionError::InvalidUtf8 { field, line })?;
    let text = text.trim();
    if text.is_empty() {
        return Err(CoercionError::Empty { field, line });
    }
    Ok(text.to_string())
}

/// 发件人凭据
#[derive(Clone, PartialEq, Eq)]
pub struct SenderCredentials {
    pub email: String,
    pub password: String,
}

impl SenderCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// 两部分都非空时才构成凭据
    pub fn from_parts(email: Option<String>, password: Option<String>) -> Option<Self> {
        match (email, password) {
            (Some(email), Some(password)) => Some(Self { email, password }).filter(Self::is_complete),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.is_empty()
    }
}

// 避免在日志中打印密码
impl fmt::Debug for SenderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SenderCredentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// 一个批次的证书参数
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub event_name: String,
    pub event_date: String,
    pub base_url: String,
}

impl BatchJob {
    pub fn new(
        event_name: impl Into<String>,
        event_date: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            event_name: event_name.into(),
            event_date: event_date.into(),
            base_url: base_url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_trims_fields() {
        let raw = RawRecord::from_pair(2, "  Ada Lovelace ", " ada@example.com");
        let record = raw.coerce().unwrap();
        assert_eq!(record, ParticipantRecord::new("Ada Lovelace", "ada@example.com"));
    }

    #[test]
    fn test_coerce_reports_missing_email() {
        let raw = RawRecord {
            line: 4,
            name: Some(b"Ada".to_vec()),
            email: None,
        };
        assert_eq!(
            raw.coerce().unwrap_err(),
            CoercionError::MissingField { field: "Email", line: 4 }
        );
    }

    #[test]
    fn test_coerce_rejects_invalid_utf8() {
        let raw = RawRecord {
            line: 3,
            name: Some(vec![0xff, 0xfe]),
            email: Some(b"x@example.com".to_vec()),
        };
        assert_eq!(
            raw.coerce().unwrap_err(),
            CoercionError::InvalidUtf8 { field: "Name", line: 3 }
        );
    }

    #[test]
    fn test_coerce_rejects_blank_name() {
        let raw = RawRecord::from_pair(5, "   ", "x@example.com");
        assert!(matches!(raw.coerce(), Err(CoercionError::Empty { field: "Name", .. })));
    }

    #[test]
    fn test_credentials_need_both_parts() {
        assert!(SenderCredentials::from_parts(Some("a@b.c".into()), None).is_none());
        assert!(SenderCredentials::from_parts(Some("".into()), Some("pw".into())).is_none());
        assert!(SenderCredentials::from_parts(Some("a@b.c".into()), Some("pw".into())).is_some());
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = SenderCredentials::new("a@b.c", "hunter2");
        assert!(!format!("{:?}", creds).contains("hunter2"));
    }
}
