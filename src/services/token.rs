//! 令牌生成 - 业务能力层

use uuid::Uuid;

use crate::models::Token;

/// 随机后缀的十六进制位数
pub const SUFFIX_LEN: usize = 8;

/// 由姓名生成令牌
///
/// 去掉首尾空白，`[A-Za-z0-9_.-]` 之外的每个字符替换为 `_`，
/// 再追加 `_` 和 8 位随机十六进制后缀。前缀可读，后缀保证同名记录也不会冲突。
/// 空字符串同样得到合法令牌（只有后缀）。
pub fn make_token(name: &str) -> Token {
    let prefix = sanitize(name);
    let uuid = Uuid::new_v4().simple().to_string();
    let suffix = &uuid[..SUFFIX_LEN];
    Token::from_safe(format!("{}_{}", prefix, suffix))
}

/// 文件名安全化
pub fn sanitize(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
