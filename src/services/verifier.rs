//! 证书验证 - 业务能力层
//!
//! 注意：这里只是把令牌"反向"还原成可读姓名，不查询任何记录。
//! 令牌生成时的字符替换是多对一的，标点和非 ASCII 字符无法恢复
//! （`Bob!!` 会显示为 `Bob`），这是预期的有损行为，不是权威校验。

use std::sync::OnceLock;

use regex::Regex;

use crate::services::token::SUFFIX_LEN;

fn suffix_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(&format!("_[0-9a-f]{{{}}}$", SUFFIX_LEN)).ok())
        .as_ref()
}

/// 从令牌还原展示用姓名（有损）
pub fn display_name(token: &str) -> String {
    let prefix = match suffix_pattern() {
        Some(re) => re.replace(token, "").into_owned(),
        None => token.to_string(),
    };
    prefix.replace('_', " ").trim().to_string()
}

/// 生成验证页面文案，供 `/verify/{token}` 使用
pub fn resolve(token: &str) -> String {
    format!(
        "Certificate Verified! This certifies that {} successfully attended the event.",
        display_name(token)
    )
}
