//! 证书下载 - 业务能力层

use std::path::PathBuf;

use tracing::debug;

use crate::error::ArtifactError;
use crate::models::artifact::is_safe;

/// 证书文件读取，供下载接口使用
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 按文件名读取证书
    ///
    /// 只接受输出目录下的直接文件名，拒绝 `..`、路径分隔符等。
    pub async fn fetch(&self, file_name: &str) -> Result<Vec<u8>, ArtifactError> {
        if file_name.is_empty() || file_name == "." || file_name == ".." || !is_safe(file_name) {
            return Err(ArtifactError::InvalidName(file_name.to_string()));
        }

        let path = self.root.join(file_name);
        debug!("读取证书: {}", path.display());
        tokio::fs::read(&path).await.map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => ArtifactError::NotFound(file_name.to_string()),
            _ => ArtifactError::ReadFailed {
                name: file_name.to_string(),
                source,
            },
        })
    }
}
