//! UseCase errors.

use thiserror::Error;

use crate::domain::RegistryError;

/// 参加処理のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    /// Registry への登録に失敗（ID 生成の論理エラー）
    #[error("failed to register participant: {0}")]
    Registry(#[from] RegistryError),
}
