//! Registry trait 定義
//!
//! 接続中の参加者集合へのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use std::sync::Arc;

use async_trait::async_trait;

use super::{entity::Participant, error::RegistryError, value_object::ParticipantId};

/// Participant Registry trait
///
/// 参加と退出のたびに変更される、接続中の参加者の集合。
/// 実装はロックを追加・削除・スナップショットのコピーの間だけ保持し、
/// ネットワーク書き込みの間は決して保持しない。
#[async_trait]
pub trait ParticipantRegistry: Send + Sync {
    /// 参加者を追加（ID が既に存在する場合のみ失敗）
    async fn add(&self, participant: Arc<Participant>) -> Result<(), RegistryError>;

    /// 参加者を削除（存在しない場合は何もしない）
    async fn remove(&self, id: &ParticipantId) -> Option<Arc<Participant>>;

    /// 現在の参加者のコピーを取得
    async fn snapshot(&self) -> Vec<Arc<Participant>>;

    /// 現在の参加者数を取得
    async fn count(&self) -> usize;
}
