//! UseCase: 参加者一覧の取得

use std::sync::Arc;

use crate::domain::{Participant, ParticipantRegistry};

/// 現在の参加者一覧を取得するユースケース
pub struct GetPresenceUseCase {
    registry: Arc<dyn ParticipantRegistry>,
}

impl GetPresenceUseCase {
    /// 新しい GetPresenceUseCase を作成
    pub fn new(registry: Arc<dyn ParticipantRegistry>) -> Self {
        Self { registry }
    }

    /// 参加順（同時刻は ID 順）に並べた参加者のスナップショットを返す
    pub async fn execute(&self) -> Vec<Arc<Participant>> {
        let mut participants = self.registry.snapshot().await;
        participants.sort_by_key(|p| (p.joined_at(), p.id()));
        participants
    }
}
