//! UseCase: 参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinParticipantUseCase::execute() メソッド
//! - Registry への登録と、参加通知・参加人数のブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - 参加通知は新規参加者自身を含む全員に届く必要がある
//! - 参加人数は登録後の人数で通知される必要がある
//!
//! ### どのような状況を想定しているか
//! - 正常系：最初の参加者、既存参加者がいる状態での参加
//! - エッジケース：同じ表示名の参加者が複数参加

use std::sync::Arc;

use hiroba_shared::time::Clock;
use metrics::{counter, gauge};

use crate::{
    domain::{
        Broadcaster, ChatEvent, FrameSink, JoinRequest, Participant, ParticipantIdFactory,
        ParticipantRegistry, Timestamp,
    },
    metrics::{JOINS_TOTAL, PARTICIPANTS_ACTIVE},
};

use super::error::JoinError;

/// 参加のユースケース
pub struct JoinParticipantUseCase {
    /// Registry（参加者集合の抽象化）
    registry: Arc<dyn ParticipantRegistry>,
    /// Broadcaster（全参加者への配信）
    broadcaster: Arc<Broadcaster>,
    /// Clock（参加時刻の取得）
    clock: Arc<dyn Clock>,
}

impl JoinParticipantUseCase {
    /// 新しい JoinParticipantUseCase を作成
    pub fn new(
        registry: Arc<dyn ParticipantRegistry>,
        broadcaster: Arc<Broadcaster>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            broadcaster,
            clock,
        }
    }

    /// 参加を実行
    ///
    /// # Arguments
    ///
    /// * `request` - 検証済みの参加リクエスト
    /// * `connection` - 参加者の送信側コネクション（以後 Participant が所有する）
    ///
    /// # Returns
    ///
    /// * `Ok(Arc<Participant>)` - 登録済みの参加者
    /// * `Err(JoinError)` - 登録失敗
    pub async fn execute(
        &self,
        request: JoinRequest,
        connection: Box<dyn FrameSink>,
    ) -> Result<Arc<Participant>, JoinError> {
        let JoinRequest {
            display_name,
            category,
        } = request;

        // 1. 参加者を作成して Registry に登録
        let joined_at = Timestamp::new(self.clock.now_millis());
        let participant = Arc::new(Participant::new(
            ParticipantIdFactory::generate(),
            display_name.clone(),
            category,
            joined_at,
            connection,
        ));
        if let Err(e) = self.registry.add(participant.clone()).await {
            // 登録できなかった参加者のコネクションはここで閉じる
            if let Err(close_error) = participant.close(self.broadcaster.write_timeout()).await {
                tracing::debug!("Failed to close unregistered connection: {}", close_error);
            }
            return Err(e.into());
        }

        counter!(JOINS_TOTAL).increment(1);
        gauge!(PARTICIPANTS_ACTIVE).set(self.registry.count().await as f64);
        tracing::info!(
            "Participant '{}' ({}) joined as {}",
            display_name,
            category,
            participant.id()
        );

        // 2. 参加通知（新規参加者自身を含む全員）
        let event = ChatEvent::ParticipantJoined {
            name: display_name,
            category,
            joined_at,
        };
        self.broadcaster
            .broadcast(&event, self.registry.as_ref())
            .await;

        // 3. 参加人数の通知
        self.broadcaster
            .broadcast_presence_count(self.registry.as_ref())
            .await;

        Ok(participant)
    }
}
