//! UseCase: 退出処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - LeaveParticipantUseCase::execute() メソッド
//! - Registry からの削除、退出通知、人数通知、コネクションのクローズ
//!
//! ### なぜこのテストが必要か
//! - 退出処理は 1 コネクションにつき 1 回だけ行われる必要がある
//! - 退出後のブロードキャストに退出者が含まれてはならない
//!
//! ### どのような状況を想定しているか
//! - 正常系：残りの参加者への退出通知
//! - エッジケース：同じ参加者の二重退出、最後の参加者の退出

use std::sync::Arc;

use hiroba_shared::time::Clock;
use metrics::gauge;

use crate::{
    domain::{
        Broadcaster, ChatEvent, DeliveryReport, Participant, ParticipantRegistry, Timestamp,
    },
    metrics::PARTICIPANTS_ACTIVE,
};

/// 退出処理の結果
#[derive(Debug)]
pub struct LeaveReport {
    /// 退出時刻
    pub left_at: Timestamp,
    /// 退出通知の配信結果
    pub departure: DeliveryReport,
    /// 人数通知の配信結果
    pub presence: DeliveryReport,
}

/// 退出のユースケース
pub struct LeaveParticipantUseCase {
    /// Registry（参加者集合の抽象化）
    registry: Arc<dyn ParticipantRegistry>,
    /// Broadcaster（残りの参加者への配信）
    broadcaster: Arc<Broadcaster>,
    /// Clock（退出時刻の取得）
    clock: Arc<dyn Clock>,
}

impl LeaveParticipantUseCase {
    /// 新しい LeaveParticipantUseCase を作成
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

    /// 退出を実行
    ///
    /// # Arguments
    ///
    /// * `participant` - 退出する参加者
    ///
    /// # Returns
    ///
    /// * `Some(LeaveReport)` - 退出処理を行った
    /// * `None` - すでに退出済み（何もしない）
    pub async fn execute(&self, participant: &Arc<Participant>) -> Option<LeaveReport> {
        // 1. 退出を記録（最初の 1 回だけ成功する）
        let left_at = Timestamp::new(self.clock.now_millis());
        if !participant.mark_left(left_at) {
            tracing::debug!("Participant {} already left", participant.id());
            return None;
        }

        // 2. Registry から削除（以降のスナップショットに含まれない）
        self.registry.remove(&participant.id()).await;
        gauge!(PARTICIPANTS_ACTIVE).set(self.registry.count().await as f64);
        tracing::info!(
            "Participant '{}' ({}) left",
            participant.display_name(),
            participant.id()
        );

        // 3. 残りの参加者へ退出通知と人数通知
        let event = ChatEvent::ParticipantLeft {
            name: participant.display_name().clone(),
            category: participant.category(),
            left_at,
        };
        let departure = self
            .broadcaster
            .broadcast(&event, self.registry.as_ref())
            .await;
        let presence = self
            .broadcaster
            .broadcast_presence_count(self.registry.as_ref())
            .await;

        // 4. コネクションを閉じる
        if let Err(e) = participant.close(self.broadcaster.write_timeout()).await {
            tracing::debug!(
                "Connection of {} was not closed cleanly: {}",
                participant.id(),
                e
            );
        }

        Some(LeaveReport {
            left_at,
            departure,
            presence,
        })
    }
}
