//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 送信者を含む全参加者へのブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - 送信者には own、他の参加者には other として描画される必要がある
//! - 送信者名と種別はクライアントの申告ではなく参加時の値を使う
//!
//! ### どのような状況を想定しているか
//! - 正常系：複数参加者へのブロードキャスト
//! - エッジケース：送信者のみが参加している場合
//! - 異常系：一部の参加者への書き込み失敗

use std::sync::Arc;

use hiroba_shared::time::Clock;
use metrics::counter;

use crate::{
    domain::{
        Broadcaster, ChatEvent, DeliveryReport, MessageBody, Participant, ParticipantRegistry,
        Timestamp,
    },
    metrics::MESSAGES_TOTAL,
};

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// Registry（参加者集合の抽象化）
    registry: Arc<dyn ParticipantRegistry>,
    /// Broadcaster（全参加者への配信）
    broadcaster: Arc<Broadcaster>,
    /// Clock（送信時刻の取得）
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
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

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `sender` - 送信者（参加済みの Participant）
    /// * `body` - メッセージ本文（検証なし）
    ///
    /// # Returns
    ///
    /// 受信者ごとの配信結果
    pub async fn execute(&self, sender: &Participant, body: MessageBody) -> DeliveryReport {
        let event = ChatEvent::MessagePosted {
            sender_id: sender.id(),
            sender_name: sender.display_name().clone(),
            sender_category: sender.category(),
            body,
            posted_at: Timestamp::new(self.clock.now_millis()),
        };

        let report = self
            .broadcaster
            .broadcast(&event, self.registry.as_ref())
            .await;

        counter!(MESSAGES_TOTAL, "category" => sender.category().as_str()).increment(1);
        tracing::debug!(
            "Message from '{}' delivered to {}/{} participants",
            sender.display_name(),
            report.delivered(),
            report.attempts()
        );

        report
    }
}
