//! UseCase: コネクションごとの参加状態の遷移
//!
//! 1 本のコネクションは `Connecting → Joined → Closed`（または
//! `Connecting → Closed`）の順にだけ遷移します。最初のフレームは参加リクエスト、
//! 以降のフレームはチャットメッセージとして扱います。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - PresenceLifecycle::run() メソッド
//! - 参加リクエストの検証、メッセージループ、退出処理の一連の流れ
//!
//! ### なぜこのテストが必要か
//! - 拒否されたコネクションが Registry に現れないことを保証
//! - どの終わり方（切断、通信エラー、不正フレーム）でも退出処理が 1 回だけ走ることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：2 人の参加、メッセージ、片方の切断
//! - 異常系：不正な JSON、必須項目の欠落、未知の種別、長すぎる表示名
//! - エッジケース：参加前の切断、参加後の不正フレーム、通信エラー

use std::{fmt, sync::Arc, time::Duration};

use metrics::counter;

use crate::{
    domain::{FrameSink, FrameSource, JoinRejection, ParticipantId, TransportError},
    infrastructure::dto::conversion::{
        decode_chat_message, decode_join_request, encode_error_frame,
    },
    metrics::JOIN_REJECTIONS_TOTAL,
};

use super::{
    error::JoinError, join_participant::JoinParticipantUseCase,
    leave_participant::LeaveParticipantUseCase, send_message::SendMessageUseCase,
};

/// コネクションの参加状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceState {
    /// 接続済み、参加リクエスト待ち
    Connecting,
    /// Registry に登録済み
    Joined,
    /// 終了（再参加なし）
    Closed,
}

impl PresenceState {
    /// `self` から `next` への遷移が許されるか
    pub fn can_transition_to(self, next: PresenceState) -> bool {
        matches!(
            (self, next),
            (Self::Connecting, Self::Joined)
                | (Self::Connecting, Self::Closed)
                | (Self::Joined, Self::Closed)
        )
    }
}

impl fmt::Display for PresenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Connecting => "connecting",
            Self::Joined => "joined",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// 参加後のセッションが終わった理由
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveReason {
    /// ピアがコネクションを閉じた
    PeerClosed,
    /// 読み込み中の通信エラー
    Transport(TransportError),
    /// チャットメッセージとして解釈できないフレーム
    MalformedFrame(String),
}

/// セッションの終わり方
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// 参加リクエストを受け取る前に切断された
    Abandoned,
    /// 参加リクエストが拒否された
    Rejected(JoinRejection),
    /// Registry への登録に失敗した
    JoinFailed(JoinError),
    /// 参加後に退出した
    Left(LeaveReason),
}

/// セッション全体の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    /// 参加した場合の参加者 ID
    pub participant_id: Option<ParticipantId>,
    /// 終わり方
    pub end: SessionEnd,
    /// ブロードキャストしたメッセージ数（描画に失敗して破棄したものは含まない）
    pub messages: usize,
}

impl SessionOutcome {
    fn before_join(end: SessionEnd) -> Self {
        Self {
            participant_id: None,
            end,
            messages: 0,
        }
    }
}

/// 現在の状態を保持し、遷移をログに残す
struct StateMachine {
    state: PresenceState,
}

impl StateMachine {
    fn new() -> Self {
        Self {
            state: PresenceState::Connecting,
        }
    }

    fn advance(&mut self, next: PresenceState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid presence transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!("Presence state {} -> {}", self.state, next);
        self.state = next;
    }
}

/// コネクション 1 本分の参加状態を駆動するユースケース
pub struct PresenceLifecycle {
    join_participant_usecase: Arc<JoinParticipantUseCase>,
    send_message_usecase: Arc<SendMessageUseCase>,
    leave_participant_usecase: Arc<LeaveParticipantUseCase>,
    /// 参加前のエラーフレーム送信とクローズの待ち時間
    write_timeout: Duration,
}

impl PresenceLifecycle {
    /// 新しい PresenceLifecycle を作成
    pub fn new(
        join_participant_usecase: Arc<JoinParticipantUseCase>,
        send_message_usecase: Arc<SendMessageUseCase>,
        leave_participant_usecase: Arc<LeaveParticipantUseCase>,
        write_timeout: Duration,
    ) -> Self {
        Self {
            join_participant_usecase,
            send_message_usecase,
            leave_participant_usecase,
            write_timeout,
        }
    }

    /// コネクションが閉じるまでセッションを実行
    ///
    /// # Arguments
    ///
    /// * `source` - 受信側（このタスクが所有する）
    /// * `sink` - 送信側（参加成功後は Participant が所有する）
    ///
    /// # Returns
    ///
    /// セッションの終わり方と、参加した場合の参加者 ID
    pub async fn run<S: FrameSource>(
        &self,
        mut source: S,
        mut sink: Box<dyn FrameSink>,
    ) -> SessionOutcome {
        let mut machine = StateMachine::new();

        // 1. Connecting: 最初のフレームを参加リクエストとして扱う
        let frame = match source.next_frame().await {
            Some(Ok(frame)) => frame,
            Some(Err(e)) => {
                tracing::warn!("Connection failed before join: {}", e);
                machine.advance(PresenceState::Closed);
                return SessionOutcome::before_join(SessionEnd::Abandoned);
            }
            None => {
                tracing::debug!("Connection closed before join");
                machine.advance(PresenceState::Closed);
                return SessionOutcome::before_join(SessionEnd::Abandoned);
            }
        };

        let request = match decode_join_request(&frame) {
            Ok(request) => request,
            Err(rejection) => {
                self.reject(sink.as_mut(), &rejection).await;
                machine.advance(PresenceState::Closed);
                return SessionOutcome::before_join(SessionEnd::Rejected(rejection));
            }
        };

        let participant = match self
            .join_participant_usecase
            .execute(request, sink)
            .await
        {
            Ok(participant) => participant,
            Err(e) => {
                tracing::error!("Failed to join: {}", e);
                machine.advance(PresenceState::Closed);
                return SessionOutcome::before_join(SessionEnd::JoinFailed(e));
            }
        };
        machine.advance(PresenceState::Joined);

        // 2. Joined: 以降のフレームはすべてチャットメッセージ
        let mut messages = 0;
        let reason = loop {
            let frame = match source.next_frame().await {
                Some(Ok(frame)) => frame,
                Some(Err(e)) => {
                    tracing::warn!("Read from {} failed: {}", participant.id(), e);
                    break LeaveReason::Transport(e);
                }
                None => break LeaveReason::PeerClosed,
            };

            let dto = match decode_chat_message(&frame) {
                Ok(dto) => dto,
                Err(e) => {
                    tracing::warn!("Malformed frame from {}: {}", participant.id(), e);
                    break LeaveReason::MalformedFrame(e.to_string());
                }
            };
            if !dto.name.is_empty() && dto.name != participant.display_name().as_str() {
                tracing::debug!(
                    "Ignoring claimed name '{}' from {}",
                    dto.name,
                    participant.id()
                );
            }

            let report = self
                .send_message_usecase
                .execute(&participant, dto.into())
                .await;
            if report.render_error().is_none() {
                messages += 1;
            }
        };

        // 3. Closed: 退出処理
        self.leave_participant_usecase.execute(&participant).await;
        machine.advance(PresenceState::Closed);

        SessionOutcome {
            participant_id: Some(participant.id()),
            end: SessionEnd::Left(reason),
            messages,
        }
    }

    /// エラーフレームを送ってコネクションを閉じる
    async fn reject(&self, sink: &mut dyn FrameSink, rejection: &JoinRejection) {
        tracing::info!("Rejected join request: {}", rejection);
        counter!(JOIN_REJECTIONS_TOTAL, "reason" => rejection.wire_message()).increment(1);

        let frame = encode_error_frame(rejection);
        match tokio::time::timeout(self.write_timeout, sink.send_text(frame)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::debug!("Failed to send error frame: {}", e),
            Err(_) => tracing::debug!("Timed out sending error frame"),
        }
        if let Ok(Err(e)) = tokio::time::timeout(self.write_timeout, sink.close()).await {
            tracing::debug!("Failed to close rejected connection: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Broadcaster, ParticipantRegistry, RenderError, View, ViewRenderer},
        infrastructure::{
            connection::{ChannelFrameSink, ChannelFrameSource},
            registry::InMemoryParticipantRegistry,
        },
        test_support::{TextRenderer, create_broadcaster, create_clock, create_registry},
    };
    use tokio::{
        sync::mpsc::{UnboundedReceiver, UnboundedSender},
        task::JoinHandle,
    };

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 参加から退出までの一連の流れ
    // - 参加リクエストの拒否とエラーフレーム
    //
    // 【なぜこのテストが必要か】
    // - 個々のユースケースが正しくても、つなぎ方を誤ると退出漏れや
    //   拒否済みコネクションの登録が起こりうる
    //
    // 【どのようなシナリオをテストするか】
    // 1. alice と bob が参加し、alice の発言が own / other で届き、bob の切断が通知される
    // 2. 不正な JSON、欠落、未知の種別、長すぎる表示名は拒否され登録されない
    // 3. 参加後の不正フレーム、通信エラーでも退出処理が行われる
    // 4. 参加前の切断
    // ========================================

    fn create_lifecycle(registry: Arc<InMemoryParticipantRegistry>) -> Arc<PresenceLifecycle> {
        create_lifecycle_with(registry, create_broadcaster())
    }

    fn create_lifecycle_with(
        registry: Arc<InMemoryParticipantRegistry>,
        broadcaster: Arc<Broadcaster>,
    ) -> Arc<PresenceLifecycle> {
        let clock = create_clock();
        Arc::new(PresenceLifecycle::new(
            Arc::new(JoinParticipantUseCase::new(
                registry.clone(),
                broadcaster.clone(),
                clock.clone(),
            )),
            Arc::new(SendMessageUseCase::new(
                registry.clone(),
                broadcaster.clone(),
                clock.clone(),
            )),
            Arc::new(LeaveParticipantUseCase::new(
                registry,
                broadcaster.clone(),
                clock,
            )),
            broadcaster.write_timeout(),
        ))
    }

    type Peer = (
        UnboundedSender<Result<String, TransportError>>,
        UnboundedReceiver<String>,
        JoinHandle<SessionOutcome>,
    );

    fn connect(lifecycle: &Arc<PresenceLifecycle>) -> Peer {
        let (tx, source) = ChannelFrameSource::new();
        let (sink, rx) = ChannelFrameSink::new();
        let lifecycle = lifecycle.clone();
        let handle = tokio::spawn(async move { lifecycle.run(source, Box::new(sink)).await });
        (tx, rx, handle)
    }

    async fn run_single_frame(frame: &str) -> (SessionOutcome, Vec<String>, usize) {
        let registry = create_registry();
        let lifecycle = create_lifecycle(registry.clone());
        let (tx, mut rx, handle) = connect(&lifecycle);
        tx.send(Ok(frame.to_string())).unwrap();
        let outcome = handle.await.unwrap();
        let mut frames = Vec::new();
        while let Some(frame) = rx.recv().await {
            frames.push(frame);
        }
        (outcome, frames, registry.count().await)
    }

    #[tokio::test]
    async fn test_two_participants_chat_and_leave() {
        // テスト項目: 参加、発言、切断の一連の流れ
        // given (前提条件):
        let registry = create_registry();
        let lifecycle = create_lifecycle(registry.clone());
        let (alice_tx, mut alice_rx, alice_task) = connect(&lifecycle);
        alice_tx
            .send(Ok(r#"{"name":"alice","gender":"female"}"#.to_string()))
            .unwrap();
        assert_eq!(alice_rx.recv().await.unwrap(), "joined:alice");
        assert_eq!(alice_rx.recv().await.unwrap(), "presence-count:1");

        let (bob_tx, mut bob_rx, bob_task) = connect(&lifecycle);
        bob_tx
            .send(Ok(r#"{"name":"bob","gender":"male"}"#.to_string()))
            .unwrap();
        assert_eq!(alice_rx.recv().await.unwrap(), "joined:bob");
        assert_eq!(alice_rx.recv().await.unwrap(), "presence-count:2");
        assert_eq!(bob_rx.recv().await.unwrap(), "joined:bob");
        assert_eq!(bob_rx.recv().await.unwrap(), "presence-count:2");

        // when (操作): alice が発言する
        alice_tx
            .send(Ok(r#"{"name":"alice","message":"hi"}"#.to_string()))
            .unwrap();

        // then (期待する結果):
        assert_eq!(alice_rx.recv().await.unwrap(), "message:alice:hi:own");
        assert_eq!(bob_rx.recv().await.unwrap(), "message:alice:hi:other");

        // when (操作): bob が切断する
        drop(bob_tx);
        let bob_outcome = bob_task.await.unwrap();

        // then (期待する結果):
        assert_eq!(bob_outcome.end, SessionEnd::Left(LeaveReason::PeerClosed));
        assert_eq!(alice_rx.recv().await.unwrap(), "left:bob");
        assert_eq!(alice_rx.recv().await.unwrap(), "presence-count:1");
        assert_eq!(bob_rx.recv().await, None);
        assert_eq!(registry.count().await, 1);

        drop(alice_tx);
        let alice_outcome = alice_task.await.unwrap();
        assert_eq!(alice_outcome.messages, 1);
        assert_eq!(registry.count().await, 0);
    }

    #[tokio::test]
    async fn test_claimed_name_is_ignored() {
        // テスト項目: メッセージの name は無視され参加時の表示名が使われる
        // given (前提条件):
        let registry = create_registry();
        let lifecycle = create_lifecycle(registry.clone());
        let (tx, mut rx, _task) = connect(&lifecycle);
        tx.send(Ok(r#"{"name":"alice","gender":"other"}"#.to_string()))
            .unwrap();
        rx.recv().await.unwrap();
        rx.recv().await.unwrap();

        // when (操作):
        tx.send(Ok(r#"{"name":"mallory","message":"hello"}"#.to_string()))
            .unwrap();

        // then (期待する結果):
        assert_eq!(rx.recv().await.unwrap(), "message:alice:hello:own");
    }

    #[tokio::test]
    async fn test_invalid_json_join_is_rejected() {
        // テスト項目: JSON でない参加リクエストはエラーフレームを受けて閉じられる
        // given (前提条件):
        let frame = "not json";

        // when (操作):
        let (outcome, frames, count) = run_single_frame(frame).await;

        // then (期待する結果):
        assert!(matches!(
            outcome.end,
            SessionEnd::Rejected(JoinRejection::Malformed(_))
        ));
        assert_eq!(outcome.participant_id, None);
        assert_eq!(frames, vec![r#"{"error":"invalid join request"}"#.to_string()]);
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_missing_field_join_is_rejected() {
        // テスト項目: 名前や種別の欠落・空文字は missing として拒否される
        // given (前提条件):
        let frames = [
            r#"{"name":"","gender":"male"}"#,
            r#"{"name":"alice","gender":""}"#,
            r#"{"gender":"male"}"#,
            r#"{}"#,
        ];

        for frame in frames {
            // when (操作):
            let (outcome, sent, count) = run_single_frame(frame).await;

            // then (期待する結果):
            assert!(matches!(outcome.end, SessionEnd::Rejected(_)), "{}", frame);
            assert_eq!(
                sent,
                vec![r#"{"error":"missing name or gender"}"#.to_string()],
                "{}",
                frame
            );
            assert_eq!(count, 0);
        }
    }

    #[tokio::test]
    async fn test_invalid_field_join_is_rejected() {
        // テスト項目: 未知の種別と長すぎる表示名は invalid join request として拒否される
        // given (前提条件):
        let long_name = "a".repeat(43);
        let frames = [
            r#"{"name":"alice","gender":"robot"}"#.to_string(),
            format!(r#"{{"name":"{}","gender":"female"}}"#, long_name),
        ];

        for frame in &frames {
            // when (操作):
            let (outcome, sent, count) = run_single_frame(frame).await;

            // then (期待する結果):
            assert!(matches!(outcome.end, SessionEnd::Rejected(_)), "{}", frame);
            assert_eq!(
                sent,
                vec![r#"{"error":"invalid join request"}"#.to_string()]
            );
            assert_eq!(count, 0);
        }
    }

    #[tokio::test]
    async fn test_rejected_connection_is_never_broadcast_to() {
        // テスト項目: 拒否されたコネクションは既存参加者の通知に現れない
        // given (前提条件):
        let registry = create_registry();
        let lifecycle = create_lifecycle(registry.clone());
        let (alice_tx, mut alice_rx, _alice_task) = connect(&lifecycle);
        alice_tx
            .send(Ok(r#"{"name":"alice","gender":"female"}"#.to_string()))
            .unwrap();
        alice_rx.recv().await.unwrap();
        alice_rx.recv().await.unwrap();

        // when (操作):
        let (bad_tx, _bad_rx, bad_task) = connect(&lifecycle);
        bad_tx.send(Ok("{".to_string())).unwrap();
        bad_task.await.unwrap();

        // then (期待する結果):
        assert!(alice_rx.try_recv().is_err());
        assert_eq!(registry.count().await, 1);
    }

    #[tokio::test]
    async fn test_malformed_frame_after_join_leaves() {
        // テスト項目: 参加後の不正フレームでセッションが終わり退出処理が行われる
        // given (前提条件):
        let registry = create_registry();
        let lifecycle = create_lifecycle(registry.clone());
        let (tx, mut rx, task) = connect(&lifecycle);
        tx.send(Ok(r#"{"name":"alice","gender":"female"}"#.to_string()))
            .unwrap();
        rx.recv().await.unwrap();
        rx.recv().await.unwrap();

        // when (操作):
        tx.send(Ok(r#"{"name":"alice"}"#.to_string())).unwrap();
        let outcome = task.await.unwrap();

        // then (期待する結果):
        assert!(matches!(
            outcome.end,
            SessionEnd::Left(LeaveReason::MalformedFrame(_))
        ));
        assert!(outcome.participant_id.is_some());
        assert_eq!(registry.count().await, 0);
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_transport_error_after_join_leaves() {
        // テスト項目: 読み込みエラーでも退出処理が行われる
        // given (前提条件):
        let registry = create_registry();
        let lifecycle = create_lifecycle(registry.clone());
        let (tx, mut rx, task) = connect(&lifecycle);
        tx.send(Ok(r#"{"name":"alice","gender":"other"}"#.to_string()))
            .unwrap();
        rx.recv().await.unwrap();
        rx.recv().await.unwrap();

        // when (操作):
        tx.send(Err(TransportError::Receive("reset".to_string())))
            .unwrap();
        let outcome = task.await.unwrap();

        // then (期待する結果):
        assert_eq!(
            outcome.end,
            SessionEnd::Left(LeaveReason::Transport(TransportError::Receive(
                "reset".to_string()
            )))
        );
        assert_eq!(registry.count().await, 0);
    }

    #[tokio::test]
    async fn test_disconnect_before_join() {
        // テスト項目: 参加前の切断では何も通知されない
        // given (前提条件):
        let registry = create_registry();
        let lifecycle = create_lifecycle(registry.clone());
        let (tx, _rx, task) = connect(&lifecycle);

        // when (操作):
        drop(tx);
        let outcome = task.await.unwrap();

        // then (期待する結果):
        assert_eq!(outcome, SessionOutcome::before_join(SessionEnd::Abandoned));
        assert_eq!(registry.count().await, 0);
    }

    #[test]
    fn test_presence_state_transitions() {
        // テスト項目: 許される遷移は前向きのものだけ
        // given (前提条件):
        use PresenceState::*;

        // when (操作) / then (期待する結果):
        assert!(Connecting.can_transition_to(Joined));
        assert!(Connecting.can_transition_to(Closed));
        assert!(Joined.can_transition_to(Closed));
        assert!(!Joined.can_transition_to(Connecting));
        assert!(!Closed.can_transition_to(Joined));
        assert!(!Closed.can_transition_to(Connecting));
        assert!(!Joined.can_transition_to(Joined));
    }

    /// Renders everything except chat messages.
    struct MessageFailingRenderer;

    impl ViewRenderer for MessageFailingRenderer {
        fn render(&self, view: &View<'_>) -> Result<String, RenderError> {
            match view {
                View::Message { .. } => Err(RenderError::new(view.name(), "template missing")),
                other => TextRenderer.render(other),
            }
        }
    }

    #[tokio::test]
    async fn test_unrendered_message_is_not_counted() {
        // テスト項目: 描画に失敗して破棄されたメッセージは送信数に数えない
        // given (前提条件):
        let registry = create_registry();
        let broadcaster = Arc::new(Broadcaster::new(
            Arc::new(MessageFailingRenderer),
            Duration::from_millis(200),
        ));
        let lifecycle = create_lifecycle_with(registry.clone(), broadcaster);
        let (tx, mut rx, task) = connect(&lifecycle);
        tx.send(Ok(r#"{"name":"alice","gender":"female"}"#.to_string()))
            .unwrap();
        assert_eq!(rx.recv().await.unwrap(), "joined:alice");
        assert_eq!(rx.recv().await.unwrap(), "presence-count:1");

        // when (操作):
        tx.send(Ok(r#"{"name":"alice","message":"lost"}"#.to_string()))
            .unwrap();
        drop(tx);
        let outcome = task.await.unwrap();

        // then (期待する結果):
        assert_eq!(outcome.end, SessionEnd::Left(LeaveReason::PeerClosed));
        assert_eq!(outcome.messages, 0);
        // 退出処理は通常どおり行われる
        assert_eq!(registry.count().await, 0);
    }
}
