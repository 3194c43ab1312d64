//! Shared application state and dependency wiring.

use std::sync::Arc;

use hiroba_shared::time::SystemClock;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::{
    config::ServerConfig,
    domain::{Broadcaster, ViewRenderer},
    infrastructure::{registry::InMemoryParticipantRegistry, renderer::HtmlRenderer},
    usecase::{
        GetPresenceUseCase, JoinParticipantUseCase, LeaveParticipantUseCase, PresenceLifecycle,
        SendMessageUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// PresenceLifecycle（WebSocket コネクションごとの参加状態）
    pub presence_lifecycle: Arc<PresenceLifecycle>,
    /// GetPresenceUseCase（参加者一覧の取得）
    pub get_presence_usecase: Arc<GetPresenceUseCase>,
    /// ViewRenderer（HTML ページの描画）
    pub renderer: Arc<dyn ViewRenderer>,
    /// Prometheus ハンドル（未登録なら `/metrics` は 404）
    pub metrics: Option<PrometheusHandle>,
}

/// Build the application state in dependency order.
///
/// 1. Registry
/// 2. Renderer and Broadcaster
/// 3. UseCases
pub fn build_app_state(config: &ServerConfig, metrics: Option<PrometheusHandle>) -> Arc<AppState> {
    // 1. Registry (in-memory)
    let registry = Arc::new(InMemoryParticipantRegistry::new());

    // 2. Renderer and Broadcaster
    let renderer: Arc<dyn ViewRenderer> = Arc::new(HtmlRenderer::new());
    let broadcaster = Arc::new(Broadcaster::new(renderer.clone(), config.write_timeout));
    let clock = Arc::new(SystemClock);

    // 3. UseCases
    let join_participant_usecase = Arc::new(JoinParticipantUseCase::new(
        registry.clone(),
        broadcaster.clone(),
        clock.clone(),
    ));
    let send_message_usecase = Arc::new(SendMessageUseCase::new(
        registry.clone(),
        broadcaster.clone(),
        clock.clone(),
    ));
    let leave_participant_usecase = Arc::new(LeaveParticipantUseCase::new(
        registry.clone(),
        broadcaster,
        clock,
    ));
    let presence_lifecycle = Arc::new(PresenceLifecycle::new(
        join_participant_usecase,
        send_message_usecase,
        leave_participant_usecase,
        config.write_timeout,
    ));
    let get_presence_usecase = Arc::new(GetPresenceUseCase::new(registry));

    Arc::new(AppState {
        presence_lifecycle,
        get_presence_usecase,
        renderer,
        metrics,
    })
}
