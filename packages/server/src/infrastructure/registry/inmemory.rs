//! InMemory Participant Registry 実装
//!
//! ドメイン層が定義する ParticipantRegistry trait の具体的な実装。
//! HashMap をインメモリのストアとして使用します。
//!
//! ## ロックの規律
//!
//! ロックは追加・削除・スナップショットのコピーの間だけ保持されます。
//! スナップショットは `Arc<Participant>` のコピーなので、呼び出し側は
//! ロックを保持せずに各参加者へ書き込めます。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{Participant, ParticipantId, ParticipantRegistry, RegistryError};

/// インメモリ Participant Registry 実装
#[derive(Default)]
pub struct InMemoryParticipantRegistry {
    /// 接続中の参加者
    ///
    /// Key: ParticipantId
    /// Value: 共有された Participant
    participants: RwLock<HashMap<ParticipantId, Arc<Participant>>>,
}

impl InMemoryParticipantRegistry {
    /// 空の InMemoryParticipantRegistry を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ParticipantRegistry for InMemoryParticipantRegistry {
    async fn add(&self, participant: Arc<Participant>) -> Result<(), RegistryError> {
        let mut participants = self.participants.write().await;
        let id = participant.id();
        if participants.contains_key(&id) {
            return Err(RegistryError::DuplicateParticipant(id));
        }
        participants.insert(id, participant);
        tracing::debug!("Participant '{}' added to registry", id);
        Ok(())
    }

    async fn remove(&self, id: &ParticipantId) -> Option<Arc<Participant>> {
        let removed = self.participants.write().await.remove(id);
        if removed.is_some() {
            tracing::debug!("Participant '{}' removed from registry", id);
        }
        removed
    }

    async fn snapshot(&self) -> Vec<Arc<Participant>> {
        let participants = self.participants.read().await;
        participants.values().cloned().collect()
    }

    async fn count(&self) -> usize {
        self.participants.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Category, DisplayName, ParticipantIdFactory, Timestamp},
        infrastructure::connection::ChannelFrameSink,
    };

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - InMemoryParticipantRegistry の追加・削除・スナップショット・カウント
    // - 重複 ID の追加がエラーになること
    // - 存在しない ID の削除が何もしないこと（冪等性）
    //
    // 【なぜこのテストが必要か】
    // - Registry は参加・退出・配信のすべてから使われる共有状態の中核
    // - Count が常に「追加済みかつ未削除」の数と一致する必要がある
    //
    // 【どのようなシナリオをテストするか】
    // 1. 参加者追加の成功ケース
    // 2. 重複 ID の追加（論理エラー）
    // 3. 参加者削除と冪等な再削除
    // 4. 追加と削除を繰り返した後のカウント
    // 5. 同じ表示名の参加者が共存できること
    // ========================================

    fn create_participant(name: &str) -> Arc<Participant> {
        let (sink, _rx) = ChannelFrameSink::new();
        Arc::new(Participant::new(
            ParticipantIdFactory::generate(),
            DisplayName::new(name.to_string()).unwrap(),
            Category::Other,
            Timestamp::new(1000),
            Box::new(sink),
        ))
    }

    #[tokio::test]
    async fn test_add_participant_success() {
        // テスト項目: 参加者を追加するとスナップショットに含まれる
        // given (前提条件):
        let registry = InMemoryParticipantRegistry::new();
        let alice = create_participant("alice");

        // when (操作):
        let result = registry.add(alice.clone()).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(registry.count().await, 1);
        let snapshot = registry.snapshot().await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id(), alice.id());
    }

    #[tokio::test]
    async fn test_add_duplicate_id_fails() {
        // テスト項目: 同じ ID の参加者を二重に追加するとエラーになる
        // given (前提条件):
        let registry = InMemoryParticipantRegistry::new();
        let alice = create_participant("alice");
        registry.add(alice.clone()).await.unwrap();

        // when (操作):
        let result = registry.add(alice.clone()).await;

        // then (期待する結果):
        assert_eq!(result, Err(RegistryError::DuplicateParticipant(alice.id())));
        assert_eq!(registry.count().await, 1);
    }

    #[tokio::test]
    async fn test_remove_participant_is_idempotent() {
        // テスト項目: 削除は一度目だけ参加者を返し、二度目は何もしない
        // given (前提条件):
        let registry = InMemoryParticipantRegistry::new();
        let alice = create_participant("alice");
        registry.add(alice.clone()).await.unwrap();

        // when (操作):
        let first = registry.remove(&alice.id()).await;
        let second = registry.remove(&alice.id()).await;

        // then (期待する結果):
        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(registry.count().await, 0);
        assert!(registry.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_count_tracks_adds_and_removes() {
        // テスト項目: 任意の追加・削除の列の後、カウントが未削除の参加者数と一致する
        // given (前提条件):
        let registry = InMemoryParticipantRegistry::new();
        let participants: Vec<Arc<Participant>> = (0..10)
            .map(|i| create_participant(&format!("user{}", i)))
            .collect();

        // when (操作):
        let mut expected = 0usize;
        for (i, participant) in participants.iter().enumerate() {
            registry.add(participant.clone()).await.unwrap();
            expected += 1;
            if i % 3 == 0 {
                registry.remove(&participant.id()).await;
                expected -= 1;
            }
            // then (期待する結果):
            assert_eq!(registry.count().await, expected);
        }
        registry.remove(&participants[0].id()).await;
        assert_eq!(registry.count().await, expected);
        assert_eq!(registry.snapshot().await.len(), expected);
    }

    #[tokio::test]
    async fn test_same_display_name_is_allowed() {
        // テスト項目: 同じ表示名の参加者は別 ID として共存できる
        // given (前提条件):
        let registry = InMemoryParticipantRegistry::new();

        // when (操作):
        registry.add(create_participant("alice")).await.unwrap();
        registry.add(create_participant("alice")).await.unwrap();

        // then (期待する結果):
        assert_eq!(registry.count().await, 2);
    }

    #[tokio::test]
    async fn test_snapshot_is_a_point_in_time_copy() {
        // テスト項目: スナップショット取得後の削除はスナップショットに影響しない
        // given (前提条件):
        let registry = InMemoryParticipantRegistry::new();
        let alice = create_participant("alice");
        let bob = create_participant("bob");
        registry.add(alice.clone()).await.unwrap();
        registry.add(bob.clone()).await.unwrap();
        let before = registry.snapshot().await;

        // when (操作):
        registry.remove(&bob.id()).await;
        let after = registry.snapshot().await;

        // then (期待する結果):
        assert_eq!(before.len(), 2);
        assert_eq!(after.len(), 1);
        assert!(after.iter().all(|p| p.id() != bob.id()));
    }

    #[tokio::test]
    async fn test_concurrent_adds_and_removes() {
        // テスト項目: 並行して追加・削除しても最終カウントが一致する
        // given (前提条件):
        let registry = Arc::new(InMemoryParticipantRegistry::new());

        // when (操作):
        let mut handles = Vec::new();
        for i in 0..20 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                let participant = create_participant(&format!("user{}", i));
                registry.add(participant.clone()).await.unwrap();
                if i % 2 == 0 {
                    registry.remove(&participant.id()).await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // then (期待する結果):
        assert_eq!(registry.count().await, 10);
    }
}
