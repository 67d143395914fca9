//! Application wiring: repositories, registry, use cases and state.

use std::sync::Arc;

use kaiwa_shared::time::SystemClock;

use crate::{
    infrastructure::repository::{
        InMemoryDatabase, InMemoryMessageRepository, InMemoryRoomRepository,
        InMemoryTransactionManager,
    },
    registry::RoomRegistry,
    ui::{policy::policy_from_tokens, state::AppState},
    usecase::{
        ConnectParticipantUseCase, CreateRoomUseCase, DeleteRoomUseCase, GetRoomDetailUseCase,
        GetRoomsUseCase, RecoverRoomsError, RecoverRoomsUseCase, SendMessageUseCase,
    },
};

/// Build the state of an in-memory server.
///
/// Rooms already persisted in `db` get their delivery queues back before
/// the state is returned.
pub async fn build_app_state(
    db: Arc<InMemoryDatabase>,
    queue_capacity: usize,
    access_tokens: &[String],
) -> Result<Arc<AppState>, RecoverRoomsError> {
    // 1. Repositories
    let room_repository = Arc::new(InMemoryRoomRepository::new(db.clone()));
    let message_repository = Arc::new(InMemoryMessageRepository::new(db.clone()));
    let transaction_manager = Arc::new(InMemoryTransactionManager::new(db));

    // 2. Registry
    let registry = Arc::new(RoomRegistry::with_queue_capacity(
        message_repository.clone(),
        queue_capacity,
    ));

    // 3. Recover rooms persisted before the restart
    RecoverRoomsUseCase::new(room_repository.clone(), registry.clone())
        .execute()
        .await?;

    // 4. UseCases
    Ok(Arc::new(AppState {
        create_room_usecase: Arc::new(CreateRoomUseCase::new(
            transaction_manager.clone(),
            registry.clone(),
            Arc::new(SystemClock),
        )),
        delete_room_usecase: Arc::new(DeleteRoomUseCase::new(
            transaction_manager,
            registry.clone(),
        )),
        send_message_usecase: Arc::new(SendMessageUseCase::new(
            message_repository,
            registry.clone(),
        )),
        connect_participant_usecase: Arc::new(ConnectParticipantUseCase::new(registry.clone())),
        get_rooms_usecase: Arc::new(GetRoomsUseCase::new(room_repository.clone())),
        get_room_detail_usecase: Arc::new(GetRoomDetailUseCase::new(room_repository, registry)),
        access_policy: policy_from_tokens(access_tokens),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::persist_room;

    #[tokio::test]
    async fn test_build_app_state_recovers_rooms() {
        // テスト項目: 永続化済みの Room は起動直後から送信を受け付ける
        // given (前提条件):
        let db = InMemoryDatabase::new();
        let room_id = persist_room(&db, &["alice"]).await;

        // when (操作):
        let state = build_app_state(db, 4, &[]).await.unwrap();
        let result = state
            .send_message_usecase
            .execute(room_id.to_string(), "alice".to_string(), "back".to_string(), 1)
            .await;

        // then (期待する結果):
        assert!(result.is_ok());
    }
}
