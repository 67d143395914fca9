//! UseCase: Room 一覧取得処理

use std::sync::Arc;

use crate::domain::{Room, RoomRepository};

use super::error::GetRoomsError;

/// Room 一覧取得のユースケース
pub struct GetRoomsUseCase {
    room_repository: Arc<dyn RoomRepository>,
}

impl GetRoomsUseCase {
    pub fn new(room_repository: Arc<dyn RoomRepository>) -> Self {
        Self { room_repository }
    }

    /// 永続化されている全ての Room を作成日時順に返す
    pub async fn execute(&self) -> Result<Vec<Room>, GetRoomsError> {
        self.room_repository
            .list()
            .await
            .map_err(GetRoomsError::LoadFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MockRoomRepository, RepositoryError},
        infrastructure::repository::{InMemoryDatabase, InMemoryRoomRepository},
        testing::persist_room,
    };

    #[tokio::test]
    async fn test_get_rooms_returns_persisted_rooms() {
        // テスト項目: 永続化されている Room が全て返される
        // given (前提条件):
        let db = InMemoryDatabase::new();
        let first = persist_room(&db, &["alice"]).await;
        let second = persist_room(&db, &["bob"]).await;
        let usecase = GetRoomsUseCase::new(Arc::new(InMemoryRoomRepository::new(db)));

        // when (操作):
        let rooms = usecase.execute().await.unwrap();

        // then (期待する結果):
        let mut ids: Vec<_> = rooms.into_iter().map(|room| room.id).collect();
        ids.sort();
        let mut expected = vec![first, second];
        expected.sort();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_get_rooms_load_failure() {
        // テスト項目: Repository のエラーは LoadFailed として返される
        // given (前提条件):
        let mut repository = MockRoomRepository::new();
        repository
            .expect_list()
            .returning(|| Err(RepositoryError::Storage("timeout".to_string())));
        let usecase = GetRoomsUseCase::new(Arc::new(repository));

        // when (操作):
        let result = usecase.execute().await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(GetRoomsError::LoadFailed(RepositoryError::Storage(
                "timeout".to_string()
            )))
        );
    }
}
