//! Server state shared by every handler.

use std::sync::Arc;

use crate::usecase::{
    ConnectParticipantUseCase, CreateRoomUseCase, DeleteRoomUseCase, GetRoomDetailUseCase,
    GetRoomsUseCase, SendMessageUseCase,
};

use super::policy::AccessPolicy;

/// Shared application state
pub struct AppState {
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    pub delete_room_usecase: Arc<DeleteRoomUseCase>,
    pub send_message_usecase: Arc<SendMessageUseCase>,
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    pub access_policy: Arc<dyn AccessPolicy>,
}
