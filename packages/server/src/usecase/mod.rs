//! UseCase 層
//!
//! UI 層（HTTP / WebSocket ハンドラ）から呼ばれるアプリケーションのユースケース。
//! Domain 層の trait と Registry にのみ依存します。

pub mod connect_participant;
pub mod create_room;
pub mod delete_room;
pub mod error;
pub mod get_room_detail;
pub mod get_rooms;
pub mod recover_rooms;
pub mod send_message;

pub use connect_participant::ConnectParticipantUseCase;
pub use create_room::CreateRoomUseCase;
pub use delete_room::DeleteRoomUseCase;
pub use error::{
    ConnectError, CreateRoomError, DeleteRoomError, GetRoomDetailError, GetRoomsError,
    RecoverRoomsError, SendMessageError,
};
pub use get_room_detail::{GetRoomDetailUseCase, RoomDetail};
pub use get_rooms::GetRoomsUseCase;
pub use recover_rooms::RecoverRoomsUseCase;
pub use send_message::SendMessageUseCase;
