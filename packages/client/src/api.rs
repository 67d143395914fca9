//! HTTP client for the chat server's REST API.

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};

use kaiwa_server::infrastructure::dto::http::{
    CreateRoomRequest, CreateRoomResponse, ErrorResponse, SendMessageRequest, SendMessageResponse,
};

use crate::error::ClientError;

/// REST client bound to one server
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the server (e.g., "http://127.0.0.1:8080")
    /// * `token` - Bearer token sent with every request, if any
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, ClientError> {
        let base_url =
            Url::parse(base_url).map_err(|_| ClientError::InvalidUrl(base_url.to_string()))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self {
            client: Client::new(),
            base_url,
            token,
        })
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// `POST /api/rooms`, returning the id of the new room
    pub async fn create_room(&self, usernames: &[String]) -> Result<String, ClientError> {
        let request = CreateRoomRequest {
            usernames: usernames.to_vec(),
        };
        let response = self
            .request(Method::POST, "/api/rooms")?
            .json(&request)
            .send()
            .await?;
        let body: CreateRoomResponse = check_status(response, None).await?.json().await?;
        Ok(body.id)
    }

    /// `DELETE /api/rooms/{room_id}`
    pub async fn delete_room(&self, room_id: &str) -> Result<(), ClientError> {
        let response = self
            .request(Method::DELETE, &format!("/api/rooms/{}", room_id))?
            .send()
            .await?;
        check_status(response, Some(room_id)).await?;
        Ok(())
    }

    /// `POST /api/rooms/{room_id}/messages`, returning the id assigned on persist
    pub async fn send_message(
        &self,
        room_id: &str,
        from: &str,
        text: &str,
        timestamp: i64,
    ) -> Result<u64, ClientError> {
        let request = SendMessageRequest {
            from: from.to_string(),
            text: text.to_string(),
            timestamp,
        };
        let response = self
            .request(Method::POST, &format!("/api/rooms/{}/messages", room_id))?
            .json(&request)
            .send()
            .await?;
        let body: SendMessageResponse = check_status(response, Some(room_id))
            .await?
            .json()
            .await?;
        Ok(body.id)
    }

    /// WebSocket endpoint for `username` in `room_id`
    ///
    /// `http` becomes `ws` and `https` becomes `wss`.
    pub fn websocket_url(&self, room_id: &str, username: &str) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme)
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?;
        url.set_path("/ws");
        url.set_query(None);
        url.query_pairs_mut()
            .append_pair("room_id", room_id)
            .append_pair("username", username);
        Ok(url)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?;
        let builder = self.client.request(method, url);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }
}

/// Turn a non-success response into a `ClientError`
///
/// `404` on a room-scoped request becomes `RoomNotFound`.
async fn check_status(response: Response, room_id: Option<&str>) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if let (StatusCode::NOT_FOUND, Some(room_id)) = (status, room_id) {
        return Err(ClientError::RoomNotFound(room_id.to_string()));
    }

    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.message,
        Err(_) => status.to_string(),
    };
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_invalid_url() {
        // テスト項目: URL として解釈できない・http(s) でないサーバー URL はエラーになる
        // given (前提条件):
        let not_a_url = "127.0.0.1 8080";
        let websocket = "ws://127.0.0.1:8080";

        // when (操作):
        let first = ApiClient::new(not_a_url, None);
        let second = ApiClient::new(websocket, None);

        // then (期待する結果):
        assert!(matches!(first, Err(ClientError::InvalidUrl(_))));
        assert!(matches!(second, Err(ClientError::InvalidUrl(_))));
    }

    #[test]
    fn test_websocket_url_from_http() {
        // テスト項目: http の URL から ws://.../ws?room_id=...&username=... が組み立てられる
        // given (前提条件):
        let api = ApiClient::new("http://127.0.0.1:8080", None).unwrap();

        // when (操作):
        let url = api.websocket_url("room-a", "alice").unwrap();

        // then (期待する結果):
        assert_eq!(
            url.as_str(),
            "ws://127.0.0.1:8080/ws?room_id=room-a&username=alice"
        );
    }

    #[test]
    fn test_websocket_url_from_https_is_encoded() {
        // テスト項目: https は wss になり、クエリの値はエンコードされる
        // given (前提条件):
        let api = ApiClient::new("https://chat.example.com/", None).unwrap();

        // when (操作):
        let url = api.websocket_url("room-a", "alice smith").unwrap();

        // then (期待する結果):
        assert_eq!(url.scheme(), "wss");
        assert_eq!(url.path(), "/ws");
        assert_eq!(url.query(), Some("room_id=room-a&username=alice+smith"));
    }

    #[test]
    fn test_token_is_kept() {
        // テスト項目: 指定したトークンが保持される
        // given (前提条件):
        let api = ApiClient::new("http://127.0.0.1:8080", Some("secret".to_string())).unwrap();

        // when (操作):
        let token = api.token();

        // then (期待する結果):
        assert_eq!(token, Some("secret"));
    }
}
