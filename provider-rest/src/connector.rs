//! REST connector for the catalog and user services
//!
//! Implements `CatalogGateway` and `IdentityGateway` over the host `HttpClient`.

use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use core_auth::{
    AuthResponse, AuthToken, IdentityGateway, LoginRequest, PlaylistToggle, RegisterRequest, User,
};
use core_catalog::{Album, AlbumDetail, AlbumId, CatalogGateway, Song, SongId};
use core_runtime::config::{CoreConfig, DEFAULT_REQUEST_TIMEOUT};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::error::RestError;
use crate::types::{
    AlbumResource, AlbumWithSongsResponse, AuthResponseBody, EmptyBody, MessageBody,
    SongResource, UserResource,
};

const SONGS_PATH: &str = "/api/v1/song/all";
const ALBUMS_PATH: &str = "/api/v1/album/all";
const SONG_PATH: &str = "/api/v1/song";
const ALBUM_PATH: &str = "/api/v1/album";
const LOGIN_PATH: &str = "/api/v1/user/login";
const REGISTER_PATH: &str = "/api/v1/user/register";
const ME_PATH: &str = "/api/v1/user/me";

/// Header carrying the auth token on user-service calls.
const TOKEN_HEADER: &str = "token";

/// REST gateway
///
/// Makes exactly one attempt per call. Non-2xx answers become
/// `BridgeError::Rejected` carrying the `message` field of the error body,
/// when there is one.
///
/// # Example
///
/// ```ignore
/// use provider_rest::RestGateway;
/// use core_catalog::CatalogGateway;
///
/// let gateway = RestGateway::new(http_client, "http://localhost:8000", "http://localhost:5000");
/// let songs = gateway.songs().await?;
/// ```
pub struct RestGateway {
    http_client: Arc<dyn HttpClient>,
    catalog_base_url: String,
    user_base_url: String,
    timeout: Duration,
}

impl RestGateway {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        catalog_base_url: impl Into<String>,
        user_base_url: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            catalog_base_url: trim_base(catalog_base_url.into()),
            user_base_url: trim_base(user_base_url.into()),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(
            config.http_client.clone(),
            config.catalog_api_url.clone(),
            config.user_api_url.clone(),
        )
        .with_timeout(config.request_timeout)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn catalog_url(&self, path: &str) -> String {
        format!("{}{}", self.catalog_base_url, path)
    }

    fn user_url(&self, path: &str) -> String {
        format!("{}{}", self.user_base_url, path)
    }

    fn request(&self, method: HttpMethod, url: String) -> HttpRequest {
        HttpRequest::new(method, url)
            .header("Accept", "application/json")
            .timeout(self.timeout)
    }

    /// Executes the request and turns non-2xx answers into rejections.
    #[instrument(skip(self, request), fields(method = ?request.method, url = %request.url))]
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let response = self.http_client.execute(request).await?;

        if response.is_success() {
            debug!(status = response.status, "API request succeeded");
            return Ok(response);
        }

        let message = response
            .json::<MessageBody>()
            .ok()
            .and_then(|body| body.message);
        warn!(status = response.status, "API request rejected");

        Err(RestError::Status {
            status: response.status,
            message,
        }
        .into())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T> {
        let response = self.send(self.request(HttpMethod::Get, url)).await?;
        decode(&response)
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T> {
    serde_json::from_slice(&response.body)
        .map_err(|e| RestError::ParseError(e.to_string()).into())
}

#[async_trait]
impl CatalogGateway for RestGateway {
    #[instrument(skip(self))]
    async fn songs(&self) -> Result<Vec<Song>> {
        let songs: Vec<SongResource> = self.get_json(self.catalog_url(SONGS_PATH)).await?;
        debug!(count = songs.len(), "Fetched songs");
        Ok(songs.into_iter().map(Song::from).collect())
    }

    #[instrument(skip(self))]
    async fn albums(&self) -> Result<Vec<Album>> {
        let albums: Vec<AlbumResource> = self.get_json(self.catalog_url(ALBUMS_PATH)).await?;
        debug!(count = albums.len(), "Fetched albums");
        Ok(albums.into_iter().map(Album::from).collect())
    }

    #[instrument(skip(self, id), fields(song_id = %id))]
    async fn song(&self, id: SongId) -> Result<Song> {
        let url = self.catalog_url(&format!("{}/{}", SONG_PATH, encode_segment(id.as_str())));
        let song: SongResource = self.get_json(url).await?;
        Ok(song.into())
    }

    #[instrument(skip(self, id), fields(album_id = %id))]
    async fn album_with_songs(&self, id: AlbumId) -> Result<AlbumDetail> {
        let url = self.catalog_url(&format!("{}/{}", ALBUM_PATH, encode_segment(id.as_str())));
        let response: AlbumWithSongsResponse = self.get_json(url).await?;
        Ok(response.into())
    }
}

#[async_trait]
impl IdentityGateway for RestGateway {
    #[instrument(skip_all)]
    async fn login(&self, request: LoginRequest) -> Result<AuthResponse> {
        let http_request = self
            .request(HttpMethod::Post, self.user_url(LOGIN_PATH))
            .json(&request)?;
        let response = self.send(http_request).await?;
        let body: AuthResponseBody = decode(&response)?;
        Ok(body.into())
    }

    #[instrument(skip_all)]
    async fn register(&self, request: RegisterRequest) -> Result<AuthResponse> {
        let http_request = self
            .request(HttpMethod::Post, self.user_url(REGISTER_PATH))
            .json(&request)?;
        let response = self.send(http_request).await?;
        let body: AuthResponseBody = decode(&response)?;
        Ok(body.into())
    }

    #[instrument(skip_all)]
    async fn me(&self, token: AuthToken) -> Result<User> {
        let request = self
            .request(HttpMethod::Get, self.user_url(ME_PATH))
            .header(TOKEN_HEADER, token.as_str());
        let response = self.send(request).await?;
        let user: UserResource = decode(&response)?;
        Ok(user.into())
    }

    #[instrument(skip(self, song_id, token), fields(song_id = %song_id))]
    async fn toggle_song_in_playlist(
        &self,
        song_id: SongId,
        token: AuthToken,
    ) -> Result<PlaylistToggle> {
        let url = self.user_url(&format!("{}/{}", SONG_PATH, encode_segment(song_id.as_str())));
        let request = self
            .request(HttpMethod::Post, url)
            .header(TOKEN_HEADER, token.as_str())
            .json(&EmptyBody {})?;
        let response = self.send(request).await?;

        // Some deployments answer with an empty body
        if response.body.is_empty() {
            return Ok(PlaylistToggle::default());
        }
        let body: MessageBody = decode(&response)?;
        Ok(body.into())
    }
}

impl fmt::Debug for RestGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestGateway")
            .field("catalog_base_url", &self.catalog_base_url)
            .field("user_base_url", &self.user_base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::BridgeError;
    use bytes::Bytes;
    use mockall::mock;
    use std::collections::HashMap;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
        }
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    fn gateway(http_client: MockHttpClient) -> RestGateway {
        RestGateway::new(
            Arc::new(http_client),
            "http://catalog.test/",
            "http://users.test",
        )
    }

    #[tokio::test]
    async fn test_songs_request_and_mapping() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_execute()
            .withf(|request| {
                request.method == HttpMethod::Get
                    && request.url == "http://catalog.test/api/v1/song/all"
                    && request.timeout == Some(DEFAULT_REQUEST_TIMEOUT)
            })
            .times(1)
            .returning(|_| {
                Ok(response(
                    200,
                    r#"[{"id": 1, "title": "One", "description": "d", "thumbnail": "t",
                         "audio": "a.mp3", "album": "a1"},
                        {"id": "2", "title": "Two", "description": "", "thumbnail": "",
                         "audio": "b.mp3", "album": "a1"}]"#,
                ))
            });

        let songs = gateway(http_client).songs().await.unwrap();

        assert_eq!(songs.len(), 2);
        assert_eq!(songs[0].id, SongId::new("1"));
        assert_eq!(songs[1].audio, "b.mp3");
    }

    #[tokio::test]
    async fn test_album_with_songs_encodes_id() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_execute()
            .withf(|request| request.url == "http://catalog.test/api/v1/album/a%2Fb")
            .times(1)
            .returning(|_| {
                Ok(response(
                    200,
                    r#"{"album": {"id": "a/b", "title": "Odd"}, "songs": []}"#,
                ))
            });

        let detail = gateway(http_client)
            .album_with_songs(AlbumId::new("a/b"))
            .await
            .unwrap();

        assert_eq!(detail.album.title, "Odd");
        assert!(detail.songs.is_empty());
    }

    #[tokio::test]
    async fn test_rejection_carries_server_message() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_execute()
            .returning(|_| Ok(response(404, r#"{"message": "No song with this id"}"#)));

        let error = gateway(http_client)
            .song(SongId::new("9"))
            .await
            .unwrap_err();

        assert!(matches!(error, BridgeError::Rejected { status: 404, .. }));
        assert_eq!(error.server_message(), Some("No song with this id"));
    }

    #[tokio::test]
    async fn test_rejection_without_json_body() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_execute()
            .returning(|_| Ok(response(502, "<html>Bad Gateway</html>")));

        let error = gateway(http_client).albums().await.unwrap_err();

        assert!(matches!(error, BridgeError::Rejected { status: 502, .. }));
        assert_eq!(error.server_message(), None);
    }

    #[tokio::test]
    async fn test_transport_failure_passes_through() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_execute()
            .times(1)
            .returning(|_| Err(BridgeError::Transport("connection refused".to_string())));

        let error = gateway(http_client).songs().await.unwrap_err();
        assert!(error.is_transport());
    }

    #[tokio::test]
    async fn test_undecodable_success_body() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_execute()
            .returning(|_| Ok(response(200, r#"{"unexpected": true}"#)));

        let error = gateway(http_client).songs().await.unwrap_err();
        assert!(matches!(error, BridgeError::OperationFailed(_)));
    }

    #[tokio::test]
    async fn test_login_posts_credentials() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_execute()
            .withf(|request| {
                let body: serde_json::Value = request
                    .body
                    .as_ref()
                    .and_then(|body| serde_json::from_slice(body).ok())
                    .unwrap_or_default();
                request.method == HttpMethod::Post
                    && request.url == "http://users.test/api/v1/user/login"
                    && body == serde_json::json!({"email": "ada@example.com", "password": "pw"})
            })
            .times(1)
            .returning(|_| {
                Ok(response(
                    200,
                    r#"{"token": "jwt", "message": "Logged in",
                        "user": {"_id": "u1", "name": "Ada", "email": "ada@example.com",
                                 "role": "user", "playlist": ["2"]}}"#,
                ))
            });

        let auth = gateway(http_client)
            .login(LoginRequest::new("ada@example.com", "pw"))
            .await
            .unwrap();

        assert_eq!(auth.token, AuthToken::new("jwt"));
        assert_eq!(auth.message.as_deref(), Some("Logged in"));
        assert_eq!(auth.user.playlist, vec![SongId::new("2")]);
    }

    #[tokio::test]
    async fn test_register_posts_name() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_execute()
            .withf(|request| {
                request.url == "http://users.test/api/v1/user/register"
                    && request
                        .body
                        .as_ref()
                        .is_some_and(|body| body.windows(5).any(|w| w == b"\"Ada\""))
            })
            .returning(|_| {
                Ok(response(
                    201,
                    r#"{"token": "jwt", "user": {"_id": 5, "name": "Ada", "email": "a@b.io"}}"#,
                ))
            });

        let auth = gateway(http_client)
            .register(RegisterRequest::new("Ada", "a@b.io", "pw"))
            .await
            .unwrap();

        assert_eq!(auth.user.id.as_str(), "5");
        assert_eq!(auth.message, None);
    }

    #[tokio::test]
    async fn test_me_sends_token_header() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_execute()
            .withf(|request| {
                request.url == "http://users.test/api/v1/user/me"
                    && request.headers.get("token").map(String::as_str) == Some("jwt")
            })
            .returning(|_| {
                Ok(response(
                    200,
                    r#"{"_id": "u1", "name": "Ada", "email": "a@b.io", "role": "admin"}"#,
                ))
            });

        let user = gateway(http_client).me(AuthToken::new("jwt")).await.unwrap();
        assert_eq!(user.role, "admin");
        assert!(user.playlist.is_empty());
    }

    #[tokio::test]
    async fn test_toggle_posts_empty_object_to_user_service() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_execute()
            .withf(|request| {
                request.method == HttpMethod::Post
                    && request.url == "http://users.test/api/v1/song/3"
                    && request.headers.get("token").map(String::as_str) == Some("jwt")
                    && request.body.as_deref() == Some(&b"{}"[..])
            })
            .times(1)
            .returning(|_| Ok(response(200, r#"{"message": "Added to playlist"}"#)));

        let toggle = gateway(http_client)
            .toggle_song_in_playlist(SongId::new("3"), AuthToken::new("jwt"))
            .await
            .unwrap();

        assert_eq!(toggle.message.as_deref(), Some("Added to playlist"));
    }

    #[tokio::test]
    async fn test_toggle_with_empty_body() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_execute()
            .returning(|_| Ok(response(200, "")));

        let toggle = gateway(http_client)
            .toggle_song_in_playlist(SongId::new("3"), AuthToken::new("jwt"))
            .await
            .unwrap();

        assert_eq!(toggle, PlaylistToggle::default());
    }

    #[test]
    fn test_from_config_trims_base_urls() {
        let gateway = RestGateway::new(
            Arc::new(MockHttpClient::new()),
            "http://catalog.test///",
            "http://users.test/",
        );
        assert_eq!(
            gateway.catalog_url(SONGS_PATH),
            "http://catalog.test/api/v1/song/all"
        );
        assert_eq!(gateway.user_url(ME_PATH), "http://users.test/api/v1/user/me");
    }
}
