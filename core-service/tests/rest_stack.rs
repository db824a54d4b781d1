//! The assembled core talking to the REST gateway over a scripted HTTP client

mod common;

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bytes::Bytes;
use common::{ids, MemoryStore, TOKEN_KEY};
use core_catalog::SongId;
use core_runtime::config::CoreConfig;
use core_service::CoreService;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Answers by method and URL; records every request it sees.
#[derive(Default)]
struct ScriptedHttp {
    routes: Mutex<HashMap<(HttpMethod, String), (u16, String)>>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttp {
    fn route(&self, method: HttpMethod, url: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert((method, url.to_string()), (status, body.to_string()));
    }

    fn seen(&self) -> Vec<HttpRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for ScriptedHttp {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        self.seen.lock().unwrap().push(request.clone());
        let route = self
            .routes
            .lock()
            .unwrap()
            .get(&(request.method, request.url.clone()))
            .cloned();

        match route {
            Some((status, body)) => Ok(HttpResponse {
                status,
                headers: HashMap::new(),
                body: Bytes::from(body),
            }),
            None => Err(BridgeError::Transport(format!("no route to {}", request.url))),
        }
    }
}

const SONGS: &str = r#"[
    {"id": 1, "title": "One", "description": "", "thumbnail": "1.jpg", "audio": "1.mp3", "album": 10},
    {"id": 2, "title": "Two", "description": "", "thumbnail": "2.jpg", "audio": "2.mp3", "album": 10},
    {"id": 3, "title": "Three", "description": "", "thumbnail": "3.jpg", "audio": "3.mp3", "album": 11}
]"#;

const ME: &str = r#"{"_id": "u1", "name": "Ada", "email": "ada@example.com", "role": "user", "playlist": ["3"]}"#;

fn service(http: Arc<ScriptedHttp>, store: Arc<MemoryStore>) -> CoreService {
    let config = CoreConfig::builder()
        .catalog_api_url("http://catalog.test/")
        .user_api_url("http://users.test")
        .http_client(http)
        .secure_store(store)
        .token_key(TOKEN_KEY)
        .build()
        .unwrap();
    CoreService::new(config).unwrap()
}

#[tokio::test]
async fn test_startup_over_rest() {
    let http = Arc::new(ScriptedHttp::default());
    http.route(HttpMethod::Get, "http://catalog.test/api/v1/song/all", 200, SONGS);
    http.route(HttpMethod::Get, "http://catalog.test/api/v1/album/all", 200, "[]");
    http.route(HttpMethod::Get, "http://users.test/api/v1/user/me", 200, ME);
    let store = Arc::new(MemoryStore::with_token("jwt"));
    let core = service(http.clone(), store);

    let report = core.start().await;

    assert!(report.songs_loaded && report.albums_loaded && report.seeded);
    assert_eq!(core.playback().selected_song_id, Some(SongId::new("1")));
    assert_eq!(ids(&core.playlist()), vec!["3"]);

    let me = http
        .seen()
        .into_iter()
        .find(|r| r.url.ends_with("/user/me"))
        .unwrap();
    assert_eq!(me.headers.get("token").map(String::as_str), Some("jwt"));
}

#[tokio::test]
async fn test_server_rejection_message_reaches_the_user() {
    let http = Arc::new(ScriptedHttp::default());
    http.route(
        HttpMethod::Post,
        "http://users.test/api/v1/user/login",
        400,
        r#"{"message": "Invalid credentials"}"#,
    );
    let store = Arc::new(MemoryStore::default());
    let core = service(http, store.clone());

    let error = core.login("ada@example.com", "nope").await.unwrap_err();

    assert_eq!(error.user_message(), "Invalid credentials");
    assert!(core.user().is_none());
    assert_eq!(store.token(), None);
}

#[tokio::test]
async fn test_playlist_toggle_refetches_user() {
    let http = Arc::new(ScriptedHttp::default());
    http.route(HttpMethod::Get, "http://catalog.test/api/v1/song/all", 200, SONGS);
    http.route(HttpMethod::Get, "http://catalog.test/api/v1/album/all", 200, "[]");
    http.route(HttpMethod::Get, "http://users.test/api/v1/user/me", 200, ME);
    let store = Arc::new(MemoryStore::with_token("jwt"));
    let core = service(http.clone(), store);
    core.start().await;

    http.route(
        HttpMethod::Post,
        "http://users.test/api/v1/song/1",
        200,
        r#"{"message": "Song added to playlist"}"#,
    );
    http.route(
        HttpMethod::Get,
        "http://users.test/api/v1/user/me",
        200,
        r#"{"_id": "u1", "name": "Ada", "email": "ada@example.com", "role": "user", "playlist": ["3", 1]}"#,
    );

    let user = core.add_to_playlist(SongId::new("1")).await.unwrap();

    assert_eq!(user.playlist.len(), 2);
    assert_eq!(ids(&core.playlist()), vec!["1", "3"]);
}
