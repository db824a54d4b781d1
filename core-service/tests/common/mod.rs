//! Hand-written fakes shared by the service-level scenario tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bridge_traits::storage::SecureStore;
use core_auth::{
    AuthResponse, AuthToken, IdentityGateway, LoginRequest, PlaylistToggle, RegisterRequest, User,
    UserId,
};
use core_catalog::{Album, AlbumDetail, AlbumId, CatalogGateway, Song, SongId};
use core_runtime::config::{CoreConfig, SeedPolicy};
use core_runtime::events::{CoreEvent, EventStream, Notice};
use core_service::CoreService;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub const TOKEN_KEY: &str = "token";

// ============================================================================
// Gates
// ============================================================================

/// Holds a fake response until the test releases it.
#[derive(Default)]
pub struct Gate {
    entered: Notify,
    release: Notify,
}

impl Gate {
    /// Waits until the gated call has started (and taken its ticket).
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }

    async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

// ============================================================================
// Catalog
// ============================================================================

pub fn song(id: &str) -> Song {
    Song {
        id: SongId::new(id),
        title: format!("Track {}", id),
        description: String::new(),
        thumbnail: format!("{}.jpg", id),
        audio: format!("{}.mp3", id),
        album_id: AlbumId::new("a1"),
    }
}

pub fn album(id: &str) -> Album {
    Album {
        id: AlbumId::new(id),
        title: format!("Album {}", id),
        description: String::new(),
        thumbnail: String::new(),
    }
}

/// Serves an in-memory catalog. `None` song/album lists fail as transport errors.
#[derive(Default)]
pub struct FakeCatalog {
    songs: Mutex<Option<Vec<Song>>>,
    albums: Mutex<Option<Vec<Album>>>,
    details: Mutex<HashMap<String, AlbumDetail>>,
    gates: Mutex<HashMap<String, Arc<Gate>>>,
}

impl FakeCatalog {
    pub fn serving(ids: &[&str]) -> Self {
        let catalog = Self::default();
        catalog.serve_songs(ids);
        *catalog.albums.lock().unwrap() = Some(vec![album("a1")]);
        catalog
    }

    pub fn serve_songs(&self, ids: &[&str]) {
        *self.songs.lock().unwrap() = Some(ids.iter().map(|id| song(id)).collect());
    }

    pub fn fail_songs(&self) {
        *self.songs.lock().unwrap() = None;
    }

    pub fn fail_albums(&self) {
        *self.albums.lock().unwrap() = None;
    }

    pub fn add_album(&self, id: &str, song_ids: &[&str]) {
        let detail = AlbumDetail {
            album: album(id),
            songs: song_ids.iter().map(|s| song(s)).collect(),
        };
        self.details.lock().unwrap().insert(id.to_string(), detail);
    }

    /// Gates every later call for `key` (`"songs"` or `"album:<id>"`).
    pub fn gate(&self, key: &str) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        self.gates
            .lock()
            .unwrap()
            .insert(key.to_string(), Arc::clone(&gate));
        gate
    }

    async fn wait_gate(&self, key: &str) {
        let gate = self.gates.lock().unwrap().get(key).cloned();
        if let Some(gate) = gate {
            gate.pass().await;
        }
    }
}

fn refused() -> BridgeError {
    BridgeError::Transport("connection refused".to_string())
}

#[async_trait]
impl CatalogGateway for FakeCatalog {
    async fn songs(&self) -> BridgeResult<Vec<Song>> {
        self.wait_gate("songs").await;
        self.songs.lock().unwrap().clone().ok_or_else(refused)
    }

    async fn albums(&self) -> BridgeResult<Vec<Album>> {
        self.albums.lock().unwrap().clone().ok_or_else(refused)
    }

    async fn song(&self, id: SongId) -> BridgeResult<Song> {
        let songs = self.songs.lock().unwrap().clone().ok_or_else(refused)?;
        songs
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| BridgeError::Rejected {
                status: 404,
                message: Some("No song with this id".to_string()),
            })
    }

    async fn album_with_songs(&self, id: AlbumId) -> BridgeResult<AlbumDetail> {
        self.wait_gate(&format!("album:{}", id)).await;
        self.details
            .lock()
            .unwrap()
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| BridgeError::Rejected {
                status: 404,
                message: Some("No album with this id".to_string()),
            })
    }
}

// ============================================================================
// Identity
// ============================================================================

pub const EMAIL: &str = "ada@example.com";
pub const PASSWORD: &str = "hunter2";
pub const VALID_TOKEN: &str = "valid-token";

pub fn user(playlist: &[&str]) -> User {
    User {
        id: UserId::new("u1"),
        name: "Ada".to_string(),
        email: EMAIL.to_string(),
        role: "user".to_string(),
        playlist: playlist.iter().map(|id| SongId::new(*id)).collect(),
    }
}

/// One account; the server-side user record is the source of truth.
pub struct FakeIdentity {
    account: Mutex<User>,
    toggle_fails: AtomicBool,
    gates: Mutex<HashMap<String, Arc<Gate>>>,
}

impl FakeIdentity {
    pub fn with_playlist(playlist: &[&str]) -> Self {
        Self {
            account: Mutex::new(user(playlist)),
            toggle_fails: AtomicBool::new(false),
            gates: Mutex::new(HashMap::new()),
        }
    }

    /// Gates every later call for `key` (`"me"`).
    pub fn gate(&self, key: &str) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        self.gates
            .lock()
            .unwrap()
            .insert(key.to_string(), Arc::clone(&gate));
        gate
    }

    async fn wait_gate(&self, key: &str) {
        let gate = self.gates.lock().unwrap().get(key).cloned();
        if let Some(gate) = gate {
            gate.pass().await;
        }
    }

    pub fn fail_toggles(&self) {
        self.toggle_fails.store(true, Ordering::SeqCst);
    }

    pub fn server_playlist(&self) -> Vec<SongId> {
        self.account.lock().unwrap().playlist.clone()
    }

    fn check_token(&self, token: &AuthToken) -> BridgeResult<()> {
        if token.as_str() == VALID_TOKEN {
            Ok(())
        } else {
            Err(BridgeError::Rejected {
                status: 401,
                message: Some("Please login".to_string()),
            })
        }
    }
}

#[async_trait]
impl IdentityGateway for FakeIdentity {
    async fn login(&self, request: LoginRequest) -> BridgeResult<AuthResponse> {
        if request.email != EMAIL || request.password != PASSWORD {
            return Err(BridgeError::Rejected {
                status: 400,
                message: Some("Invalid credentials".to_string()),
            });
        }
        Ok(AuthResponse {
            token: AuthToken::new(VALID_TOKEN),
            user: self.account.lock().unwrap().clone(),
            message: Some("Welcome back".to_string()),
        })
    }

    async fn register(&self, _request: RegisterRequest) -> BridgeResult<AuthResponse> {
        Ok(AuthResponse {
            token: AuthToken::new(VALID_TOKEN),
            user: self.account.lock().unwrap().clone(),
            message: None,
        })
    }

    async fn me(&self, token: AuthToken) -> BridgeResult<User> {
        self.wait_gate("me").await;
        self.check_token(&token)?;
        Ok(self.account.lock().unwrap().clone())
    }

    async fn toggle_song_in_playlist(
        &self,
        song_id: SongId,
        token: AuthToken,
    ) -> BridgeResult<PlaylistToggle> {
        if self.toggle_fails.load(Ordering::SeqCst) {
            return Err(refused());
        }
        self.check_token(&token)?;

        let mut account = self.account.lock().unwrap();
        let message = if let Some(pos) = account.playlist.iter().position(|id| *id == song_id) {
            account.playlist.remove(pos);
            "Removed from playlist"
        } else {
            account.playlist.push(song_id);
            "Added to playlist"
        };
        Ok(PlaylistToggle {
            message: Some(message.to_string()),
        })
    }
}

// ============================================================================
// Bridges
// ============================================================================

#[derive(Default)]
pub struct MemoryStore {
    secrets: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn with_token(token: &str) -> Self {
        let store = Self::default();
        store
            .secrets
            .lock()
            .unwrap()
            .insert(TOKEN_KEY.to_string(), token.as_bytes().to_vec());
        store
    }

    pub fn token(&self) -> Option<String> {
        self.secrets
            .lock()
            .unwrap()
            .get(TOKEN_KEY)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

#[async_trait]
impl SecureStore for MemoryStore {
    async fn set_secret(&self, key: &str, value: &[u8]) -> BridgeResult<()> {
        self.secrets
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn get_secret(&self, key: &str) -> BridgeResult<Option<Vec<u8>>> {
        Ok(self.secrets.lock().unwrap().get(key).cloned())
    }

    async fn delete_secret(&self, key: &str) -> BridgeResult<()> {
        self.secrets.lock().unwrap().remove(key);
        Ok(())
    }
}

/// HTTP client for tests that go through fake gateways instead.
pub struct OfflineHttp;

#[async_trait]
impl HttpClient for OfflineHttp {
    async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
        Err(BridgeError::NotAvailable("offline".to_string()))
    }
}

// ============================================================================
// Harness
// ============================================================================

pub fn config(store: Arc<MemoryStore>, policy: SeedPolicy) -> CoreConfig {
    CoreConfig::builder()
        .catalog_api_url("http://catalog.test")
        .user_api_url("http://users.test")
        .http_client(Arc::new(OfflineHttp))
        .secure_store(store)
        .seed_policy(policy)
        .token_key(TOKEN_KEY)
        .landing_route("/home")
        .build()
        .unwrap()
}

pub struct Harness {
    pub core: Arc<CoreService>,
    pub catalog: Arc<FakeCatalog>,
    pub identity: Arc<FakeIdentity>,
    pub store: Arc<MemoryStore>,
}

impl Harness {
    pub fn new(catalog: FakeCatalog, identity: FakeIdentity, store: MemoryStore) -> Self {
        Self::with_policy(catalog, identity, store, SeedPolicy::Once)
    }

    pub fn with_policy(
        catalog: FakeCatalog,
        identity: FakeIdentity,
        store: MemoryStore,
        policy: SeedPolicy,
    ) -> Self {
        let catalog = Arc::new(catalog);
        let identity = Arc::new(identity);
        let store = Arc::new(store);
        let core = CoreService::with_gateways(
            &config(Arc::clone(&store), policy),
            catalog.clone(),
            identity.clone(),
        );
        Self {
            core: Arc::new(core),
            catalog,
            identity,
            store,
        }
    }

    pub fn notices(&self) -> EventStream {
        self.core
            .events()
            .filter(|event| matches!(event, CoreEvent::Notification(_)))
    }
}

pub fn notices_of(stream: &mut EventStream) -> Vec<Notice> {
    stream
        .drain()
        .into_iter()
        .filter_map(|event| match event {
            CoreEvent::Notification(notice) => Some(notice),
            _ => None,
        })
        .collect()
}

pub fn ids(songs: &[Song]) -> Vec<&str> {
    songs.iter().map(|s| s.id.as_str()).collect()
}
