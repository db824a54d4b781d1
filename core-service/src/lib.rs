//! Core service façade and bootstrap helpers.
//!
//! `CoreService` is the application root: it builds the catalog, session and
//! identity stores once from a [`CoreConfig`], owns them, and hands out shared
//! references. Nothing here is process-global; hosts create one service and
//! pass it down.
//!
//! Desktop apps typically enable the `desktop-shims` feature so the config
//! builder can fall back to the reqwest HTTP client and the OS keyring.
//!
//! ```no_run
//! use core_runtime::config::CoreConfig;
//! use core_service::CoreService;
//!
//! # async fn example() -> core_service::Result<()> {
//! let config = CoreConfig::builder()
//!     .catalog_api_url("http://localhost:8000")
//!     .user_api_url("http://localhost:5000")
//!     .build()?;
//!
//! let core = CoreService::new(config)?;
//! core.start().await;
//! core.next()?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod playlist;

pub use error::{CoreError, Result};
pub use playlist::{playlist_view, PlaylistView};

pub use core_runtime::config::{CoreConfig, CoreConfigBuilder, SeedPolicy};
pub use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};

use core_auth::{IdentityGateway, IdentityStore, SignedIn, TokenStore, User};
use core_catalog::{
    Album, AlbumDetail, AlbumId, CatalogGateway, CatalogStore, Fetched, Song, SongId,
};
use core_playback::{PlaybackSession, SessionManager};
use core_runtime::events::{EventBus, EventStream};
use provider_rest::RestGateway;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, instrument};

/// Outcome of [`CoreService::start`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupReport {
    /// User resolved from the persisted token, if any.
    pub restored_user: Option<User>,
    pub songs_loaded: bool,
    pub albums_loaded: bool,
    /// Whether the session points at a song once startup settles.
    pub seeded: bool,
}

/// Primary façade exposed to host applications.
pub struct CoreService {
    event_bus: EventBus,
    catalog: Arc<CatalogStore>,
    session: Arc<SessionManager>,
    identity: Arc<IdentityStore>,
    playlist: Arc<PlaylistView>,
}

impl CoreService {
    /// Builds the service against the REST services named in `config`.
    pub fn new(config: CoreConfig) -> Result<Self> {
        config.validate()?;
        let gateway = Arc::new(RestGateway::from_config(&config));
        Ok(Self::with_gateways(&config, gateway.clone(), gateway))
    }

    /// Builds the service over explicit gateways.
    ///
    /// The bridges in `config` are only used for token persistence; remote
    /// calls go through the two gateways.
    pub fn with_gateways(
        config: &CoreConfig,
        catalog_gateway: Arc<dyn CatalogGateway>,
        identity_gateway: Arc<dyn IdentityGateway>,
    ) -> Self {
        let event_bus = EventBus::new(config.event_buffer_size);

        let catalog = Arc::new(CatalogStore::new(catalog_gateway, event_bus.clone()));
        let session = Arc::new(SessionManager::new(
            Arc::clone(&catalog),
            event_bus.clone(),
            config.seed_policy,
        ));
        let identity = Arc::new(IdentityStore::new(
            identity_gateway,
            TokenStore::new(config.secure_store.clone(), config.token_key.clone()),
            event_bus.clone(),
            config.landing_route.clone(),
        ));
        let playlist = Arc::new(PlaylistView::new(
            Arc::clone(&catalog),
            Arc::clone(&identity),
        ));

        Self {
            event_bus,
            catalog,
            session,
            identity,
            playlist,
        }
    }

    pub fn catalog(&self) -> Arc<CatalogStore> {
        Arc::clone(&self.catalog)
    }

    pub fn session(&self) -> Arc<SessionManager> {
        Arc::clone(&self.session)
    }

    pub fn identity(&self) -> Arc<IdentityStore> {
        Arc::clone(&self.identity)
    }

    pub fn playlist_view(&self) -> Arc<PlaylistView> {
        Arc::clone(&self.playlist)
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// New subscription to every event emitted by the stores.
    pub fn events(&self) -> EventStream {
        EventStream::new(self.event_bus.subscribe())
    }

    /// Restores the persisted sign-in and loads songs and albums concurrently.
    ///
    /// Each part completes on its own; failures are already reported on the
    /// event bus and only show up here as `false`.
    #[instrument(skip(self))]
    pub async fn start(&self) -> StartupReport {
        let (restored_user, songs, albums) = tokio::join!(
            self.identity.restore_from_token(),
            self.load_songs(),
            self.load_albums(),
        );

        let report = StartupReport {
            restored_user,
            songs_loaded: songs.is_ok(),
            albums_loaded: albums.is_ok(),
            seeded: self.session.is_seeded(),
        };
        info!(
            restored = report.restored_user.is_some(),
            songs_loaded = report.songs_loaded,
            albums_loaded = report.albums_loaded,
            "Core started"
        );
        report
    }

    /// Loads the song list and seeds the session from it.
    pub async fn load_songs(&self) -> Result<Fetched<Arc<[Song]>>> {
        let fetched = self.catalog.load_songs().await?;
        if let Fetched::Applied(songs) = &fetched {
            self.session.seed(songs);
        }
        Ok(fetched)
    }

    pub async fn load_albums(&self) -> Result<Fetched<Arc<[Album]>>> {
        Ok(self.catalog.load_albums().await?)
    }

    pub async fn load_album_detail(&self, album_id: AlbumId) -> Result<Fetched<AlbumDetail>> {
        Ok(self.catalog.load_album_detail(album_id).await?)
    }

    pub async fn load_song_detail(&self, song_id: SongId) -> Result<Fetched<Song>> {
        Ok(self.catalog.load_song_detail(song_id).await?)
    }

    pub fn songs(&self) -> Arc<[Song]> {
        self.catalog.songs()
    }

    pub fn albums(&self) -> Arc<[Album]> {
        self.catalog.albums()
    }

    pub fn playback(&self) -> PlaybackSession {
        self.session.snapshot()
    }

    pub fn select_song(&self, song_id: SongId) {
        self.session.select_song(song_id);
    }

    pub fn play_song(&self, song_id: SongId) -> Result<()> {
        Ok(self.session.play_song(song_id)?)
    }

    pub fn set_playing(&self, playing: bool) -> Result<()> {
        Ok(self.session.set_playing(playing)?)
    }

    pub fn toggle_playing(&self) -> Result<bool> {
        Ok(self.session.toggle_playing()?)
    }

    pub fn next(&self) -> Result<SongId> {
        Ok(self.session.next()?)
    }

    pub fn previous(&self) -> Result<Option<SongId>> {
        Ok(self.session.previous()?)
    }

    pub async fn fetch_selected_detail(&self) -> Result<Option<Fetched<Song>>> {
        Ok(self.session.fetch_selected_detail().await?)
    }

    pub async fn restore_from_token(&self) -> Option<User> {
        self.identity.restore_from_token().await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<SignedIn> {
        Ok(self.identity.login(email, password).await?)
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<SignedIn> {
        Ok(self.identity.register(name, email, password).await?)
    }

    /// Signs out in memory before returning; await the result to also
    /// delete the persisted token.
    pub fn logout(&self) -> impl Future<Output = ()> + Send + '_ {
        self.identity.logout()
    }

    pub async fn add_to_playlist(&self, song_id: SongId) -> Result<User> {
        Ok(self.identity.add_to_playlist(song_id).await?)
    }

    pub fn user(&self) -> Option<User> {
        self.identity.user()
    }

    /// Saved songs of the signed-in user, in catalog order.
    pub fn playlist(&self) -> Arc<[Song]> {
        self.playlist.songs()
    }
}

impl fmt::Debug for CoreService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoreService")
            .field("session", &self.session.snapshot())
            .field("authenticated", &self.identity.is_authenticated())
            .field("event_bus", &self.event_bus)
            .finish()
    }
}
