//! Wire types for the catalog and user services
//!
//! Ids may arrive as JSON strings or numbers; both become opaque string ids.
//! Optional text fields accept `null` as well as being absent.

use core_auth::{AuthResponse, AuthToken, PlaylistToggle, User, UserId};
use core_catalog::{Album, AlbumDetail, AlbumId, Song, SongId};
use serde::{Deserialize, Deserializer, Serialize};

/// An id the services send either as a string or as a number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Number(serde_json::Number),
}

impl From<WireId> for String {
    fn from(id: WireId) -> Self {
        match id {
            WireId::Text(text) => text,
            WireId::Number(number) => number.to_string(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    WireId::deserialize(deserializer).map(String::from)
}

fn optional_string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<WireId>::deserialize(deserializer)?
        .map(String::from)
        .unwrap_or_default())
}

/// Treats an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn ids_string_or_number<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let ids = Option::<Vec<WireId>>::deserialize(deserializer)?;
    Ok(ids
        .unwrap_or_default()
        .into_iter()
        .map(String::from)
        .collect())
}

/// Song resource
#[derive(Debug, Clone, Deserialize)]
pub struct SongResource {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    pub title: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub thumbnail: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub audio: String,

    /// Owning album id
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub album: String,
}

impl From<SongResource> for Song {
    fn from(resource: SongResource) -> Self {
        Song {
            id: SongId::new(resource.id),
            title: resource.title,
            description: resource.description,
            thumbnail: resource.thumbnail,
            audio: resource.audio,
            album_id: AlbumId::new(resource.album),
        }
    }
}

/// Album resource
#[derive(Debug, Clone, Deserialize)]
pub struct AlbumResource {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    pub title: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub thumbnail: String,
}

impl From<AlbumResource> for Album {
    fn from(resource: AlbumResource) -> Self {
        Album {
            id: AlbumId::new(resource.id),
            title: resource.title,
            description: resource.description,
            thumbnail: resource.thumbnail,
        }
    }
}

/// `GET /api/v1/album/{id}` response
#[derive(Debug, Deserialize)]
pub struct AlbumWithSongsResponse {
    pub album: AlbumResource,

    #[serde(default, deserialize_with = "null_as_default")]
    pub songs: Vec<SongResource>,
}

impl From<AlbumWithSongsResponse> for AlbumDetail {
    fn from(response: AlbumWithSongsResponse) -> Self {
        AlbumDetail {
            album: response.album.into(),
            songs: response.songs.into_iter().map(Song::from).collect(),
        }
    }
}

/// User resource
#[derive(Debug, Clone, Deserialize)]
pub struct UserResource {
    #[serde(rename = "_id", deserialize_with = "string_or_number")]
    pub id: String,

    pub name: String,

    pub email: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,

    /// Saved song ids
    #[serde(default, deserialize_with = "ids_string_or_number")]
    pub playlist: Vec<String>,
}

impl From<UserResource> for User {
    fn from(resource: UserResource) -> Self {
        User {
            id: UserId::new(resource.id),
            name: resource.name,
            email: resource.email,
            role: resource.role,
            playlist: resource.playlist.into_iter().map(SongId::new).collect(),
        }
    }
}

/// Login/register response
#[derive(Debug, Deserialize)]
pub struct AuthResponseBody {
    pub token: String,
    pub user: UserResource,
    #[serde(default)]
    pub message: Option<String>,
}

impl From<AuthResponseBody> for AuthResponse {
    fn from(body: AuthResponseBody) -> Self {
        AuthResponse {
            token: AuthToken::new(body.token),
            user: body.user.into(),
            message: body.message,
        }
    }
}

/// Body carrying only a human-readable message.
///
/// Used both for playlist toggle replies and for error payloads.
#[derive(Debug, Default, Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub message: Option<String>,
}

impl From<MessageBody> for PlaylistToggle {
    fn from(body: MessageBody) -> Self {
        PlaylistToggle {
            message: body.message,
        }
    }
}

/// Empty JSON object sent as the playlist toggle body.
#[derive(Debug, Serialize)]
pub struct EmptyBody {}
