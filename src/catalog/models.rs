//! Catalog records served to the browser client, plus the upstream payload
//! shapes they are normalized from.
//!
//! Upstream payloads are parsed leniently: lists and nested objects that may
//! be missing or `null` are `Option`s, and the conversion methods apply the
//! fallback rules below instead of failing.
//!
//! - image: entry [`IMAGE_SIZE_INDEX`] of the image list, `None` when the list
//!   is absent or too short
//! - preview url: `None` when absent
//! - external url: empty string when the `external_urls` map has no link
//! - id: empty string when absent (such a track cannot be favorited)
//! - artist: first listed artist; an empty list or empty name is an error

use serde::{Deserialize, Serialize};

use super::CatalogError;

/// Upstream image lists are ordered largest first; index 1 is the medium size.
pub const IMAGE_SIZE_INDEX: usize = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub preview_url: Option<String>,
    pub external_url: String,
    #[serde(rename = "image")]
    pub image_url: Option<String>,
}

/// An album as listed by the new releases endpoint, without its tracks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumStub {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub external_url: String,
    #[serde(rename = "image")]
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    /// First track of the album listing, used as its playable stand-in.
    #[serde(rename = "track_id")]
    pub representative_track_id: Option<String>,
    pub name: String,
    pub artist: String,
    pub external_url: String,
    #[serde(rename = "image")]
    pub image_url: Option<String>,
}

// =============================================================================
// Upstream payloads
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct UpstreamPage<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<Option<T>>,
}

impl<T> UpstreamPage<T> {
    pub fn into_items(self) -> impl Iterator<Item = T> {
        self.items.into_iter().flatten()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpstreamArtist {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpstreamImage {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpstreamExternalUrls {
    pub spotify: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpstreamAlbumRef {
    pub images: Option<Vec<UpstreamImage>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpstreamTrack {
    pub id: Option<String>,
    pub name: Option<String>,
    pub artists: Option<Vec<UpstreamArtist>>,
    pub preview_url: Option<String>,
    pub external_urls: Option<UpstreamExternalUrls>,
    pub album: Option<UpstreamAlbumRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpstreamTrackRef {
    pub id: Option<String>,
}

/// Album object; the track page is only present in full album payloads.
#[derive(Debug, Deserialize)]
pub(crate) struct UpstreamAlbum {
    pub id: Option<String>,
    pub name: Option<String>,
    pub artists: Option<Vec<UpstreamArtist>>,
    pub images: Option<Vec<UpstreamImage>>,
    pub external_urls: Option<UpstreamExternalUrls>,
    pub tracks: Option<UpstreamPage<UpstreamTrackRef>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    pub tracks: Option<UpstreamPage<UpstreamTrack>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NewReleasesResponse {
    pub albums: Option<UpstreamPage<UpstreamAlbum>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AlbumsResponse {
    #[serde(default)]
    pub albums: Vec<Option<UpstreamAlbum>>,
}

fn pick_image(images: Option<&[UpstreamImage]>) -> Option<String> {
    images
        .and_then(|images| images.get(IMAGE_SIZE_INDEX))
        .map(|image| image.url.clone())
}

fn first_artist(artists: Option<Vec<UpstreamArtist>>, owner: &str) -> Result<String, CatalogError> {
    match artists
        .and_then(|artists| artists.into_iter().next())
        .and_then(|artist| artist.name)
    {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(CatalogError::MalformedItem(format!(
            "{} has no artist name",
            owner
        ))),
    }
}

fn external_url(urls: Option<UpstreamExternalUrls>) -> String {
    urls.and_then(|urls| urls.spotify).unwrap_or_default()
}

impl UpstreamTrack {
    pub fn into_track(self) -> Result<Track, CatalogError> {
        let id = self.id.unwrap_or_default();
        let artist = first_artist(self.artists, &format!("track '{}'", id))?;
        let image_url = pick_image(
            self.album
                .as_ref()
                .and_then(|album| album.images.as_deref()),
        );
        Ok(Track {
            id,
            name: self.name.unwrap_or_default(),
            artist,
            preview_url: self.preview_url,
            external_url: external_url(self.external_urls),
            image_url,
        })
    }
}

impl UpstreamAlbum {
    pub fn into_stub(self) -> Result<AlbumStub, CatalogError> {
        let id = self.id.unwrap_or_default();
        let artist = first_artist(self.artists, &format!("album '{}'", id))?;
        let image_url = pick_image(self.images.as_deref());
        Ok(AlbumStub {
            id,
            name: self.name.unwrap_or_default(),
            artist,
            external_url: external_url(self.external_urls),
            image_url,
        })
    }

    pub fn into_album(mut self) -> Result<Album, CatalogError> {
        let representative_track_id = self
            .tracks
            .take()
            .and_then(|page| page.into_items().next())
            .and_then(|track| track.id);
        let stub = self.into_stub()?;
        Ok(Album {
            id: stub.id,
            representative_track_id,
            name: stub.name,
            artist: stub.artist,
            external_url: stub.external_url,
            image_url: stub.image_url,
        })
    }
}
