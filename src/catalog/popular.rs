//! The "popular" view: latest releases resolved to full albums.

use tracing::debug;

use super::client::CatalogApi;
use super::models::Album;
use super::CatalogError;

/// Fetches a page of new releases and resolves them with a single batch
/// album call, so each album gets its representative track id.
///
/// Albums come back in batch-response order, which is not guaranteed to be
/// the new-releases order. Any upstream failure aborts the whole view.
pub async fn popular(catalog: &dyn CatalogApi, page_size: usize) -> Result<Vec<Album>, CatalogError> {
    let releases = catalog.new_releases(page_size).await?;
    if releases.is_empty() {
        debug!("No new releases, skipping album batch");
        return Ok(Vec::new());
    }

    let ids: Vec<String> = releases.into_iter().map(|stub| stub.id).collect();
    let albums = catalog.albums_batch(&ids).await?;
    debug!("Resolved {} of {} new releases", albums.len(), ids.len());
    Ok(albums)
}
