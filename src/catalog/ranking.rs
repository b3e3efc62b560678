use super::models::Track;

/// One flag per preferred condition, `true` when the condition is NOT met,
/// so the best matches carry the smallest key.
type RelevanceKey = (bool, bool, bool, bool);

fn relevance_key(track: &Track, query: &str) -> RelevanceKey {
    let name = track.name.to_lowercase();
    let artist = track.artist.to_lowercase();
    (
        !name.starts_with(query),
        !artist.starts_with(query),
        !name.contains(query),
        !artist.contains(query),
    )
}

/// Reorders search results by how well they match `query`, case-insensitively:
/// name prefix, then artist prefix, then name substring, then artist
/// substring, then everything else. The sort is stable so upstream order
/// remains the tie-break.
pub fn rank(tracks: Vec<Track>, query: &str) -> Vec<Track> {
    let query = query.trim().to_lowercase();
    let mut keyed: Vec<(RelevanceKey, Track)> = tracks
        .into_iter()
        .map(|track| (relevance_key(&track, &query), track))
        .collect();
    keyed.sort_by_key(|(key, _)| *key);
    keyed.into_iter().map(|(_, track)| track).collect()
}
