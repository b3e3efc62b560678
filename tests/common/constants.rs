//! Shared constants for end-to-end tests
//!
//! The fake upstream in `fixtures.rs` serves exactly this catalog.

// ============================================================================
// Fake Upstream Credentials
// ============================================================================

pub const CLIENT_ID: &str = "test-client";
pub const CLIENT_SECRET: &str = "test-secret";

/// Basic auth header value for `CLIENT_ID:CLIENT_SECRET`
pub const BASIC_AUTH_HEADER: &str = "Basic dGVzdC1jbGllbnQ6dGVzdC1zZWNyZXQ=";

/// Token handed out by the fake token endpoint
pub const ACCESS_TOKEN: &str = "fake-access-token";

// ============================================================================
// Fake Catalog IDs
// ============================================================================

/// "Love Story" by Taylor Swift, has a preview but only one image
pub const TRACK_LOVE_STORY_ID: &str = "trk-love-story";

/// "True Love" by Pink, no preview, full image list
pub const TRACK_TRUE_LOVE_ID: &str = "trk-true-love";

/// "Song" by Lovers, no album images and no external url
pub const TRACK_LOVERS_ID: &str = "trk-lovers-song";

/// New release "First Light", has no tracks in the batch response
pub const ALBUM_1_ID: &str = "alb-1";

/// New release "Second Wind", first track is `ALBUM_2_TRACK_ID`
pub const ALBUM_2_ID: &str = "alb-2";

pub const ALBUM_2_TRACK_ID: &str = "trk-second-wind-1";

/// Medium album image in the fake catalog
pub const MEDIUM_IMAGE_URL: &str = "https://img.example/300.jpg";

// ============================================================================
// Fake Search Queries
// ============================================================================

/// Matches the three tracks above
pub const QUERY_LOVE: &str = "love";

/// Matches nothing
pub const QUERY_NO_MATCHES: &str = "zzzz";

/// Upstream answers 500
pub const QUERY_SERVER_ERROR: &str = "boom";

/// Upstream answers 429
pub const QUERY_RATE_LIMITED: &str = "slow down";

/// Upstream answers 403
pub const QUERY_FORBIDDEN: &str = "forbidden";

/// Upstream returns a track without artists
pub const QUERY_MALFORMED: &str = "broken";

/// Upstream returns a body that is not JSON
pub const QUERY_GARBAGE: &str = "garbage";

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for a spawned server to become ready
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Interval between readiness checks
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 10;

/// Default timeout for HTTP requests in tests
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
