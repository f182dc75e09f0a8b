//! Collaborators around the external extraction tool: watch-URL
//! normalization, flat-playlist fetching and stream resolution.

mod playlist;
mod resolver;
mod url;

pub use playlist::{FetchError, FetchedPlaylist, fetch_playlist};
pub use resolver::{ResolveError, resolve_stream};
pub use url::normalize_watch_url;
