//! Well-known session state keys.
//!
//! Key spellings are part of the wire contract with hosts that persist the
//! snapshot, so they stay snake_case.

/// Authenticated identity acting in this session. First-write-wins.
pub const ACTING_USER_ID: &str = "acting_user_id";

/// Conversation title captured from the first user message. First-write-wins.
pub const TITLE: &str = "title";

/// Scene-label → summary text. Whole-value replace on each save.
pub const THEME_LIST: &str = "theme_list";

/// Canonical scene id → structured prompt specification. Per-key upsert.
pub const SCENE_CONFIG: &str = "scene_config";

/// Canonical scene id → ordered, append-only list of result URIs.
pub const MOVIE_URLS: &str = "movie_urls";

/// True until the first user request has been observed.
pub const FIRST_REQUEST: &str = "first_request";
