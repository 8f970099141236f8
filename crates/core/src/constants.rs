//! Constants used throughout the cardio core crate.
//!
//! Storage keys, defaults and wire literals live here so the client, the CLI and the app
//! shell agree on them.

/// Default base URL of the risk-tracking REST API.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";

/// Default directory for local application storage when none is configured.
pub const DEFAULT_STORAGE_DIR: &str = ".cardio";

/// Filename of the JSON key-value store inside the storage directory.
pub const STORAGE_FILENAME: &str = "storage.json";

/// Storage key holding the serialised current session.
pub const SESSION_KEY: &str = "user";

/// Storage key holding the serialised chat list.
pub const CHAT_HISTORY_KEY: &str = "@chat_history";

/// Storage key holding the next chat id.
pub const CHAT_COUNTER_KEY: &str = "@chat_counter";

/// `message` value the login endpoint returns on success.
pub const LOGIN_SUCCESS_MESSAGE: &str = "Login successful";

/// Minimum password length accepted by the user form.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Seconds in a day; `ClockSeconds` values are strictly below this.
pub const SECONDS_PER_DAY: u32 = 86_400;
