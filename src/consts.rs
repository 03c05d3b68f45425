//! Project-wide constants.

use std::path::PathBuf;
use std::time::Duration;

/// Number of downstream calls allowed to run at once.
pub const DEFAULT_WORKERS: usize = 5;

/// How long a handler waits on the completion service before giving up.
pub const DEFAULT_COMPLETION_TIMEOUT: Duration = Duration::from_secs(20);

/// Prefix of the per-user tarot record key.
pub const TAROT_KEY_PREFIX: &str = "tarot_analysis:";

// --- User-facing replies ---

pub const CHAT_TIMEOUT_MESSAGE: &str = "ChatGPT is taking too long, please try again later.";
pub const ANALYSIS_TIMEOUT_MESSAGE: &str = "Analysis request timed out, please try again later.";
pub const FAILURE_MESSAGE: &str =
    "Sorry, something went wrong while handling your request. Please try again later.";
pub const ADD_USAGE: &str = "Usage: /add <keyword>";
pub const DRAW_FIRST_MESSAGE: &str =
    "You haven't drawn tarot cards yet, please use the /tarot command to draw cards first.";
pub const SET_PHONE_MESSAGE: &str =
    "Please set your phone number through /match <your phone number>.";
pub const NO_MATCH_MESSAGE: &str =
    "There are currently no users matching the same card. Please try again later.";

/// Default store path: `~/.tarotbot/tarotbot.db`.
pub fn default_store_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".tarotbot")
        .join("tarotbot.db")
}
