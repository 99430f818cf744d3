//! User-facing reply texts.
//!
//! These strings are part of the external contract with subscribers; tests
//! assert on them verbatim. Keep edits deliberate.

/// Sent when a sender exceeds the per-sender message threshold.
pub const RATE_LIMITED: &str = "Message rate limit exceeded. Please try again later.";

/// Sent when the record-store connection settings are missing.
pub const CONFIG_ERROR: &str = "Server configuration error.";

/// Sent when the subscriber lookup itself fails.
pub const STATUS_CHECK_FAILED: &str = "There was a server error checking your status.";

/// Sent to a sender who is already subscribed.
pub const ALREADY_SUBSCRIBED: &str = "Hey! You've already got the download for the app.";

/// Subscription confirmation with the app download link.
pub const SUBSCRIBED: &str =
    "You're in! Download the OOTD app here: https://ootd.app/download";

/// Sent when the subscribe insert fails for a non-duplicate reason.
pub const SUBSCRIBE_FAILED: &str =
    "Sorry, there was an error subscribing you. Please try again.";

/// Help / support-channel reply; sent for HELPOOTD regardless of outcome.
pub const HELP: &str =
    "OOTD help: text FINDOOTD to get the app download link, or email support@ootd.app.";

/// Sent for any unrecognized command text.
pub const UNKNOWN_COMMAND: &str =
    "Unknown command. Text FINDOOTD to subscribe or HELPOOTD for help.";

/// Last-resort reply when dispatch fails unexpectedly.
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred. Please try again later.";

// Plain-text transport errors; the only non-XML failure paths.
pub const EXPECTED_POST: &str = "Expected POST request";
pub const PARSE_FAILED: &str = "Failed to parse form data";
pub const MISSING_FIELDS: &str = "Missing required fields";
