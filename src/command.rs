//! Inbound command normalization.

/// A recognized instruction parsed from the message body.
///
/// The dispatch key is the body text uppercased and trimmed, so `findootd`,
/// ` FINDOOTD ` and `FindOOTD` all dispatch the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `FINDOOTD` — subscribe and receive the app download link.
    Find,
    /// `HELPOOTD` — help/support reply (subscribes as a side effect).
    Help,
    /// Anything else.
    Unknown,
}

impl Command {
    /// Parse a raw message body into a command.
    pub fn parse(body: &str) -> Self {
        match body.trim().to_uppercase().as_str() {
            "FINDOOTD" => Command::Find,
            "HELPOOTD" => Command::Help,
            _ => Command::Unknown,
        }
    }
}
