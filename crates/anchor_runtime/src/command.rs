//! The `chronoanchor` command.
//!
//! Only one subcommand exists: `reload`, gated by [`RELOAD_PERMISSION`].

use crate::service::AnchorService;
use crate::source::ConfigSource;
use crate::ticker::Ticker;

/// Permission node required for `chronoanchor reload`.
pub const RELOAD_PERMISSION: &str = "chronoanchors.command.reload";

/// Whoever issued a command.
pub trait CommandSender {
    fn has_permission(&self, node: &str) -> bool;
}

/// The reply sent back to the command sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandReply {
    Reloaded,
    /// The new configuration was rejected; the old one is still in effect.
    ReloadFailed(String),
    PermissionDenied,
    Usage,
}

impl std::fmt::Display for CommandReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandReply::Reloaded => f.write_str("ChronoAnchors configuration reloaded successfully!"),
            CommandReply::ReloadFailed(reason) => {
                write!(f, "ChronoAnchors configuration reload failed: {reason}")
            }
            CommandReply::PermissionDenied => {
                f.write_str("You do not have permission to use this command.")
            }
            CommandReply::Usage => f.write_str("Usage: /chronoanchor reload"),
        }
    }
}

impl<T: Ticker, S: ConfigSource> AnchorService<T, S> {
    /// Run `chronoanchor <args>` on behalf of `sender`.
    pub fn handle_command(&mut self, sender: &dyn CommandSender, args: &[&str]) -> CommandReply {
        match args.first() {
            Some(sub) if sub.eq_ignore_ascii_case("reload") => {
                if !sender.has_permission(RELOAD_PERMISSION) {
                    return CommandReply::PermissionDenied;
                }
                match self.reload_configuration() {
                    Ok(_) => CommandReply::Reloaded,
                    Err(e) => CommandReply::ReloadFailed(e.to_string()),
                }
            }
            _ => CommandReply::Usage,
        }
    }
}
