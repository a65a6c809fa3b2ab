use limn_core::CommandKind;
use serde::{Deserialize, Serialize};

/// Closed set of commands the web client's interpreter understands.
///
/// Parameters travel alongside the command as an opaque key/value map; the
/// client looks up the interpreter for the command name and hands it the
/// parameters unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebCommand {
    /// Replace a rendered fragment identified by `params["selector"]`.
    ReplaceFragment,
    SetAttribute,
    RemoveAttribute,
    /// Run a client-side script snippet from `params["script"]`.
    Eval,
    Redirect,
    Reload,
}

impl CommandKind for WebCommand {}

impl WebCommand {
    pub fn as_str(self) -> &'static str {
        match self {
            WebCommand::ReplaceFragment => "replace_fragment",
            WebCommand::SetAttribute => "set_attribute",
            WebCommand::RemoveAttribute => "remove_attribute",
            WebCommand::Eval => "eval",
            WebCommand::Redirect => "redirect",
            WebCommand::Reload => "reload",
        }
    }
}
