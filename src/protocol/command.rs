//! Command definitions organized by CDP domain.
//!
//! Commands follow the `Domain.method` format of the Chrome DevTools Protocol.
//! Only the commands the capture pipeline issues are modelled.
//!
//! # Command Domains
//!
//! | Domain | Commands |
//! |--------|----------|
//! | `Target` | Create and attach page targets |
//! | `Page` | Lifecycle events, navigation |
//! | `Network` | Enable network observation |
//! | `Emulation` | Viewport metrics |
//! | `Browser` | Graceful shutdown |

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;

use crate::identifiers::TargetId;

// ============================================================================
// Command Wrapper
// ============================================================================

/// All protocol commands organized by domain.
///
/// This enum wraps domain-specific command enums for unified serialization.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Command {
    /// Target domain commands.
    Target(TargetCommand),
    /// Page domain commands.
    Page(PageCommand),
    /// Network domain commands.
    Network(NetworkCommand),
    /// Emulation domain commands.
    Emulation(EmulationCommand),
    /// Browser domain commands.
    Browser(BrowserCommand),
}

impl Command {
    /// Returns the `Domain.method` name, for logging.
    #[must_use]
    pub const fn method(&self) -> &'static str {
        match self {
            Self::Target(TargetCommand::CreateTarget { .. }) => "Target.createTarget",
            Self::Target(TargetCommand::AttachToTarget { .. }) => "Target.attachToTarget",
            Self::Target(TargetCommand::CloseTarget { .. }) => "Target.closeTarget",
            Self::Page(PageCommand::Enable) => "Page.enable",
            Self::Page(PageCommand::SetLifecycleEventsEnabled { .. }) => {
                "Page.setLifecycleEventsEnabled"
            }
            Self::Page(PageCommand::Navigate { .. }) => "Page.navigate",
            Self::Network(NetworkCommand::Enable) => "Network.enable",
            Self::Emulation(EmulationCommand::SetDeviceMetricsOverride { .. }) => {
                "Emulation.setDeviceMetricsOverride"
            }
            Self::Browser(BrowserCommand::Close) => "Browser.close",
        }
    }
}

// ============================================================================
// Target Commands
// ============================================================================

/// Target domain commands for page creation and attachment.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "method", content = "params")]
pub enum TargetCommand {
    /// Open a new page target.
    #[serde(rename = "Target.createTarget")]
    CreateTarget {
        /// Initial URL of the page.
        url: String,
    },

    /// Attach to a target and receive a session id.
    #[serde(rename = "Target.attachToTarget")]
    AttachToTarget {
        /// Target to attach to.
        #[serde(rename = "targetId")]
        target_id: TargetId,
        /// Multiplex the session over the browser connection.
        flatten: bool,
    },

    /// Close a page target.
    #[serde(rename = "Target.closeTarget")]
    CloseTarget {
        /// Target to close.
        #[serde(rename = "targetId")]
        target_id: TargetId,
    },
}

// ============================================================================
// Page Commands
// ============================================================================

/// Page domain commands.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "method", content = "params")]
pub enum PageCommand {
    /// Enable page domain events.
    #[serde(rename = "Page.enable")]
    Enable,

    /// Toggle `Page.lifecycleEvent` notifications.
    #[serde(rename = "Page.setLifecycleEventsEnabled")]
    SetLifecycleEventsEnabled {
        /// Whether lifecycle events are emitted.
        enabled: bool,
    },

    /// Navigate the page.
    #[serde(rename = "Page.navigate")]
    Navigate {
        /// Absolute URL.
        url: String,
    },
}

// ============================================================================
// Network Commands
// ============================================================================

/// Network domain commands.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "method", content = "params")]
pub enum NetworkCommand {
    /// Enable network events for the session.
    #[serde(rename = "Network.enable")]
    Enable,
}

// ============================================================================
// Emulation Commands
// ============================================================================

/// Emulation domain commands.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "method", content = "params")]
pub enum EmulationCommand {
    /// Override the page viewport.
    #[serde(rename = "Emulation.setDeviceMetricsOverride", rename_all = "camelCase")]
    SetDeviceMetricsOverride {
        /// Viewport width in CSS pixels.
        width: u32,
        /// Viewport height in CSS pixels.
        height: u32,
        /// Device pixel ratio.
        device_scale_factor: f64,
        /// Emulate a mobile device.
        mobile: bool,
    },
}

// ============================================================================
// Browser Commands
// ============================================================================

/// Browser domain commands.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "method", content = "params")]
pub enum BrowserCommand {
    /// Close the browser gracefully.
    #[serde(rename = "Browser.close")]
    Close,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_navigate_serialization() {
        let command = Command::Page(PageCommand::Navigate {
            url: "https://example.com/".into(),
        });
        let value = serde_json::to_value(&command).expect("serialize");
        assert_eq!(
            value,
            json!({ "method": "Page.navigate", "params": { "url": "https://example.com/" } })
        );
    }

    #[test]
    fn test_unit_command_has_no_params() {
        let value = serde_json::to_value(Command::Network(NetworkCommand::Enable))
            .expect("serialize");
        assert_eq!(value, json!({ "method": "Network.enable" }));
    }

    #[test]
    fn test_attach_uses_camel_case() {
        let command = Command::Target(TargetCommand::AttachToTarget {
            target_id: TargetId::new("T1"),
            flatten: true,
        });
        let value = serde_json::to_value(&command).expect("serialize");
        assert_eq!(value["params"]["targetId"], "T1");
        assert_eq!(value["params"]["flatten"], true);
    }

    #[test]
    fn test_device_metrics_serialization() {
        let command = Command::Emulation(EmulationCommand::SetDeviceMetricsOverride {
            width: 1280,
            height: 720,
            device_scale_factor: 1.0,
            mobile: false,
        });
        let value = serde_json::to_value(&command).expect("serialize");
        assert_eq!(value["method"], "Emulation.setDeviceMetricsOverride");
        assert_eq!(value["params"]["deviceScaleFactor"], 1.0);
        assert_eq!(value["params"]["width"], 1280);
    }

    #[test]
    fn test_method_names_match_wire() {
        let commands = [
            Command::Page(PageCommand::Enable),
            Command::Page(PageCommand::SetLifecycleEventsEnabled { enabled: true }),
            Command::Browser(BrowserCommand::Close),
            Command::Target(TargetCommand::CreateTarget {
                url: "about:blank".into(),
            }),
        ];
        for command in commands {
            let value = serde_json::to_value(&command).expect("serialize");
            assert_eq!(value["method"], command.method());
        }
    }
}
