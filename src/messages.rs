/// Request/response shapes of the runtime message channel
use crate::error::WorkspaceError;
use serde::{Deserialize, Serialize};

/// Every `type` tag the worker answers; service_worker.js keeps the same list
/// so other messages get no response
pub const HANDLED_MESSAGE_TYPES: [&str; 3] = ["switchWorkspace", "getCurrentWorkspace", "deleteWorkspace"];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Request {
    #[serde(rename_all = "camelCase")]
    SwitchWorkspace { workspace_id: String },
    GetCurrentWorkspace,
    #[serde(rename_all = "camelCase")]
    DeleteWorkspace { workspace_id: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Outcome {
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    CurrentWorkspace { workspace_id: String },
}

impl Response {
    pub fn success() -> Self {
        Response::Outcome {
            success: true,
            error: None,
        }
    }

    pub fn failure(error: &WorkspaceError) -> Self {
        Response::Outcome {
            success: false,
            error: Some(error.to_string()),
        }
    }
}

impl From<Result<(), WorkspaceError>> for Response {
    fn from(result: Result<(), WorkspaceError>) -> Self {
        match result {
            Ok(()) => Response::success(),
            Err(e) => Response::failure(&e),
        }
    }
}

/// The part of `chrome.runtime.MessageSender` used to pick a window
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MessageSender {
    #[serde(default)]
    pub tab: Option<SenderTab>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderTab {
    #[serde(default)]
    pub window_id: Option<i32>,
}

impl MessageSender {
    pub fn from_window(window_id: i32) -> Self {
        MessageSender {
            tab: Some(SenderTab {
                window_id: Some(window_id),
            }),
        }
    }

    pub fn window_id(&self) -> Option<i32> {
        self.tab.as_ref().and_then(|tab| tab.window_id)
    }
}
