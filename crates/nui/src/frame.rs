//! Line-delimited JSON frames exchanged over the host socket.
//!
//! ```text
//! {"kind":"hello","role":"host"}
//! {"kind":"push","action":"openRadialMenu","data":{"items":[...]}}
//! {"kind":"call","id":7,"name":"radialTransition","data":null}
//! {"kind":"reply","id":7,"data":true}
//! {"kind":"input","input":{"type":"radialSlot","slot":3}}
//! ```

use crate::name::{CallName, EventName};
use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    From,
    Into,
)]
#[serde(transparent)]
pub struct CallId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeerRole {
    /// Receives calls and answers them.
    Host,
    /// Only pushes events or input.
    Control,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub id: CallId,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Reply {
    pub fn ok(id: CallId, data: Value) -> Self {
        Self {
            id,
            data,
            error: None,
        }
    }

    pub fn error(id: CallId, message: impl Into<String>) -> Self {
        Self {
            id,
            data: Value::Null,
            error: Some(message.into()),
        }
    }
}

/// Player input, injected by whatever draws the overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UserInput {
    /// A slot on the radial menu's current page.
    RadialSlot { slot: usize },
    /// The radial menu's center control (back or close).
    RadialCenter,
    ContextOption { key: String },
    ContextBack,
    ContextClose,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Frame {
    Hello {
        role: PeerRole,
    },
    Push {
        action: EventName,
        #[serde(default)]
        data: Value,
    },
    Call {
        id: CallId,
        name: CallName,
        #[serde(default)]
        data: Value,
    },
    Reply(Reply),
    Input {
        input: UserInput,
    },
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),
}

impl Frame {
    pub fn parse(line: &str) -> Result<Self, FrameError> {
        Ok(serde_json::from_str(line.trim())?)
    }

    /// Single line, without the trailing newline.
    pub fn encode(&self) -> Result<String, FrameError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn push(action: impl Into<EventName>, data: Value) -> Self {
        Self::Push {
            action: action.into(),
            data,
        }
    }
}
