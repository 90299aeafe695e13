use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display as StrumDisplay, EnumIter, EnumString};

/// Name of a host→UI push event, e.g. `openRadialMenu`.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct EventName(String);

crate::impl_string_newtype!(EventName);

/// Name of a UI→host call endpoint, e.g. `radialClick`.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct CallName(String);

crate::impl_string_newtype!(CallName);

/// Calls the overlay issues to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, StrumDisplay, AsRefStr)]
#[strum(serialize_all = "camelCase")]
pub enum Call {
    RadialTransition,
    RadialClick,
    RadialBack,
    RadialClose,
    ProgressComplete,
    OpenContext,
    ClickContext,
    CloseContext,
}

impl From<Call> for CallName {
    fn from(call: Call) -> Self {
        CallName::new(call.as_ref())
    }
}
