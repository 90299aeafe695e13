//! Push events as a tagged union keyed by event name.

use crate::name::EventName;
use crate::payload::{
    CircleProgressData, ContextMenuData, MenuItem, NotificationData, OpenMenu, ProgressData,
    TextUiData,
};
use serde::de::IgnoredAny;
use serde_json::Value;
use thiserror::Error;

/// A known event name together with the static type of its payload.
pub trait Topic {
    const NAME: &'static str;
    type Payload;

    fn payload(event: &Event) -> Option<&Self::Payload>;
}

#[derive(Debug, Error)]
pub enum EventError {
    #[error("malformed payload for '{name}': {source}")]
    Malformed {
        name: EventName,
        #[source]
        source: serde_json::Error,
    },
}

macro_rules! events {
    ($( $(#[$meta:meta])* $topic:ident($payload:ty) = $name:literal; )*) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum Event {
            $( $(#[$meta])* $topic($payload), )*
            /// Any event name this crate has no payload type for.
            Other { name: EventName, payload: Value },
        }

        impl Event {
            /// Decodes the payload according to `name`. Unknown names are kept as raw JSON.
            pub fn decode(name: EventName, data: Value) -> Result<Self, EventError> {
                match name.as_str() {
                    $(
                        $name => serde_json::from_value(data)
                            .map(Self::$topic)
                            .map_err(|source| EventError::Malformed { name: name.clone(), source }),
                    )*
                    _ => Ok(Self::Other { name, payload: data }),
                }
            }

            pub fn name(&self) -> EventName {
                match self {
                    $( Self::$topic(_) => EventName::from($name), )*
                    Self::Other { name, .. } => name.clone(),
                }
            }
        }

        /// Marker types for subscribing with a typed payload.
        pub mod topic {
            use super::*;

            $(
                #[derive(Debug, Clone, Copy)]
                pub struct $topic;

                impl Topic for $topic {
                    const NAME: &'static str = $name;
                    type Payload = $payload;

                    fn payload(event: &Event) -> Option<&Self::Payload> {
                        match event {
                            Event::$topic(payload) => Some(payload),
                            _ => None,
                        }
                    }
                }
            )*
        }
    };
}

events! {
    OpenRadialMenu(OpenMenu) = "openRadialMenu";
    RefreshItems(Vec<MenuItem>) = "refreshItems";
    TextUi(TextUiData) = "textUi";
    TextUiHide(IgnoredAny) = "textUiHide";
    Progress(ProgressData) = "progress";
    CircleProgress(CircleProgressData) = "circleProgress";
    ProgressCancel(IgnoredAny) = "progressCancel";
    Notify(NotificationData) = "notify";
    ShowContext(ContextMenuData) = "showContext";
    HideContext(IgnoredAny) = "hideContext";
}
