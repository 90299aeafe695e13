//! Host/UI messaging bridge for the in-game overlay.
//!
//! The host pushes named events to the overlay and the overlay answers user
//! actions with named calls. This crate holds the wire format, the typed
//! event union, the dispatch registry and the call correlator; the daemon in
//! `overlay` wires them to a socket and to the widgets.

mod de;
pub mod macros;

pub mod correlator;
pub mod event;
pub mod frame;
pub mod name;
pub mod payload;
pub mod registry;
pub mod transport;

pub use correlator::Correlator;
pub use event::{Event, EventError, Topic, topic};
pub use frame::{CallId, Frame, PeerRole, Reply, UserInput};
pub use name::{Call, CallName, EventName};
pub use registry::{EventRegistry, Subscription};
pub use transport::{CallError, HostLink, Transport};

pub const DEFAULT_SOCKET: &str = "/tmp/overlay.sock";
