//! Widgets besides the radial menu. Each one mounts its own subscriptions.

pub mod context;
pub mod notify;
pub mod progress;
pub mod text;

pub use context::{ContextButton, ContextMenu};
pub use notify::{NotifyKind, SoundCue, Toast, ToastPosition, Toasts};
pub use progress::{ProgressKind, ProgressWidget};
pub use text::TextBanner;
