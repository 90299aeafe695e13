use derive_more::{Display, From};

pub mod app;
pub mod effects;
pub mod hud;
pub mod menu;

pub use effects::{Effect, Effects, HostRequest};

/// Identifies one scheduled or in-flight operation of a widget. Results carrying
/// an outdated ticket are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, From)]
pub struct Ticket(u64);

impl Ticket {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}
