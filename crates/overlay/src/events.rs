use crate::gui::Ticket;
use crate::gui::hud::ProgressKind;
use nui::{Event, UserInput};

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// A decoded host push.
    Push(Event),
    Input(UserInput),
    HostAttached,
    HostDetached,
    TransitionSettled { ticket: Ticket, allowed: bool },
    ProgressElapsed { kind: ProgressKind, ticket: Ticket },
    ToastExpired(Ticket),
    ConfigReload,
}
