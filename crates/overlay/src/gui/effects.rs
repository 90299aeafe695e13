use crate::events::AppEvent;
use crate::gui::Ticket;
use async_channel::Sender;
use nui::{Call, Correlator, HostLink};
use serde_json::Value;
use std::time::Duration;

/// A call to the host whose reply is not awaited by the widget.
#[derive(Debug, Clone, PartialEq)]
pub struct HostRequest {
    pub call: Call,
    pub payload: Value,
}

impl HostRequest {
    pub fn new(call: Call, payload: Value) -> Self {
        Self { call, payload }
    }

    pub fn bare(call: Call) -> Self {
        Self::new(call, Value::Null)
    }
}

/// Side effects requested by widget state machines. Widgets never perform
/// I/O themselves; the app loop hands these to [`Effects::run`].
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Call(HostRequest),
    /// Ask the host whether a page change may happen; the answer comes back
    /// as [`AppEvent::TransitionSettled`] with this ticket.
    Transition(Ticket),
    /// Deliver `event` to the app loop after `delay`.
    Schedule { delay: Duration, event: AppEvent },
}

impl Effect {
    pub fn call(call: Call, payload: Value) -> Self {
        Self::Call(HostRequest::new(call, payload))
    }

    pub fn bare(call: Call) -> Self {
        Self::Call(HostRequest::bare(call))
    }
}

#[derive(Clone)]
pub struct Effects {
    bridge: Correlator<HostLink>,
    tx: Sender<AppEvent>,
}

impl Effects {
    pub fn new(link: HostLink, tx: Sender<AppEvent>) -> Self {
        Self {
            bridge: Correlator::new(link),
            tx,
        }
    }

    pub fn link(&self) -> &HostLink {
        self.bridge.transport()
    }

    pub fn run(&self, effect: Effect) {
        match effect {
            Effect::Call(HostRequest { call, payload }) => {
                log::debug!("-> {call} {payload}");
                let bridge = self.bridge.clone();
                tokio::spawn(async move { bridge.fire(call, payload).await });
            }
            Effect::Transition(ticket) => {
                log::debug!("-> {} (ticket {ticket})", Call::RadialTransition);
                let bridge = self.bridge.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let allowed = bridge.gate(Call::RadialTransition).await;
                    let _ = tx
                        .send(AppEvent::TransitionSettled { ticket, allowed })
                        .await;
                });
            }
            Effect::Schedule { delay, event } => {
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = tx.send(event).await;
                });
            }
        }
    }

    pub fn run_all(&self, effects: impl IntoIterator<Item = Effect>) {
        effects.into_iter().for_each(|effect| self.run(effect));
    }
}
