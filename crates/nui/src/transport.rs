use crate::frame::{CallId, Frame, Reply};
use crate::name::CallName;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum CallError {
    #[error("call '{0}' timed out after {1:?}")]
    Timeout(CallName, Duration),
    #[error("no host attached and no stub configured for '{0}'")]
    Unreachable(CallName),
    #[error("host link closed before '{0}' was answered")]
    Disconnected(CallName),
    #[error("host rejected '{name}': {message}")]
    Remote { name: CallName, message: String },
    #[error("failed to encode payload for '{name}': {source}")]
    Encode {
        name: CallName,
        #[source]
        source: serde_json::Error,
    },
    #[error("unexpected reply to '{name}': {source}")]
    Decode {
        name: CallName,
        #[source]
        source: serde_json::Error,
    },
}

/// UI→host call mechanism.
pub trait Transport {
    fn call(
        &self,
        name: CallName,
        payload: Value,
    ) -> impl Future<Output = Result<Value, CallError>> + Send;
}

/// Identifies one attachment of a host connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkEpoch(u64);

struct Attachment {
    epoch: LinkEpoch,
    outbound: mpsc::UnboundedSender<Frame>,
}

struct Pending {
    name: CallName,
    epoch: LinkEpoch,
    reply: oneshot::Sender<Reply>,
}

struct LinkState {
    attachment: Option<Attachment>,
    pending: HashMap<CallId, Pending>,
    stubs: HashMap<CallName, Value>,
    timeout: Duration,
    next_call: u64,
    next_epoch: u64,
}

/// The overlay's side of the host connection.
///
/// At most one host connection is attached at a time; attaching a new one
/// fails every call still waiting on the previous one. While no host is
/// attached, calls are answered from the stub table.
#[derive(Clone)]
pub struct HostLink {
    state: Arc<Mutex<LinkState>>,
}

impl HostLink {
    pub fn new(timeout: Duration, stubs: impl IntoIterator<Item = (CallName, Value)>) -> Self {
        Self {
            state: Arc::new(Mutex::new(LinkState {
                attachment: None,
                pending: HashMap::new(),
                stubs: stubs.into_iter().collect(),
                timeout,
                next_call: 0,
                next_epoch: 0,
            })),
        }
    }

    /// Makes the caller the active host. Outbound call frames arrive on the returned receiver.
    pub fn attach(&self) -> (LinkEpoch, mpsc::UnboundedReceiver<Frame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.state.lock();
        state.next_epoch += 1;
        let epoch = LinkEpoch(state.next_epoch);
        if let Some(previous) = state.attachment.replace(Attachment {
            epoch,
            outbound: tx,
        }) {
            log::info!("host link {:?} replaced by {:?}", previous.epoch, epoch);
            Self::drop_pending(&mut state, previous.epoch);
        }
        (epoch, rx)
    }

    /// Detaches `epoch` if it is still the active host. Returns whether it was.
    pub fn detach(&self, epoch: LinkEpoch) -> bool {
        let mut state = self.state.lock();
        if state.attachment.as_ref().is_none_or(|a| a.epoch != epoch) {
            return false;
        }
        state.attachment = None;
        Self::drop_pending(&mut state, epoch);
        true
    }

    pub fn is_attached(&self) -> bool {
        self.state.lock().attachment.is_some()
    }

    /// Routes a host reply to its waiting call. Returns `false` for unknown or expired ids.
    pub fn resolve(&self, reply: Reply) -> bool {
        let Some(pending) = self.state.lock().pending.remove(&reply.id) else {
            log::warn!("reply for unknown call {}", reply.id);
            return false;
        };
        log::debug!("reply for '{}' ({})", pending.name, reply.id);
        pending.reply.send(reply).is_ok()
    }

    pub fn pending_calls(&self) -> usize {
        self.state.lock().pending.len()
    }

    pub fn set_timeout(&self, timeout: Duration) {
        self.state.lock().timeout = timeout;
    }

    pub fn set_stubs(&self, stubs: impl IntoIterator<Item = (CallName, Value)>) {
        self.state.lock().stubs = stubs.into_iter().collect();
    }

    fn drop_pending(state: &mut LinkState, epoch: LinkEpoch) {
        state.pending.retain(|_, pending| pending.epoch != epoch);
    }

    async fn roundtrip(&self, name: CallName, payload: Value) -> Result<Value, CallError> {
        let (id, rx, timeout) = {
            let mut state = self.state.lock();
            let Some(attachment) = state.attachment.as_ref() else {
                log::debug!("no host attached, answering '{name}' from stubs");
                return state
                    .stubs
                    .get(&name)
                    .cloned()
                    .ok_or(CallError::Unreachable(name));
            };
            let epoch = attachment.epoch;
            let outbound = attachment.outbound.clone();

            state.next_call += 1;
            let id = CallId::from(state.next_call);
            let frame = Frame::Call {
                id,
                name: name.clone(),
                data: payload,
            };
            if outbound.send(frame).is_err() {
                return Err(CallError::Disconnected(name));
            }

            let (tx, rx) = oneshot::channel();
            state.pending.insert(
                id,
                Pending {
                    name: name.clone(),
                    epoch,
                    reply: tx,
                },
            );
            (id, rx, state.timeout)
        };

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(reply)) => reply.into_result(&name),
            Ok(Err(_)) => Err(CallError::Disconnected(name)),
            Err(_) => {
                self.state.lock().pending.remove(&id);
                Err(CallError::Timeout(name, timeout))
            }
        }
    }
}

impl Transport for HostLink {
    fn call(
        &self,
        name: CallName,
        payload: Value,
    ) -> impl Future<Output = Result<Value, CallError>> + Send {
        let link = self.clone();
        async move { link.roundtrip(name, payload).await }
    }
}

impl Reply {
    pub fn into_result(self, name: &CallName) -> Result<Value, CallError> {
        match self.error {
            Some(message) => Err(CallError::Remote {
                name: name.clone(),
                message,
            }),
            None => Ok(self.data),
        }
    }
}
