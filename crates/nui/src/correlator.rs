use crate::name::CallName;
use crate::transport::{CallError, Transport};
use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::Value;

/// Typed requests on top of a [`Transport`].
#[derive(Debug, Clone)]
pub struct Correlator<T> {
    transport: T,
}

impl<T: Transport> Correlator<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn request<R: DeserializeOwned>(
        &self,
        name: impl Into<CallName>,
        payload: impl Serialize,
    ) -> Result<R, CallError> {
        let name = name.into();
        let payload = serde_json::to_value(payload).map_err(|source| CallError::Encode {
            name: name.clone(),
            source,
        })?;
        let value = self.transport.call(name.clone(), payload).await?;
        serde_json::from_value(value).map_err(|source| CallError::Decode { name, source })
    }

    /// Sends the call and drops whatever comes back, failures included.
    pub async fn fire(&self, name: impl Into<CallName>, payload: impl Serialize) {
        let name = name.into();
        if let Err(e) = self.request::<IgnoredAny>(name.clone(), payload).await {
            log::debug!("'{name}' dropped: {e}");
        }
    }

    /// `true` only when the host explicitly answers `true`.
    pub async fn gate(&self, name: impl Into<CallName>) -> bool {
        let name = name.into();
        match self.request::<bool>(name.clone(), Value::Null).await {
            Ok(allowed) => allowed,
            Err(e) => {
                log::warn!("'{name}' treated as denied: {e}");
                false
            }
        }
    }
}
