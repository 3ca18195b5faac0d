use serde::Serialize;

/// One SSE message: optional event name plus a data line, usually JSON.
#[derive(Clone, Debug)]
pub struct ServerEvent {
    /// `event:` field; `None` sends an unnamed message.
    pub event: Option<String>,
    /// `data:` field.
    pub data: String,
}

impl ServerEvent {
    /// Event carrying `data` verbatim.
    pub fn new(event: Option<String>, data: String) -> Self {
        Self { event, data }
    }

    /// Event whose data is `payload` encoded as JSON.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}
