//! Identity types
//!
//! A client id names one avatar instance towards the backend. The backend keys
//! its per-client command queue and status on this string.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Client identity - opaque string as seen by the backend
#[derive(Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(id: impl Into<String>) -> Self {
        ClientId(id.into())
    }

    /// Random 64-bit id rendered as 16 hex digits
    pub fn generate() -> Self {
        let raw: u64 = rand::thread_rng().gen();
        ClientId(format!("{raw:016x}"))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Client({})", self.0)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClientId {
    fn from(s: &str) -> Self {
        ClientId::new(s)
    }
}
