use serde::Serialize;

/// Whether the durable mirror is keeping up with the in-memory snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum PersistenceStatus {
    #[default]
    Healthy,
    /// The last save failed; commits are held in memory only.
    #[serde(rename_all = "camelCase")]
    Degraded { last_error: String },
}

impl PersistenceStatus {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}
