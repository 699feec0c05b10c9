use serde::{Deserialize, Serialize};

/// Kind of backend instance that can hold a copy of a unit. The two kinds
/// report structurally different status payloads but are interchangeable
/// sources of truth once reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceKind {
    /// The built-in library manager.
    Native,
    /// A linked third-party server.
    External,
}

impl InstanceKind {
    pub const ALL: &[InstanceKind] = &[Self::Native, Self::External];

    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceKind::Native => "native",
            InstanceKind::External => "external",
        }
    }
}

impl std::fmt::Display for InstanceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configured backend instance, identified by `(kind, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub kind: InstanceKind,
    pub name: String,
    /// Backend-assigned identifier, preferred by mutation endpoints.
    pub id: Option<String>,
}

impl Instance {
    pub fn new(kind: InstanceKind, name: impl Into<String>) -> Self {
        Instance {
            kind,
            name: name.into(),
            id: None,
        }
    }

    /// Compound identity used to match in-flight responses against the
    /// current selection.
    pub fn key(&self) -> (InstanceKind, &str) {
        (self.kind, &self.name)
    }

    /// Identifier sent to mutation endpoints: the backend-assigned id when
    /// present, the display name otherwise.
    pub fn mutation_id(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.name)
    }
}
