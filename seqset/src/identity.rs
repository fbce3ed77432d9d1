use std::fmt;

// SetIdentity
/// Identifies a logical set across its reference, snapshots and replicas.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SetIdentity {
    name: String,
    uuid: String,
}

impl SetIdentity {
    pub fn new(name: impl Into<String>, uuid: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uuid: uuid.into(),
        }
    }

    /// Creates an identity with a freshly generated random 128 bit id.
    pub fn generate(name: impl Into<String>) -> Self {
        let uuid = format!("{:016x}{:016x}", fastrand::u64(..), fastrand::u64(..));
        Self::new(name, uuid)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }
}

impl fmt::Display for SetIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.uuid)
    }
}
