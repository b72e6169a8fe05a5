use serde::{Deserialize, Serialize};

/// The two fetch shapes a source adapter can offer.
///
/// A multi-pair source returns rates for many targets from one request; a
/// single-pair source returns exactly one target's rate per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    MultiPair,
    SinglePair,
}

impl Capability {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MultiPair => "multi",
            Self::SinglePair => "single",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
