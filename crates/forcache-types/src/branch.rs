use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Unique identifier for a speculative branch (UUID v7 for time-ordering).
///
/// Identifiers are generated at branch creation and never reused, so a
/// retired branch's id can never resolve to a different, newer branch.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchId(uuid::Uuid);

impl BranchId {
    /// Generate a new time-ordered branch ID (UUID v7).
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Create from an existing UUID.
    pub fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }

    /// Short representation (first 8 characters of UUID).
    pub fn short_id(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for BranchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BranchId({})", self.short_id())
    }
}

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BranchId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| TypeError::InvalidBranchId(s.to_string()))
    }
}

/// Lifecycle of a branch.
///
/// The only legal transitions are `Pending -> Committed` and
/// `Pending -> Rejected`. Both targets are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BranchState {
    /// Accepting writes; may still be committed or rolled back.
    Pending,
    /// Overlay folded into the confirmed store.
    Committed,
    /// Rolled back, or refused at commit time because of a version conflict.
    Rejected,
}

impl BranchState {
    /// Returns `true` for `Committed` and `Rejected`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Validate a transition to `to`, returning the new state.
    pub fn transition(self, to: BranchState) -> Result<BranchState, TypeError> {
        match (self, to) {
            (Self::Pending, Self::Committed) | (Self::Pending, Self::Rejected) => Ok(to),
            (from, to) => Err(TypeError::InvalidTransition { from, to }),
        }
    }
}

impl fmt::Display for BranchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Committed => write!(f, "COMMITTED"),
            Self::Rejected => write!(f, "REJECTED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = BranchId::new();
        let b = BranchId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn ids_are_version_7() {
        assert_eq!(BranchId::new().as_uuid().get_version_num(), 7);
    }

    #[test]
    fn id_parse_round_trip() {
        let id = BranchId::new();
        let parsed: BranchId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn id_parse_rejects_garbage() {
        let err = "not-a-branch".parse::<BranchId>().unwrap_err();
        assert_eq!(err, TypeError::InvalidBranchId("not-a-branch".into()));
    }

    #[test]
    fn id_short_and_debug() {
        let id = BranchId::new();
        assert_eq!(id.short_id().len(), 8);
        assert!(format!("{id:?}").starts_with("BranchId("));
    }

    #[test]
    fn id_serializes_as_string() {
        let id = BranchId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }

    #[test]
    fn pending_moves_forward() {
        assert_eq!(
            BranchState::Pending.transition(BranchState::Committed),
            Ok(BranchState::Committed)
        );
        assert_eq!(
            BranchState::Pending.transition(BranchState::Rejected),
            Ok(BranchState::Rejected)
        );
    }

    #[test]
    fn terminal_states_never_move() {
        for from in [BranchState::Committed, BranchState::Rejected] {
            assert!(from.is_terminal());
            for to in [BranchState::Pending, BranchState::Committed, BranchState::Rejected] {
                assert!(from.transition(to).is_err(), "{from} -> {to} must fail");
            }
        }
        assert!(BranchState::Pending.transition(BranchState::Pending).is_err());
    }

    #[test]
    fn state_wire_names() {
        assert_eq!(BranchState::Pending.to_string(), "PENDING");
        let json = serde_json::to_string(&BranchState::Rejected).unwrap();
        assert_eq!(json, "\"REJECTED\"");
    }
}
