//! Core data model.
//!
//! An item is an opaque content file identified by a positive integer ID. It
//! lives in exactly one stage directory at a time and moves from `review` to
//! one of the terminal stages.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::Error;

// ---------------------------------------------------------------------------
// Item ID
// ---------------------------------------------------------------------------

/// Newtype for item IDs. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct ItemId(u64);

impl ItemId {
    /// Build an ID, rejecting zero.
    pub fn new(raw: u64) -> Option<Self> {
        (raw > 0).then_some(Self(raw))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for ItemId {
    type Error = Error;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        Self::new(raw).ok_or_else(|| Error::InvalidId(raw.to_string()))
    }
}

impl From<ItemId> for u64 {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

impl FromStr for ItemId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // u64 parsing accepts a leading '+'; file names and URL segments must be digits only
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidId(s.to_string()));
        }
        s.parse::<u64>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| Error::InvalidId(s.to_string()))
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// Workflow stage of an item. Each stage is backed by one directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Entry stage. Items wait here for a decision.
    Review,
    /// Accepted. Terminal.
    Accept,
    /// Rejected. Terminal.
    Reject,
}

impl Stage {
    /// All stages, in directory order.
    pub const ALL: [Stage; 3] = [Stage::Review, Stage::Accept, Stage::Reject];

    /// Directory name under the data root.
    pub fn dir_name(self) -> &'static str {
        match self {
            Stage::Review => "review",
            Stage::Accept => "accept",
            Stage::Reject => "reject",
        }
    }

    /// Position in [`Stage::ALL`]; used to index per-stage tables.
    pub(crate) fn index(self) -> usize {
        match self {
            Stage::Review => 0,
            Stage::Accept => 1,
            Stage::Reject => 2,
        }
    }

    /// Can an item move from self to `to`?
    pub fn can_transition_to(self, to: Stage) -> bool {
        use Stage::*;
        matches!((self, to), (Review, Accept) | (Review, Reject))
    }

    /// Is this a terminal stage?
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Accept | Stage::Reject)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

impl FromStr for Stage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.dir_name() == s)
            .ok_or_else(|| Error::UnknownStage(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Move Request
// ---------------------------------------------------------------------------

/// An instruction to move one item between stages.
///
/// Created by a producer, consumed exactly once by the move processor, then
/// discarded. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub id: ItemId,
    pub from: Stage,
    pub to: Stage,
}

impl MoveRequest {
    pub fn new(id: ItemId, from: Stage, to: Stage) -> Self {
        Self { id, from, to }
    }

    /// `review -> accept`.
    pub fn accept(id: ItemId) -> Self {
        Self::new(id, Stage::Review, Stage::Accept)
    }

    /// `review -> reject`.
    pub fn reject(id: ItemId) -> Self {
        Self::new(id, Stage::Review, Stage::Reject)
    }

    pub fn is_valid(&self) -> bool {
        self.from.can_transition_to(self.to)
    }
}

/// What the move processor did with a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveOutcome {
    /// Index updated and file renamed.
    Applied,
    /// The ID was not in the source stage (duplicate, already moved, or
    /// unknown). Nothing was changed.
    Stale,
    /// Index updated but the rename failed. The file is still in the source
    /// directory.
    StorageFailed,
}

impl std::fmt::Display for MoveOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MoveOutcome::Applied => "applied",
            MoveOutcome::Stale => "stale",
            MoveOutcome::StorageFailed => "storage_failed",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

/// An item's content as read from its stage directory. The engine does not
/// interpret the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub stage: Stage,
    pub body: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_id_rejects_zero_and_non_digits() {
        assert!("0".parse::<ItemId>().is_err());
        assert!("-3".parse::<ItemId>().is_err());
        assert!("+3".parse::<ItemId>().is_err());
        assert!("12a".parse::<ItemId>().is_err());
        assert!("".parse::<ItemId>().is_err());
        assert_eq!("101".parse::<ItemId>().unwrap().get(), 101);
    }

    #[test]
    fn only_review_has_outgoing_transitions() {
        for from in Stage::ALL {
            for to in Stage::ALL {
                let expected = from == Stage::Review && to != Stage::Review;
                assert_eq!(from.can_transition_to(to), expected, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn stage_round_trips_through_dir_name() {
        for stage in Stage::ALL {
            assert_eq!(stage.dir_name().parse::<Stage>().unwrap(), stage);
            assert_eq!(Stage::ALL[stage.index()], stage);
        }
        assert!("pending".parse::<Stage>().is_err());
    }

    #[test]
    fn item_id_deserialize_rejects_zero() {
        assert!(serde_json::from_str::<ItemId>("0").is_err());
        let id: ItemId = serde_json::from_str("7").unwrap();
        assert_eq!(id.get(), 7);
    }
}
