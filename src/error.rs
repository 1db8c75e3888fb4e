use crate::geometry::*;
use crate::protocol::ProtocolError;
use crate::world::ShipId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid strategy config: {0}")]
    Config(#[source] serde_json::Error),
    #[error("ship {ship} at {position} proposed {proposal}, {distance} steps away")]
    ProposalTooFar {
        ship: ShipId,
        position: Position,
        proposal: Position,
        distance: i32,
    },
    #[error("{remaining} collisions remain after {iterations} resolution passes")]
    UnresolvedCollisions { remaining: usize, iterations: usize },
    #[error("ships {ships:?} all proposed {position}")]
    CollisionInOutput { position: Position, ships: Vec<ShipId> },
    #[error("ship {0} reached move evaluation without an objective")]
    MissingObjective(ShipId),
}

impl BotError {
    /// Invariant violations are programming errors, everything else is the environment.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BotError::ProposalTooFar { .. } | BotError::UnresolvedCollisions { .. } | BotError::CollisionInOutput { .. } | BotError::MissingObjective(_)
        )
    }
}
