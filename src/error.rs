use thiserror::Error;

use crate::faction::FactionId;
use crate::hex::Axial;

#[derive(Debug, Error)]
pub enum WastelandError {
    #[error("invalid coordinate token '{0}'")]
    InvalidCoordinate(String),
    #[error("unknown terrain kind '{0}'")]
    UnknownTerrain(String),
    #[error("unknown point of interest kind '{0}'")]
    UnknownPoiKind(String),
    #[error("unknown archetype '{0}'")]
    UnknownArchetype(String),
    #[error("hex {0} appears more than once in map record")]
    DuplicateHex(Axial),
    #[error("unknown faction {0}")]
    UnknownFaction(FactionId),
    #[error("no free starting location for faction '{0}'")]
    NoStartingLocation(String),
}

pub type Result<T> = std::result::Result<T, WastelandError>;
