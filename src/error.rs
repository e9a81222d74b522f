use thiserror::Error;

/// Ошибки генерации карты. Конфигурационные ошибки обнаруживаются до начала
/// работы с тайлами, ошибки сходимости — фатальны для всего запуска.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("need at least two zones, got {0}")]
    TooFewZones(usize),

    #[error("zone `{0}` has nonpositive relative size")]
    NonPositiveZoneWeight(String),

    #[error("total relative area can't be zero")]
    ZeroTotalWeight,

    #[error("zone `{zone}` center ({x}, {y}, {z}) is out of map bounds")]
    BadZoneCenter { zone: String, x: i32, y: i32, z: i32 },

    #[error("{0} tiles left without a zone")]
    OrphanTiles(usize),

    #[error("failed to fix all exclaves after {0} passes")]
    UnresolvableExclaves(u32),

    #[error("zones `{0}` and `{1}` do not share a border, connection is impossible")]
    ZonesNotAdjacent(String, String),

    #[error("bad footprint mask: {0}")]
    BadFootprint(String),

    #[error("bad configuration: {0}")]
    BadConfig(String),
}
