use crate::common::{DomainError, DomainResult};
use crate::domains::greenhouse::{GreenhouseConfig, Robot, Waypoint, WorkZone};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version written on export.
pub const MAP_FORMAT_VERSION: &str = "1.0.0";
/// Imports are accepted for any version with this major component.
const SUPPORTED_MAJOR: u64 = 1;

/// Versioned snapshot of the whole spatial model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapData {
    pub config: GreenhouseConfig,
    pub robots: Vec<Robot>,
    pub waypoints: Vec<Waypoint>,
    pub zones: Vec<WorkZone>,
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MapData {
    /// Snapshot with freshly generated timestamps.
    pub fn new(
        config: GreenhouseConfig,
        robots: Vec<Robot>,
        waypoints: Vec<Waypoint>,
        zones: Vec<WorkZone>,
    ) -> Self {
        let now = Utc::now();
        Self {
            config,
            robots,
            waypoints,
            zones,
            version: MAP_FORMAT_VERSION.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn to_json(&self) -> DomainResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and check a snapshot. Nothing is applied here, so a failure
    /// leaves any editor state untouched.
    pub fn from_json(json: &str) -> DomainResult<Self> {
        let data: MapData = serde_json::from_str(json)?;
        data.validate()?;
        Ok(data)
    }

    pub fn validate(&self) -> DomainResult<()> {
        check_version(&self.version)?;
        self.config.validate().map_err(DomainError::invalid)?;
        Ok(())
    }
}

fn check_version(version: &str) -> DomainResult<()> {
    let major = version
        .split('.')
        .next()
        .and_then(|m| m.trim().parse::<u64>().ok());
    match major {
        Some(SUPPORTED_MAJOR) => Ok(()),
        _ => Err(DomainError::UnsupportedVersion {
            version: version.to_string(),
        }),
    }
}
