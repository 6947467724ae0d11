//! Coordinate reference frames.
//!
//! Only the frames this pipeline actually needs are modelled: geographic
//! WGS84 longitude/latitude, and Universal Transverse Mercator zones on the
//! WGS84 or NAD83 datums. Frames are identified by their EPSG code.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::SpatialError;

/// Reference ellipsoid parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis in meters.
    pub semi_major_m: f64,
    /// Inverse flattening.
    pub inverse_flattening: f64,
}

impl Ellipsoid {
    /// WGS84 ellipsoid.
    pub const WGS84: Self = Self {
        semi_major_m: 6_378_137.0,
        inverse_flattening: 298.257_223_563,
    };

    /// GRS80 ellipsoid (used by NAD83).
    pub const GRS80: Self = Self {
        semi_major_m: 6_378_137.0,
        inverse_flattening: 298.257_222_101,
    };

    /// First eccentricity squared.
    #[must_use]
    pub fn eccentricity_sq(&self) -> f64 {
        let f = 1.0 / self.inverse_flattening;
        f * (2.0 - f)
    }
}

/// Geodetic datum of a projected frame.
///
/// NAD83 and WGS84 differ by well under two meters in North America; no
/// datum shift is applied between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Datum {
    /// World Geodetic System 1984.
    Wgs84,
    /// North American Datum 1983.
    Nad83,
}

impl Datum {
    /// Returns the ellipsoid this datum is defined on.
    #[must_use]
    pub const fn ellipsoid(self) -> Ellipsoid {
        match self {
            Self::Wgs84 => Ellipsoid::WGS84,
            Self::Nad83 => Ellipsoid::GRS80,
        }
    }
}

/// Hemisphere of a UTM zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hemisphere {
    /// Northern hemisphere (false northing 0 m).
    North,
    /// Southern hemisphere (false northing 10 000 km).
    South,
}

/// A coordinate reference frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Crs {
    /// Geographic longitude/latitude in degrees (EPSG:4326).
    Geographic,
    /// Universal Transverse Mercator, meters.
    Utm {
        /// UTM zone number (1-60).
        zone: u8,
        /// Hemisphere.
        hemisphere: Hemisphere,
        /// Datum.
        datum: Datum,
    },
}

impl Crs {
    /// WGS84 longitude/latitude.
    pub const WGS84: Self = Self::Geographic;

    /// NAD83 / UTM zone 18N (EPSG:26918), covering Ottawa.
    pub const NAD83_UTM_18N: Self = Self::Utm {
        zone: 18,
        hemisphere: Hemisphere::North,
        datum: Datum::Nad83,
    };

    /// Returns the EPSG code for this frame.
    #[must_use]
    pub fn epsg(&self) -> u32 {
        match *self {
            Self::Geographic => 4326,
            Self::Utm {
                zone,
                hemisphere,
                datum,
            } => {
                let base = match (datum, hemisphere) {
                    (Datum::Wgs84, Hemisphere::North) => 32_600,
                    (Datum::Wgs84, Hemisphere::South) => 32_700,
                    // NAD83 UTM is only defined north of the equator.
                    (Datum::Nad83, _) => 26_900,
                };
                base + u32::from(zone)
            }
        }
    }

    /// Whether coordinates are in degrees rather than meters.
    #[must_use]
    pub const fn is_geographic(&self) -> bool {
        matches!(self, Self::Geographic)
    }

    /// Builds a frame from an EPSG code.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::UnknownReferenceFrame`] for codes outside the
    /// supported set.
    pub fn from_epsg(code: u32) -> Result<Self, SpatialError> {
        let utm = |zone: u32, hemisphere, datum| {
            u8::try_from(zone)
                .ok()
                .filter(|z| (1..=60).contains(z))
                .map(|zone| Self::Utm {
                    zone,
                    hemisphere,
                    datum,
                })
        };

        let crs = match code {
            4326 => Some(Self::Geographic),
            32_601..=32_660 => utm(code - 32_600, Hemisphere::North, Datum::Wgs84),
            32_701..=32_760 => utm(code - 32_700, Hemisphere::South, Datum::Wgs84),
            26_901..=26_923 => utm(code - 26_900, Hemisphere::North, Datum::Nad83),
            _ => None,
        };

        crs.ok_or_else(|| SpatialError::UnknownReferenceFrame(format!("EPSG:{code}")))
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

impl FromStr for Crs {
    type Err = SpatialError;

    /// Parses `"EPSG:26918"`, `"epsg:26918"` or a bare `"26918"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let code = trimmed
            .get(..5)
            .filter(|prefix| prefix.eq_ignore_ascii_case("epsg:"))
            .map_or(trimmed, |_| &trimmed[5..]);

        let code = code
            .trim()
            .parse::<u32>()
            .map_err(|_| SpatialError::UnknownReferenceFrame(s.to_string()))?;

        Self::from_epsg(code)
    }
}

impl TryFrom<String> for Crs {
    type Error = SpatialError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Crs> for String {
    fn from(value: Crs) -> Self {
        value.to_string()
    }
}

/// The two frames every stage works with: one geographic frame for raw
/// inputs and one projected frame for all metric computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Frames {
    /// Frame raw coordinates are expressed in.
    pub geographic: Crs,
    /// Frame all lengths and buffers are computed in.
    pub projected: Crs,
}

impl Default for Frames {
    fn default() -> Self {
        Self {
            geographic: Crs::WGS84,
            projected: Crs::NAD83_UTM_18N,
        }
    }
}
