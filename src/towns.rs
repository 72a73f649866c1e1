//! Static reference data: every town the game knows about.

use std::fmt::Display;

/// A gameplay tier. Towns are grouped into regions, and regions unlock one
/// at a time as the player finds towns with worse air.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub enum Region {
    Ireland,
    #[serde(rename = "UK")]
    Uk,
    Europe,
    World,
}

impl Region {
    /// All regions, in unlock order.
    pub const ALL: [Self; 4] = [Self::Ireland, Self::Uk, Self::Europe, Self::World];

    pub const fn first() -> Self {
        Self::Ireland
    }

    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Ireland => Some(Self::Uk),
            Self::Uk => Some(Self::Europe),
            Self::Europe => Some(Self::World),
            Self::World => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Ireland => "Ireland",
            Self::Uk => "UK",
            Self::Europe => "Europe",
            Self::World => "World",
        }
    }

    pub fn towns(self) -> impl Iterator<Item = &'static Town> {
        TOWNS.iter().filter(move |town| town.region == self)
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Latitude and longitude, in degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Display for Coordinates {
    /// Formats as `<lat>,<lon>`, the shape the upstream provider expects.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Town {
    pub name: &'static str,
    pub coordinates: Coordinates,
    pub region: Region,
}

impl Town {
    const fn new(name: &'static str, lat: f64, lon: f64, region: Region) -> Self {
        Self {
            name,
            coordinates: Coordinates { lat, lon },
            region,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Case-sensitive exact lookup.
    pub fn find(name: &str) -> Option<&'static Self> {
        TOWNS.iter().find(|town| town.name == name)
    }
}

pub static TOWNS: [Town; 31] = [
    Town::new("Ennis", 52.8436, -8.9863, Region::Ireland),
    Town::new("Dublin", 53.3498, -6.2603, Region::Ireland),
    Town::new("Limerick", 52.6638, -8.6267, Region::Ireland),
    Town::new("Cork", 51.8985, -8.4756, Region::Ireland),
    Town::new("Galway", 53.2707, -9.0568, Region::Ireland),
    Town::new("Waterford", 52.2593, -7.1101, Region::Ireland),
    Town::new("Kilkenny", 52.6541, -7.2448, Region::Ireland),
    Town::new("London", 51.5074, -0.1278, Region::Uk),
    Town::new("Manchester", 53.4808, -2.2426, Region::Uk),
    Town::new("Birmingham", 52.4862, -1.8904, Region::Uk),
    Town::new("Edinburgh", 55.9533, -3.1883, Region::Uk),
    Town::new("Glasgow", 55.8642, -4.2518, Region::Uk),
    Town::new("Belfast", 54.5973, -5.9301, Region::Uk),
    Town::new("Paris", 48.8566, 2.3522, Region::Europe),
    Town::new("Berlin", 52.52, 13.405, Region::Europe),
    Town::new("Madrid", 40.4168, -3.7038, Region::Europe),
    Town::new("Rome", 41.9028, 12.4964, Region::Europe),
    Town::new("Amsterdam", 52.3676, 4.9041, Region::Europe),
    Town::new("Brussels", 50.8503, 4.3517, Region::Europe),
    Town::new("Vienna", 48.2082, 16.3738, Region::Europe),
    Town::new("Prague", 50.0755, 14.4378, Region::Europe),
    Town::new("Warsaw", 52.2297, 21.0122, Region::Europe),
    Town::new("Copenhagen", 55.6761, 12.5683, Region::Europe),
    Town::new("New York", 40.7128, -74.006, Region::World),
    Town::new("Los Angeles", 34.0522, -118.2437, Region::World),
    Town::new("Tokyo", 35.6762, 139.6503, Region::World),
    Town::new("Beijing", 39.9042, 116.4074, Region::World),
    Town::new("Delhi", 28.6139, 77.209, Region::World),
    Town::new("Sydney", -33.8688, 151.2093, Region::World),
    Town::new("São Paulo", -23.5505, -46.6333, Region::World),
    Town::new("Cairo", 30.0444, 31.2357, Region::World),
];
