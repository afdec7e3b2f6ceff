use std::fmt;

use serde::de::{self, DeserializeOwned, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

// --- Feed endpoint ---

/// Body of `GET /feed`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedResponse {
    #[serde(default)]
    pub element_count: Option<u64>,
    #[serde(default)]
    pub near_earth_objects: DateGroups,
}

/// Records grouped by approach date, in the order the service sent them.
///
/// The upstream object is keyed by date string; JSON object order is
/// significant for us, so this deserializes into a Vec of pairs rather
/// than a map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateGroups(pub Vec<(String, Vec<RawFeedRecord>)>);

impl DateGroups {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[RawFeedRecord])> {
        self.0.iter().map(|(date, records)| (date.as_str(), records.as_slice()))
    }

    /// All records, date group by date group.
    pub fn records(&self) -> impl Iterator<Item = &RawFeedRecord> {
        self.0.iter().flat_map(|(_, records)| records.iter())
    }

    pub fn record_count(&self) -> usize {
        self.0.iter().map(|(_, records)| records.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.record_count() == 0
    }
}

impl<'de> Deserialize<'de> for DateGroups {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct GroupsVisitor;

        impl<'de> Visitor<'de> for GroupsVisitor {
            type Value = DateGroups;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of date -> record list")
            }

            fn visit_map<A>(self, mut map: A) -> Result<DateGroups, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut groups = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((date, records)) = map.next_entry::<String, Vec<RawFeedRecord>>()? {
                    groups.push((date, records));
                }
                Ok(DateGroups(groups))
            }
        }

        deserializer.deserialize_map(GroupsVisitor)
    }
}

// --- Records ---

/// One near-Earth object as the service reports it.
///
/// `id` and `name` are required. Everything the risk score depends on is
/// parsed leniently: a missing or wrongly typed value becomes `None` instead
/// of failing the whole feed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawFeedRecord {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub estimated_diameter: Option<EstimatedDiameter>,
    #[serde(default, deserialize_with = "lenient")]
    pub close_approach_data: Option<Vec<CloseApproach>>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_potentially_hazardous_asteroid: Option<bool>,
    /// Opaque; only the detail endpoint populates it.
    #[serde(default)]
    pub orbital_data: Option<serde_json::Value>,
}

impl RawFeedRecord {
    /// Absent, `null` or non-boolean flags read as not hazardous.
    pub fn is_hazardous(&self) -> bool {
        self.is_potentially_hazardous_asteroid.unwrap_or(false)
    }

    /// The close approach every derived metric is taken from.
    pub fn primary_approach(&self) -> Option<&CloseApproach> {
        self.close_approach_data.as_ref()?.first()
    }

    pub fn diameter_max_km(&self) -> Option<f64> {
        self.estimated_diameter
            .as_ref()?
            .kilometers
            .as_ref()?
            .estimated_diameter_max
    }

    pub fn diameter_max_m(&self) -> Option<f64> {
        self.estimated_diameter
            .as_ref()?
            .meters
            .as_ref()?
            .estimated_diameter_max
    }

    pub fn velocity_kmh(&self) -> Option<f64> {
        let approach = self.primary_approach()?;
        Some(approach.relative_velocity.as_ref()?.kilometers_per_hour?.0)
    }

    pub fn miss_distance_km(&self) -> Option<f64> {
        let approach = self.primary_approach()?;
        Some(approach.miss_distance.as_ref()?.kilometers?.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EstimatedDiameter {
    #[serde(default, deserialize_with = "lenient")]
    pub kilometers: Option<DiameterRange>,
    #[serde(default, deserialize_with = "lenient")]
    pub meters: Option<DiameterRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DiameterRange {
    #[serde(default, deserialize_with = "lenient")]
    pub estimated_diameter_min: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub estimated_diameter_max: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CloseApproach {
    #[serde(default, deserialize_with = "lenient")]
    pub close_approach_date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub relative_velocity: Option<RelativeVelocity>,
    #[serde(default, deserialize_with = "lenient")]
    pub miss_distance: Option<MissDistance>,
    #[serde(default, deserialize_with = "lenient")]
    pub orbiting_body: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RelativeVelocity {
    #[serde(default, deserialize_with = "lenient")]
    pub kilometers_per_hour: Option<Measure>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MissDistance {
    #[serde(default, deserialize_with = "lenient")]
    pub kilometers: Option<Measure>,
}

/// A finite measurement the service may encode as a JSON number or as a
/// decimal string (`"36000.52"`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measure(pub f64);

impl<'de> Deserialize<'de> for Measure {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        let value = match Raw::deserialize(deserializer)? {
            Raw::Number(n) => n,
            Raw::Text(s) => s.trim().parse::<f64>().map_err(de::Error::custom)?,
        };
        if !value.is_finite() {
            return Err(de::Error::custom("measurement is not finite"));
        }
        Ok(Measure(value))
    }
}

/// Deserialize any JSON value, keeping it only if it converts to `T`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}
