//! Entity kinds, collections and the closed Place kind enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kinds of entity known to the store.
///
/// Only Place carries a detailed schema; the others are referenced
/// collaborators with an existence contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Place,
    Props,
    Glossary,
    Image,
    Sound,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Place,
        EntityKind::Props,
        EntityKind::Glossary,
        EntityKind::Image,
        EntityKind::Sound,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Place => "place",
            EntityKind::Props => "props",
            EntityKind::Glossary => "glossary",
            EntityKind::Image => "image",
            EntityKind::Sound => "sound",
        }
    }

    /// Collection holding entities of this kind.
    pub fn collection(&self) -> Collection {
        match self {
            EntityKind::Place => Collection::Places,
            EntityKind::Props => Collection::Props,
            EntityKind::Glossary => Collection::Glossary,
            EntityKind::Image => Collection::Images,
            EntityKind::Sound => Collection::Sounds,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown entity kind '{}'", s))
    }
}

/// Named collections a reference may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Collection {
    Places,
    Props,
    Glossary,
    Images,
    Sounds,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Places,
        Collection::Props,
        Collection::Glossary,
        Collection::Images,
        Collection::Sounds,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Places => "Places",
            Collection::Props => "Props",
            Collection::Glossary => "Glossary",
            Collection::Images => "Images",
            Collection::Sounds => "Sounds",
        }
    }

    /// Parses a collection name exactly as it appears in a `$ref`.
    pub fn parse(name: &str) -> Option<Self> {
        Collection::ALL.into_iter().find(|c| c.as_str() == name)
    }

    pub fn entity_kind(&self) -> EntityKind {
        match self {
            Collection::Places => EntityKind::Place,
            Collection::Props => EntityKind::Props,
            Collection::Glossary => EntityKind::Glossary,
            Collection::Images => EntityKind::Image,
            Collection::Sounds => EntityKind::Sound,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Closed set of Place kinds, ordered coarse to fine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaceKind {
    Universe,
    Galaxy,
    SolarSystem,
    Planet,
    Satellite,
    Vessel,
    Region,
    Municipality,
    Enclosure,
    Structure,
    Room,
    Route,
    Wild,
}

impl PlaceKind {
    pub const ALL: [PlaceKind; 13] = [
        PlaceKind::Universe,
        PlaceKind::Galaxy,
        PlaceKind::SolarSystem,
        PlaceKind::Planet,
        PlaceKind::Satellite,
        PlaceKind::Vessel,
        PlaceKind::Region,
        PlaceKind::Municipality,
        PlaceKind::Enclosure,
        PlaceKind::Structure,
        PlaceKind::Room,
        PlaceKind::Route,
        PlaceKind::Wild,
    ];

    /// Returns the wire tag for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceKind::Universe => "universe",
            PlaceKind::Galaxy => "galaxy",
            PlaceKind::SolarSystem => "solarSystem",
            PlaceKind::Planet => "planet",
            PlaceKind::Satellite => "satellite",
            PlaceKind::Vessel => "vessel",
            PlaceKind::Region => "region",
            PlaceKind::Municipality => "municipality",
            PlaceKind::Enclosure => "enclosure",
            PlaceKind::Structure => "structure",
            PlaceKind::Room => "room",
            PlaceKind::Route => "route",
            PlaceKind::Wild => "wild",
        }
    }

    /// Tags are case-sensitive; `"SolarSystem"` is not a kind.
    pub fn parse(tag: &str) -> Option<Self> {
        PlaceKind::ALL.into_iter().find(|k| k.as_str() == tag)
    }

    /// All wire tags in declaration order.
    pub fn tags() -> Vec<String> {
        PlaceKind::ALL.iter().map(|k| k.as_str().to_string()).collect()
    }
}

impl fmt::Display for PlaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
