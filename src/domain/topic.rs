//! Sustainability topics (the seventeen UN Sustainable Development Goals)

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ProgressionError, Result};

/// Largest multiple of 17 that fits in a byte (15 * 17)
const RANDOM_BYTE_LIMIT: u8 = 255;

/// Identifier of a sustainability topic, always within `1..=17`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct TopicId(u8);

impl TopicId {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 17;

    /// Create a topic id, rejecting anything outside `1..=17`
    pub fn new(id: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&id) {
            Ok(Self(id))
        } else {
            Err(ProgressionError::invalid(format!(
                "topic id {} is outside {}..={}",
                id,
                Self::MIN,
                Self::MAX
            )))
        }
    }

    /// Create a topic id from a wider integer (database rows, JSON numbers)
    pub fn from_i64(id: i64) -> Result<Self> {
        u8::try_from(id)
            .map_err(|_| ProgressionError::invalid(format!("topic id {} is out of range", id)))
            .and_then(Self::new)
    }

    /// Pick a topic uniformly at random using the OS RNG
    pub fn random() -> Self {
        let mut byte = [0u8; 1];
        loop {
            if getrandom::getrandom(&mut byte).is_err() {
                // No OS RNG: fall back on the clock
                let nanos = chrono::Utc::now().timestamp_subsec_nanos();
                return Self::from_random_byte((nanos % RANDOM_BYTE_LIMIT as u32) as u8)
                    .unwrap_or(Self(Self::MIN));
            }
            if let Some(topic) = Self::from_random_byte(byte[0]) {
                return topic;
            }
        }
    }

    /// Map a random byte onto a topic, rejecting the tail that would skew
    /// the distribution towards low ids
    fn from_random_byte(byte: u8) -> Option<Self> {
        (byte < RANDOM_BYTE_LIMIT).then(|| Self(byte % Self::MAX + Self::MIN))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Catalog entry for this topic
    pub fn info(self) -> &'static TopicInfo {
        // Catalog is indexed by id - 1 and covers the full range
        &TOPICS[(self.0 - Self::MIN) as usize]
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// Iterate over every topic in id order
    pub fn all() -> impl Iterator<Item = TopicId> {
        (Self::MIN..=Self::MAX).map(TopicId)
    }
}

impl TryFrom<u8> for TopicId {
    type Error = ProgressionError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<TopicId> for u8 {
    fn from(id: TopicId) -> Self {
        id.0
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SDG {}", self.0)
    }
}

/// Static catalog entry
#[derive(Debug, Clone)]
pub struct TopicInfo {
    pub id: u8,
    pub name: &'static str,
    pub description: &'static str,
}

/// All topics, sorted by id
pub static TOPICS: &[TopicInfo] = &[
    TopicInfo {
        id: 1,
        name: "No Poverty",
        description: "End poverty in all its forms everywhere",
    },
    TopicInfo {
        id: 2,
        name: "Zero Hunger",
        description: "End hunger, achieve food security and improved nutrition",
    },
    TopicInfo {
        id: 3,
        name: "Good Health and Well-being",
        description: "Ensure healthy lives and promote well-being for all",
    },
    TopicInfo {
        id: 4,
        name: "Quality Education",
        description: "Ensure inclusive and equitable quality education",
    },
    TopicInfo {
        id: 5,
        name: "Gender Equality",
        description: "Achieve gender equality and empower all women and girls",
    },
    TopicInfo {
        id: 6,
        name: "Clean Water and Sanitation",
        description: "Ensure availability and sustainable management of water",
    },
    TopicInfo {
        id: 7,
        name: "Affordable and Clean Energy",
        description: "Ensure access to affordable, reliable, sustainable energy",
    },
    TopicInfo {
        id: 8,
        name: "Decent Work and Economic Growth",
        description: "Promote sustained, inclusive economic growth",
    },
    TopicInfo {
        id: 9,
        name: "Industry, Innovation and Infrastructure",
        description: "Build resilient infrastructure, promote inclusive industrialization",
    },
    TopicInfo {
        id: 10,
        name: "Reduced Inequalities",
        description: "Reduce inequality within and among countries",
    },
    TopicInfo {
        id: 11,
        name: "Sustainable Cities and Communities",
        description: "Make cities inclusive, safe, resilient and sustainable",
    },
    TopicInfo {
        id: 12,
        name: "Responsible Consumption and Production",
        description: "Ensure sustainable consumption and production patterns",
    },
    TopicInfo {
        id: 13,
        name: "Climate Action",
        description: "Take urgent action to combat climate change and its impacts",
    },
    TopicInfo {
        id: 14,
        name: "Life Below Water",
        description: "Conserve and sustainably use the oceans, seas and marine resources",
    },
    TopicInfo {
        id: 15,
        name: "Life on Land",
        description: "Protect, restore and promote sustainable use of terrestrial ecosystems",
    },
    TopicInfo {
        id: 16,
        name: "Peace, Justice and Strong Institutions",
        description: "Promote peaceful and inclusive societies for sustainable development",
    },
    TopicInfo {
        id: 17,
        name: "Partnerships for the Goals",
        description: "Strengthen the means of implementation and revitalize global partnership",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_range() {
        assert!(TopicId::new(0).is_err());
        assert!(TopicId::new(18).is_err());
        assert_eq!(TopicId::new(1).unwrap().get(), 1);
        assert_eq!(TopicId::new(17).unwrap().get(), 17);
        assert!(TopicId::from_i64(-3).is_err());
        assert!(TopicId::from_i64(300).is_err());
    }

    #[test]
    fn test_catalog_matches_ids() {
        assert_eq!(TOPICS.len(), TopicId::MAX as usize);
        for id in TopicId::all() {
            assert_eq!(id.info().id, id.get());
        }
        assert_eq!(TopicId::new(13).unwrap().name(), "Climate Action");
    }

    #[test]
    fn test_random_topic_in_range() {
        for _ in 0..200 {
            let id = TopicId::random().get();
            assert!((1..=17).contains(&id));
        }
    }

    #[test]
    fn test_random_byte_mapping_is_even() {
        let mut counts = [0u32; 18];
        for byte in 0..=u8::MAX {
            if let Some(topic) = TopicId::from_random_byte(byte) {
                counts[topic.get() as usize] += 1;
            }
        }
        assert_eq!(counts[0], 0);
        assert!(counts[1..].iter().all(|&c| c == 15));
        assert!(TopicId::from_random_byte(255).is_none());
    }

    #[test]
    fn test_serde_rejects_out_of_range() {
        let ok: TopicId = serde_json::from_str("7").unwrap();
        assert_eq!(ok.get(), 7);
        assert!(serde_json::from_str::<TopicId>("0").is_err());
        assert_eq!(serde_json::to_string(&ok).unwrap(), "7");
    }
}
