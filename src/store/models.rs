use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One proposed film in a server's watch-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieEntry {
    pub title: String,
    #[serde(default)]
    pub watched: bool,
    #[serde(rename = "userId", with = "snowflake")]
    pub proposer_id: u64,
}

impl MovieEntry {
    pub fn new(title: impl Into<String>, proposer_id: u64) -> Self {
        Self {
            title: title.into(),
            watched: false,
            proposer_id,
        }
    }
}

/// A scheduled viewing session, keyed by its announcement message id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingRecord {
    #[serde(rename = "filmTitle", alias = "filme")]
    pub film_title: String,
    /// DD/MM/YYYY
    #[serde(alias = "data")]
    pub date: String,
    /// HH:MM
    #[serde(alias = "horario")]
    pub time: String,
    #[serde(rename = "channelId", with = "snowflake")]
    pub channel_id: u64,
}

impl MeetingRecord {
    /// The wall-clock string this meeting fires at, e.g. `01/01/2030 20:00`.
    pub fn due_at(&self) -> String {
        format!("{} {}", self.date, self.time)
    }
}

/// guild id -> ordered watch-list
pub type MovieBook = BTreeMap<u64, Vec<MovieEntry>>;

/// guild id -> announcement message id -> meeting.
/// Discord snowflakes grow over time, so key order is creation order.
pub type MeetingBook = BTreeMap<u64, BTreeMap<u64, MeetingRecord>>;

/// Discord ids are written as strings; older snapshots may hold bare numbers.
pub(crate) mod snowflake {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(id: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(id)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(id) => Ok(id),
            Raw::Text(text) => text
                .parse()
                .map_err(|_| de::Error::custom(format!("invalid snowflake `{}`", text))),
        }
    }
}
