//! The observed profile snapshot handed to the engine by the scraping side.
//!
//! Every field is a plain string; an empty string means "not observed". The
//! serialized keys match the profile sheet headers so JSON Lines produced by
//! the scraper can be read without a mapping table.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileRecord {
    /// Observation time, `dd-mmm-yy hh:mm AM/PM`.
    #[serde(rename = "DATETIME")]
    pub datetime: String,

    /// Natural key of the record.
    #[serde(rename = "NICKNAME")]
    pub nickname: String,

    /// Populated by the engine from the tag index; any incoming value is replaced.
    #[serde(rename = "TAGS")]
    pub tags: String,

    #[serde(rename = "CITY")]
    pub city: String,

    #[serde(rename = "GENDER")]
    pub gender: String,

    #[serde(rename = "MARRIED")]
    pub married: String,

    #[serde(rename = "AGE")]
    pub age: String,

    #[serde(rename = "JOINED")]
    pub joined: String,

    #[serde(rename = "FOLLOWERS")]
    pub followers: String,

    #[serde(rename = "POSTS")]
    pub posts: String,

    /// Link to the most recent post.
    #[serde(rename = "LPOST")]
    pub last_post: String,

    #[serde(rename = "LDATE-TIME")]
    pub last_post_at: String,

    #[serde(rename = "PLINK")]
    pub profile_link: String,

    #[serde(rename = "PIMAGE")]
    pub profile_image: String,

    #[serde(rename = "INTRO")]
    pub intro: String,
}

impl ProfileRecord {
    /// Creates a record with only the identifier and observation time set.
    #[must_use]
    pub fn new(nickname: impl Into<String>, datetime: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            datetime: datetime.into(),
            ..Self::default()
        }
    }

    /// The trimmed identifier. Empty means the record cannot be reconciled.
    #[must_use]
    pub fn key(&self) -> &str {
        self.nickname.trim()
    }

    /// Date half of [`Self::datetime`] (everything before the first space).
    #[must_use]
    pub fn date_part(&self) -> &str {
        let datetime = self.datetime.trim();
        datetime.split_once(' ').map_or(datetime, |(date, _)| date)
    }

    /// Time half of [`Self::datetime`]; empty when the value has no time.
    #[must_use]
    pub fn time_part(&self) -> &str {
        self.datetime
            .trim()
            .split_once(' ')
            .map_or("", |(_, time)| time.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_sheet_header_keys() {
        let json = r#"{"NICKNAME":"ali_88","DATETIME":"10-Jan-24 03:00 PM","LDATE-TIME":"N/A","CITY":"Lahore"}"#;
        let record: ProfileRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.nickname, "ali_88");
        assert_eq!(record.last_post_at, "N/A");
        assert_eq!(record.city, "Lahore");
        assert_eq!(record.intro, "", "missing keys default to empty");
    }

    #[test]
    fn key_is_trimmed() {
        let record = ProfileRecord::new("  sana  ", "");
        assert_eq!(record.key(), "sana");
    }

    #[test]
    fn splits_datetime_into_date_and_time() {
        let record = ProfileRecord::new("x", "10-Jan-24 03:00 PM");
        assert_eq!(record.date_part(), "10-Jan-24");
        assert_eq!(record.time_part(), "03:00 PM");
    }

    #[test]
    fn date_only_datetime_has_empty_time() {
        let record = ProfileRecord::new("x", "10-Jan-24");
        assert_eq!(record.date_part(), "10-Jan-24");
        assert_eq!(record.time_part(), "");
    }
}
