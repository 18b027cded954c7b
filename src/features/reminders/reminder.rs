//! The durable reminder record
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::{anyhow, Context as _, Result};
use rand::distr::{Alphanumeric, SampleString};
use std::collections::HashMap;

use super::duration::DurationSpec;

/// Length of the random tag that keys a reminder.
const TAG_LEN: usize = 8;

/// One scheduled reminder. The `tag` is its identity everywhere: record
/// key, set member, and the handle users cancel it by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub tag: String,
    pub owner_id: String,
    pub channel_id: String,
    pub body: String,
    /// Absolute expiration instant, Unix seconds. Always > `created_at`.
    pub fire_at: i64,
    pub created_at: i64,
}

impl Reminder {
    /// Build a fresh reminder from a parsed duration spec, generating its tag.
    pub fn new(owner_id: &str, channel_id: &str, spec: &DurationSpec, now: i64) -> Reminder {
        Reminder {
            tag: new_tag(),
            owner_id: owner_id.to_string(),
            channel_id: channel_id.to_string(),
            body: spec.body.clone(),
            fire_at: spec.fire_at,
            created_at: now,
        }
    }

    /// Flatten into the store's string-to-string record shape.
    pub fn to_record(&self) -> HashMap<String, String> {
        HashMap::from([
            ("tag".to_string(), self.tag.clone()),
            ("owner_id".to_string(), self.owner_id.clone()),
            ("channel_id".to_string(), self.channel_id.clone()),
            ("body".to_string(), self.body.clone()),
            ("fire_at".to_string(), self.fire_at.to_string()),
            ("created_at".to_string(), self.created_at.to_string()),
        ])
    }

    /// Rebuild from a stored record. Missing or malformed fields are an
    /// error; callers log and skip the reminder.
    pub fn from_record(fields: &HashMap<String, String>) -> Result<Reminder> {
        let get = |name: &str| {
            fields
                .get(name)
                .cloned()
                .ok_or_else(|| anyhow!("reminder record is missing `{name}`"))
        };

        let fire_at = get("fire_at")?
            .parse()
            .context("reminder `fire_at` is not a timestamp")?;
        let created_at = get("created_at")?
            .parse()
            .context("reminder `created_at` is not a timestamp")?;

        Ok(Reminder {
            tag: get("tag")?,
            owner_id: get("owner_id")?,
            channel_id: get("channel_id")?,
            body: get("body")?,
            fire_at,
            created_at,
        })
    }
}

fn new_tag() -> String {
    Alphanumeric
        .sample_string(&mut rand::rng(), TAG_LEN)
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Reminder {
        let spec = DurationSpec::from_stored(1_700_000_600, "walk the dog");
        Reminder::new("111", "222", &spec, 1_700_000_000)
    }

    #[test]
    fn test_new_generates_distinct_tags() {
        let a = sample();
        let b = sample();
        assert_eq!(a.tag.len(), TAG_LEN);
        assert_ne!(a.tag, b.tag);
    }

    #[test]
    fn test_record_round_trip() {
        let reminder = sample();
        let rebuilt = Reminder::from_record(&reminder.to_record()).unwrap();
        assert_eq!(rebuilt, reminder);
    }

    #[test]
    fn test_from_record_rejects_missing_field() {
        let mut fields = sample().to_record();
        fields.remove("channel_id");
        assert!(Reminder::from_record(&fields).is_err());
    }

    #[test]
    fn test_from_record_rejects_bad_timestamp() {
        let mut fields = sample().to_record();
        fields.insert("fire_at".to_string(), "soonish".to_string());
        assert!(Reminder::from_record(&fields).is_err());
    }
}
