use serde::{Deserialize, Serialize};

/// A stored mapping, keyed by `(owner_id, short_code)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortUrlRecord {
    pub short_code: String,
    pub original_url: String,
    pub owner_id: String,
    /// Tombstone. Once set it is never cleared.
    pub deleted: bool,
}

/// Value side of an owner's enumeration: the URL plus its tombstone flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredUrl {
    pub original_url: String,
    pub deleted: bool,
}

impl StoredUrl {
    pub fn active(original_url: impl Into<String>) -> Self {
        Self {
            original_url: original_url.into(),
            deleted: false,
        }
    }
}

/// Aggregate counts over every record, tombstoned ones included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_urls: usize,
    pub total_users: usize,
}

/// One line of the memory backend's journal file.
///
/// `is_deleted` is written as the string `"true"` / `"false"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRecord {
    pub short_url: String,
    pub original_url: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default, with = "bool_string")]
    pub is_deleted: bool,
}

impl From<JournalRecord> for ShortUrlRecord {
    fn from(record: JournalRecord) -> Self {
        ShortUrlRecord {
            short_code: record.short_url,
            original_url: record.original_url,
            owner_id: record.user_id,
            deleted: record.is_deleted,
        }
    }
}

impl From<ShortUrlRecord> for JournalRecord {
    fn from(record: ShortUrlRecord) -> Self {
        JournalRecord {
            short_url: record.short_code,
            original_url: record.original_url,
            user_id: record.owner_id,
            is_deleted: record.deleted,
        }
    }
}

mod bool_string {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "true" } else { "false" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        // 兼容旧格式：布尔值或字符串
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bool(bool),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Bool(b) => Ok(b),
            Raw::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(true),
                "false" | "" => Ok(false),
                other => Err(D::Error::custom(format!(
                    "invalid is_deleted value: {}",
                    other
                ))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_journal_record_writes_string_flag() {
        let record = JournalRecord {
            short_url: "LmNvbS9h".into(),
            original_url: "https://example.com/a".into(),
            user_id: "u1".into(),
            is_deleted: true,
        };
        let line = serde_json::to_string(&record).unwrap();
        assert_eq!(
            line,
            r#"{"short_url":"LmNvbS9h","original_url":"https://example.com/a","user_id":"u1","is_deleted":"true"}"#
        );
    }

    #[test]
    fn test_journal_record_accepts_bool_and_missing_fields() {
        let record: JournalRecord = serde_json::from_str(
            r#"{"short_url":"abc","original_url":"https://a.b","is_deleted":false}"#,
        )
        .unwrap();
        assert_eq!(record.user_id, "");
        assert!(!record.is_deleted);

        let record: JournalRecord =
            serde_json::from_str(r#"{"short_url":"abc","original_url":"https://a.b"}"#).unwrap();
        assert!(!record.is_deleted);
    }

    #[test]
    fn test_journal_record_rejects_garbage_flag() {
        let result: Result<JournalRecord, _> = serde_json::from_str(
            r#"{"short_url":"abc","original_url":"https://a.b","user_id":"u","is_deleted":"maybe"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_record_conversion() {
        let record = ShortUrlRecord {
            short_code: "abc".into(),
            original_url: "https://a.b".into(),
            owner_id: "u1".into(),
            deleted: false,
        };
        let journal: JournalRecord = record.clone().into();
        assert_eq!(journal.user_id, "u1");
        assert_eq!(ShortUrlRecord::from(journal), record);
    }
}
