use sea_orm::{DbErr, SqlErr};

use crate::storage::models::StoredUrl;
use migration::entities::url;

pub fn model_to_stored(model: url::Model) -> (String, StoredUrl) {
    (
        model.short_url,
        StoredUrl {
            original_url: model.original_url,
            deleted: model.is_deleted,
        },
    )
}

/// 新记录的 ActiveModel，`is_deleted` 总是 false
pub fn new_active_model(code: &str, original_url: &str, owner_id: &str) -> url::ActiveModel {
    use sea_orm::ActiveValue::*;

    url::ActiveModel {
        short_url: Set(code.to_owned()),
        original_url: Set(original_url.to_owned()),
        user_id: Set(owner_id.to_owned()),
        is_deleted: Set(false),
    }
}

/// Primary key or unique index rejected the row.
pub fn is_unique_violation(err: &DbErr) -> bool {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return true;
    }
    // 部分驱动不会映射到 SqlErr，只认各数据库的唯一约束报错原文
    let msg = err.to_string().to_lowercase();
    msg.contains("unique constraint failed")
        || msg.contains("duplicate entry")
        || msg.contains("duplicate key value violates unique constraint")
}

/// `ON CONFLICT DO NOTHING` skipped the row.
pub fn is_not_inserted(err: &DbErr) -> bool {
    matches!(err, DbErr::RecordNotInserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveValue;

    fn model(deleted: bool) -> url::Model {
        url::Model {
            short_url: "LmNvbS9h".to_string(),
            original_url: "https://example.com/a".to_string(),
            user_id: "u1".to_string(),
            is_deleted: deleted,
        }
    }

    #[test]
    fn test_model_to_stored() {
        let (code, stored) = model_to_stored(model(false));
        assert_eq!(code, "LmNvbS9h");
        assert_eq!(stored, StoredUrl::active("https://example.com/a"));
    }

    #[test]
    fn test_new_active_model_is_not_deleted() {
        let active = new_active_model("abc", "https://a.test", "u1");
        assert_eq!(active.short_url, ActiveValue::Set("abc".to_string()));
        assert_eq!(active.user_id, ActiveValue::Set("u1".to_string()));
        assert_eq!(active.is_deleted, ActiveValue::Set(false));
    }

    #[test]
    fn test_error_classification() {
        assert!(is_not_inserted(&DbErr::RecordNotInserted));
        assert!(!is_not_inserted(&DbErr::Custom("x".into())));
        assert!(is_unique_violation(&DbErr::Custom(
            "UNIQUE constraint failed: urls.short_url".into()
        )));
        assert!(is_unique_violation(&DbErr::Custom(
            "Duplicate entry 'abc' for key 'PRIMARY'".into()
        )));
        assert!(is_unique_violation(&DbErr::Custom(
            "duplicate key value violates unique constraint \"urls_pkey\"".into()
        )));
        assert!(!is_unique_violation(&DbErr::Custom("connection reset".into())));
    }

    #[test]
    fn test_unrelated_duplicate_message_is_not_conflict() {
        assert!(!is_unique_violation(&DbErr::Custom(
            "duplicate column name: short_url".into()
        )));
        assert!(!is_unique_violation(&DbErr::Custom(
            "trigger rejected duplicate submission".into()
        )));
    }
}
