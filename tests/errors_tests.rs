use std::error::Error;

use tinylink::errors::{Result, TinylinkError};

#[cfg(test)]
mod error_creation_tests {
    use super::*;

    #[test]
    fn test_invalid_url_error() {
        let error = TinylinkError::invalid_url("'nope' is not a valid URL");

        assert!(matches!(error, TinylinkError::InvalidUrl(_)));
        assert_eq!(error.code(), "E001");
        assert!(error.to_string().contains("Invalid URL"));
        assert!(error.to_string().contains("nope"));
    }

    #[test]
    fn test_deleted_error() {
        let error = TinylinkError::deleted("short code abc has been deleted");

        assert!(error.is_deleted());
        assert_eq!(error.error_type(), "Resource Deleted");
        assert_eq!(error.message(), "short code abc has been deleted");
    }

    #[test]
    fn test_timeout_is_backend() {
        let error = TinylinkError::timeout("get on sqlite exceeded 500 ms");
        assert!(error.is_backend());
        assert!(!error.is_conflict());
    }
}

#[cfg(test)]
mod conversion_tests {
    use super::*;

    #[test]
    fn test_from_db_err() {
        let error: TinylinkError = sea_orm::DbErr::Custom("boom".into()).into();
        assert!(matches!(error, TinylinkError::DatabaseOperation(_)));
        assert!(error.message().contains("boom"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let error: TinylinkError = parse.into();
        assert!(matches!(error, TinylinkError::Serialization(_)));
    }

    #[test]
    fn test_question_mark_propagation() {
        fn read_missing() -> Result<String> {
            Ok(std::fs::read_to_string("/nonexistent/tinylink/journal.json")?)
        }

        let error = read_missing().unwrap_err();
        assert!(matches!(error, TinylinkError::FileOperation(_)));
    }
}

#[cfg(test)]
mod formatting_tests {
    use super::*;

    #[test]
    fn test_error_trait_object() {
        let error: Box<dyn Error> = Box::new(TinylinkError::not_found("short code abc not found"));
        assert_eq!(
            error.to_string(),
            "Resource Not Found: short code abc not found"
        );
        assert!(error.source().is_none());
    }

    #[test]
    fn test_colored_format_contains_code_and_message() {
        colored::control::set_override(false);
        let formatted = TinylinkError::conflict("short code abc already exists").format_colored();
        assert!(formatted.contains("[ERROR]"));
        assert!(formatted.contains("E002"));
        assert!(formatted.contains("short code abc already exists"));
    }
}
