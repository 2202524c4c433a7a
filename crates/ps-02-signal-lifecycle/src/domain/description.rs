//! Location description validation.

use shared_types::ProximityError;

/// Trim a free-text location description and enforce its length limit.
///
/// Blank input becomes `None`.
pub fn normalize_description(
    raw: Option<&str>,
    max_len: usize,
) -> Result<Option<String>, ProximityError> {
    let Some(trimmed) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let len = trimmed.chars().count();
    if len > max_len {
        return Err(ProximityError::ValidationError(format!(
            "location description is {len} characters, limit is {max_len}"
        )));
    }
    Ok(Some(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_becomes_none() {
        assert_eq!(normalize_description(None, 10), Ok(None));
        assert_eq!(normalize_description(Some("   "), 10), Ok(None));
    }

    #[test]
    fn test_trims_and_limits() {
        assert_eq!(
            normalize_description(Some("  library  "), 10),
            Ok(Some("library".to_string()))
        );
        assert!(matches!(
            normalize_description(Some("the big reading room"), 10),
            Err(ProximityError::ValidationError(_))
        ));
        // Counted in characters, not bytes.
        assert!(normalize_description(Some("café crème"), 10).is_ok());
    }
}
