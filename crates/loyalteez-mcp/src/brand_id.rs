//! Brand id resolution.
//!
//! A tool call may name its brand explicitly. Otherwise the configured
//! default (`LOYALTEEZ_BRAND_ID`, read once at start-up) applies.

use crate::domain::BrandId;
use crate::validation::{validate_brand_id, ValidationError};

/// Resolve the brand for one call.
///
/// Empty strings count as absent. The candidate is never silently replaced
/// by the default when it is present but malformed.
pub fn resolve_brand_id(
    candidate: Option<&str>,
    default: Option<&str>,
) -> Result<BrandId, ValidationError> {
    if let Some(input) = candidate.filter(|s| !s.is_empty()) {
        return validate_brand_id(input)
            .map_err(|_| ValidationError::InvalidBrandIdInput(input.to_string()));
    }

    if let Some(configured) = default.filter(|s| !s.is_empty()) {
        return validate_brand_id(configured)
            .map_err(|_| ValidationError::InvalidDefaultBrandId(configured.to_string()));
    }

    Err(ValidationError::BrandIdRequired)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "0x1234567890123456789012345678901234567890";
    const MIXED: &str = "0xABCDEF1234567890ABCDEF1234567890ABCDEF12";

    #[test]
    fn test_candidate_is_normalized() {
        let brand = resolve_brand_id(Some(MIXED), None).unwrap();
        assert_eq!(brand.as_str(), "0xabcdef1234567890abcdef1234567890abcdef12");
    }

    #[test]
    fn test_candidate_wins_over_default() {
        let brand = resolve_brand_id(Some(VALID), Some(MIXED)).unwrap();
        assert_eq!(brand.as_str(), VALID);
    }

    #[test]
    fn test_falls_back_to_default() {
        let brand = resolve_brand_id(None, Some(MIXED)).unwrap();
        assert_eq!(brand.as_str(), MIXED.to_lowercase());

        let brand = resolve_brand_id(Some(""), Some(VALID)).unwrap();
        assert_eq!(brand.as_str(), VALID);
    }

    #[test]
    fn test_invalid_candidate() {
        let err = resolve_brand_id(Some("invalid"), Some(VALID)).unwrap_err();
        assert_eq!(err, ValidationError::InvalidBrandIdInput("invalid".to_string()));
        let message = err.to_string();
        assert!(message.starts_with("Invalid brandId provided: invalid."));
        assert!(message.contains("LOYALTEEZ_BRAND_ID"));
    }

    #[test]
    fn test_invalid_default() {
        let err = resolve_brand_id(None, Some("0x123")).unwrap_err();
        assert!(err
            .to_string()
            .starts_with("Invalid LOYALTEEZ_BRAND_ID environment variable: 0x123."));
    }

    #[test]
    fn test_missing_brand() {
        let err = resolve_brand_id(None, None).unwrap_err();
        assert_eq!(err, ValidationError::BrandIdRequired);
        let message = err.to_string();
        assert!(message.contains("BrandId is required"));
        assert!(message.contains("1. Provide brandId as a tool parameter"));
        assert!(message.contains("2. Set LOYALTEEZ_BRAND_ID environment variable"));

        assert_eq!(
            resolve_brand_id(Some(""), Some("")),
            Err(ValidationError::BrandIdRequired)
        );
    }
}
