//! Identifier checksums: taxpayer ids and tax-office codes.
//!
//! Two taxpayer id forms exist. Businesses use a 10-digit id with a weighted
//! mod-11 check digit; individuals use an 11-digit personal id with a weighted
//! mod-10 check digit.

const BUSINESS_WEIGHTS: [u32; 9] = [6, 5, 7, 2, 3, 4, 5, 6, 7];
const PERSONAL_WEIGHTS: [u32; 10] = [1, 3, 7, 9, 1, 3, 7, 9, 1, 3];

/// Which identifier form a string has, judged by length alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxpayerIdKind {
    /// 10 digits.
    Business,
    /// 11 digits.
    Personal,
}

fn digits(value: &str) -> Option<Vec<u32>> {
    value.chars().map(|c| c.to_digit(10)).collect()
}

/// Classify an all-digit id by length. `None` for anything else.
pub fn taxpayer_id_kind(value: &str) -> Option<TaxpayerIdKind> {
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    match value.len() {
        10 => Some(TaxpayerIdKind::Business),
        11 => Some(TaxpayerIdKind::Personal),
        _ => None,
    }
}

/// 10-digit business id, weighted mod-11 (a remainder of 10 maps to 0).
pub fn is_valid_business_id(value: &str) -> bool {
    let Some(d) = digits(value) else {
        return false;
    };
    if d.len() != 10 {
        return false;
    }
    let sum: u32 = d.iter().zip(BUSINESS_WEIGHTS).map(|(a, w)| a * w).sum();
    let check = match sum % 11 {
        10 => 0,
        r => r,
    };
    check == d[9]
}

/// 11-digit personal id, weighted mod-10.
pub fn is_valid_personal_id(value: &str) -> bool {
    let Some(d) = digits(value) else {
        return false;
    };
    if d.len() != 11 {
        return false;
    }
    let sum: u32 = d.iter().zip(PERSONAL_WEIGHTS).map(|(a, w)| a * w).sum();
    (10 - sum % 10) % 10 == d[10]
}

/// Checksum for whichever form the id has.
pub fn is_valid_taxpayer_id(value: &str) -> bool {
    match taxpayer_id_kind(value) {
        Some(TaxpayerIdKind::Business) => is_valid_business_id(value),
        Some(TaxpayerIdKind::Personal) => is_valid_personal_id(value),
        None => false,
    }
}

/// Exactly four ASCII digits.
pub fn is_valid_tax_office_code(value: &str) -> bool {
    value.len() == 4 && value.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_id_checksum() {
        assert!(is_valid_business_id("1234567890"));
        assert!(!is_valid_business_id("1234567891"));
        assert!(is_valid_business_id("5260250274"));
        assert!(!is_valid_business_id("123456789"));
        assert!(!is_valid_business_id("12345678a0"));
    }

    #[test]
    fn test_personal_id_checksum() {
        assert!(is_valid_personal_id("44051401359"));
        assert!(!is_valid_personal_id("44051401358"));
    }

    #[test]
    fn test_kind_by_length() {
        assert_eq!(taxpayer_id_kind("1234567890"), Some(TaxpayerIdKind::Business));
        assert_eq!(taxpayer_id_kind("44051401359"), Some(TaxpayerIdKind::Personal));
        assert_eq!(taxpayer_id_kind("123-456-78-90"), None);
        assert!(is_valid_taxpayer_id("44051401359"));
    }

    #[test]
    fn test_tax_office_code() {
        assert!(is_valid_tax_office_code("1471"));
        assert!(!is_valid_tax_office_code("147"));
        assert!(!is_valid_tax_office_code("14a1"));
    }
}
