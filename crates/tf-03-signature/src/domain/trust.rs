//! # Certificate Trust
//!
//! Issuer allow-list, validity window and a configured revocation list.
//! The revocation list stands in for OCSP/CRL lookups.

use crate::domain::certificate::normalize_serial;
use crate::domain::entities::CertificateInfo;
use crate::domain::errors::SignatureError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustPolicy {
    /// Issuer common names or full distinguished names. Empty trusts nobody.
    pub allowed_issuers: Vec<String>,
    /// Normalized serial numbers.
    revoked_serials: HashSet<String>,
}

impl TrustPolicy {
    pub fn new<I, S>(allowed_issuers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_issuers: allowed_issuers.into_iter().map(Into::into).collect(),
            revoked_serials: HashSet::new(),
        }
    }

    pub fn with_revoked<I, S>(mut self, serials: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.revoked_serials
            .extend(serials.into_iter().map(|s| normalize_serial(s.as_ref())));
        self
    }

    pub fn is_revoked(&self, serial: &str) -> bool {
        self.revoked_serials.contains(&normalize_serial(serial))
    }

    fn issuer_allowed(&self, info: &CertificateInfo) -> bool {
        self.allowed_issuers.iter().any(|allowed| {
            allowed.eq_ignore_ascii_case(&info.issuer)
                || info
                    .issuer_cn
                    .as_deref()
                    .is_some_and(|cn| allowed.eq_ignore_ascii_case(cn))
        })
    }

    /// Check issuer, validity at `now`, then revocation.
    pub fn check(&self, info: &CertificateInfo, now: DateTime<Utc>) -> Result<(), SignatureError> {
        if !self.issuer_allowed(info) {
            return Err(SignatureError::UntrustedIssuer(info.issuer.clone()));
        }
        if now < info.not_before {
            return Err(SignatureError::CertificateNotYetValid(
                info.not_before.to_rfc3339_opts(SecondsFormat::Secs, true),
            ));
        }
        if now > info.not_after {
            return Err(SignatureError::CertificateExpired(
                info.not_after.to_rfc3339_opts(SecondsFormat::Secs, true),
            ));
        }
        if self.is_revoked(&info.serial) {
            return Err(SignatureError::CertificateRevoked(info.serial.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn info() -> CertificateInfo {
        CertificateInfo {
            serial: "a1b2".into(),
            issuer: "CN=Qualified CA, O=Authority".into(),
            issuer_cn: Some("Qualified CA".into()),
            subject: "CN=Jan Kowalski".into(),
            subject_cn: Some("Jan Kowalski".into()),
            not_before: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            not_after: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn mid() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_trusted_certificate_passes() {
        let policy = TrustPolicy::new(["qualified ca"]);
        assert!(policy.check(&info(), mid()).is_ok());
        let by_dn = TrustPolicy::new(["CN=Qualified CA, O=Authority"]);
        assert!(by_dn.check(&info(), mid()).is_ok());
    }

    #[test]
    fn test_unknown_issuer() {
        let policy = TrustPolicy::new(["Other CA"]);
        assert!(matches!(
            policy.check(&info(), mid()),
            Err(SignatureError::UntrustedIssuer(_))
        ));
        assert!(TrustPolicy::default().check(&info(), mid()).is_err());
    }

    #[test]
    fn test_validity_window() {
        let policy = TrustPolicy::new(["Qualified CA"]);
        let early = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        assert!(matches!(
            policy.check(&info(), early),
            Err(SignatureError::CertificateNotYetValid(_))
        ));
        assert!(matches!(
            policy.check(&info(), late),
            Err(SignatureError::CertificateExpired(_))
        ));
        assert!(policy.check(&info(), info().not_after).is_ok());
    }

    #[test]
    fn test_revoked_serial() {
        let policy = TrustPolicy::new(["Qualified CA"]).with_revoked(["00:A1:B2"]);
        assert!(matches!(
            policy.check(&info(), mid()),
            Err(SignatureError::CertificateRevoked(serial)) if serial == "a1b2"
        ));
    }
}
