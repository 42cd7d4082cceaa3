//! Deployment environment name

use std::fmt;

use crate::domain::DomainError;

pub const DEVELOPMENT: &str = "Development";
pub const PRODUCTION: &str = "Production";
pub const STAGING: &str = "Staging";
pub const QA: &str = "Qa";

/// Name of the active deployment environment (e.g. `Development`).
///
/// Never blank. Comparisons against well-known names are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentName(String);

impl EnvironmentName {
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::BlankEnvironmentName);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive match against `other`; a blank `other` is rejected.
    pub fn is(&self, other: &str) -> Result<bool, DomainError> {
        if other.trim().is_empty() {
            return Err(DomainError::BlankEnvironmentName);
        }
        Ok(self.0.eq_ignore_ascii_case(other.trim()))
    }

    pub fn is_development(&self) -> bool {
        self.0.eq_ignore_ascii_case(DEVELOPMENT)
    }

    pub fn is_production(&self) -> bool {
        self.0.eq_ignore_ascii_case(PRODUCTION)
    }

    pub fn is_staging(&self) -> bool {
        self.0.eq_ignore_ascii_case(STAGING)
    }

    pub fn is_qa(&self) -> bool {
        self.0.eq_ignore_ascii_case(QA)
    }
}

impl fmt::Display for EnvironmentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\t\n")]
    fn given_blank_name_when_creating_then_rejects(#[case] name: &str) {
        assert_eq!(
            EnvironmentName::new(name),
            Err(DomainError::BlankEnvironmentName)
        );
    }

    #[rstest]
    #[case("development", true, false)]
    #[case("DEVELOPMENT", true, false)]
    #[case("Production", false, true)]
    #[case("Staging", false, false)]
    fn given_name_when_checking_well_known_then_ignores_case(
        #[case] name: &str,
        #[case] development: bool,
        #[case] production: bool,
    ) {
        let env = EnvironmentName::new(name).unwrap();
        assert_eq!(env.is_development(), development);
        assert_eq!(env.is_production(), production);
    }

    #[test]
    fn given_blank_comparison_when_is_then_rejects() {
        let env = EnvironmentName::new("Qa").unwrap();
        assert!(env.is_qa());
        assert!(env.is("qa").unwrap());
        assert_eq!(env.is(" "), Err(DomainError::BlankEnvironmentName));
    }
}
