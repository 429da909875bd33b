use crate::error::{Result, TaggerError};
use std::fmt;
use std::str::FromStr;

/// Release version of one application namespace.
///
/// Ordering is lexicographic on (major, minor, patch), which the derive
/// provides because of the field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionNumber {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl VersionNumber {
    /// Version assumed when a namespace has no tags yet
    pub const INITIAL: VersionNumber = VersionNumber {
        major: 1,
        minor: 0,
        patch: 0,
    };

    /// Create a new version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        VersionNumber {
            major,
            minor,
            patch,
        }
    }

    /// Apply a change type, producing the next version.
    ///
    /// Lower components reset to 0:
    /// - **Major**: major += 1, minor = 0, patch = 0
    /// - **Minor**: minor += 1, patch = 0
    /// - **Patch**: patch += 1
    ///
    /// # Errors
    /// Returns [`TaggerError::Version`] if the incremented component would
    /// exceed `u64::MAX`.
    pub fn bump(self, change: ChangeType) -> Result<Self> {
        let overflow = || TaggerError::version(format!("{} {} overflows", self, change));

        let next = match change {
            ChangeType::Major => VersionNumber {
                major: self.major.checked_add(1).ok_or_else(overflow)?,
                minor: 0,
                patch: 0,
            },
            ChangeType::Minor => VersionNumber {
                major: self.major,
                minor: self.minor.checked_add(1).ok_or_else(overflow)?,
                patch: 0,
            },
            ChangeType::Patch => VersionNumber {
                major: self.major,
                minor: self.minor,
                patch: self.patch.checked_add(1).ok_or_else(overflow)?,
            },
        };
        Ok(next)
    }
}

impl Default for VersionNumber {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Bump category requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    Major,
    Minor,
    Patch,
}

impl FromStr for ChangeType {
    type Err = TaggerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "major" => Ok(ChangeType::Major),
            "minor" => Ok(ChangeType::Minor),
            "patch" => Ok(ChangeType::Patch),
            _ => Err(TaggerError::InvalidChangeType(s.to_string())),
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeType::Major => write!(f, "major"),
            ChangeType::Minor => write!(f, "minor"),
            ChangeType::Patch => write!(f, "patch"),
        }
    }
}

/// Parse `change_type` and bump `current` with it.
///
/// Validation happens before anything is computed, so an unknown change
/// type never yields a version.
pub fn bump_str(current: VersionNumber, change_type: &str) -> Result<VersionNumber> {
    let change: ChangeType = change_type.parse()?;
    current.bump(change)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_display() {
        assert_eq!(VersionNumber::new(1, 2, 3).to_string(), "V1.2.3");
        assert_eq!(VersionNumber::INITIAL.to_string(), "V1.0.0");
    }

    #[test]
    fn test_version_ordering_is_lexicographic() {
        assert!(VersionNumber::new(2, 0, 0) > VersionNumber::new(1, 99, 99));
        assert!(VersionNumber::new(1, 3, 0) > VersionNumber::new(1, 2, 9));
        assert!(VersionNumber::new(1, 2, 10) > VersionNumber::new(1, 2, 9));
        assert_eq!(
            VersionNumber::new(1, 2, 3).cmp(&VersionNumber::new(1, 2, 3)),
            std::cmp::Ordering::Equal
        );
    }

    #[test]
    fn test_bump_major_resets_lower_components() {
        let bumped = VersionNumber::new(2, 3, 1).bump(ChangeType::Major).unwrap();
        assert_eq!(bumped, VersionNumber::new(3, 0, 0));
    }

    #[test]
    fn test_bump_minor_resets_patch() {
        let bumped = VersionNumber::new(1, 2, 3).bump(ChangeType::Minor).unwrap();
        assert_eq!(bumped, VersionNumber::new(1, 3, 0));
    }

    #[test]
    fn test_bump_patch_keeps_major_and_minor() {
        for v in [
            VersionNumber::new(0, 0, 0),
            VersionNumber::new(1, 2, 3),
            VersionNumber::new(7, 0, 41),
        ] {
            let bumped = v.bump(ChangeType::Patch).unwrap();
            assert_eq!(bumped.patch, v.patch + 1);
            assert_eq!(bumped.major, v.major);
            assert_eq!(bumped.minor, v.minor);
        }
    }

    #[test]
    fn test_bump_leaves_receiver_unchanged() {
        let v = VersionNumber::new(1, 2, 3);
        let _ = v.bump(ChangeType::Major).unwrap();
        assert_eq!(v, VersionNumber::new(1, 2, 3));
    }

    #[test]
    fn test_bump_overflow_is_an_error() {
        let v = VersionNumber::new(1, 2, u64::MAX);
        let err = v.bump(ChangeType::Patch).unwrap_err();
        assert!(matches!(err, TaggerError::Version(_)));
        // Only the incremented component matters.
        assert_eq!(
            v.bump(ChangeType::Minor).unwrap(),
            VersionNumber::new(1, 3, 0)
        );
    }

    #[test]
    fn test_change_type_is_case_insensitive() {
        assert_eq!("MAJOR".parse::<ChangeType>().unwrap(), ChangeType::Major);
        assert_eq!("Minor".parse::<ChangeType>().unwrap(), ChangeType::Minor);
        assert_eq!("pAtCh".parse::<ChangeType>().unwrap(), ChangeType::Patch);
    }

    #[test]
    fn test_change_type_rejects_unknown() {
        let err = "invalid".parse::<ChangeType>().unwrap_err();
        assert!(matches!(err, TaggerError::InvalidChangeType(ref s) if s == "invalid"));
        assert!("".parse::<ChangeType>().is_err());
        assert!(" major".parse::<ChangeType>().is_err());
    }

    #[test]
    fn test_bump_str() {
        let v = VersionNumber::new(2, 3, 1);
        assert_eq!(bump_str(v, "MAJOR").unwrap(), bump_str(v, "major").unwrap());
        assert!(matches!(
            bump_str(v, "invalid"),
            Err(TaggerError::InvalidChangeType(_))
        ));
    }
}
