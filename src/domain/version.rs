use crate::error::{Result, VersioningError};
use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// Point-in-time version facts read from the repository.
///
/// Built from `git describe --tags --long --dirty` output, or synthesized
/// from a bare triplet when computing a bump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryVersion {
    /// Tag text without its `v` prefix, e.g. "1.2.3"
    pub main: String,
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    /// Number of commits since the tag
    pub distance: u64,
    /// Abbreviated commit id, prefixed with `g`
    pub commitid: Option<String>,
    pub dirty: bool,
    /// Raw describe output this version was parsed from
    pub text: Option<String>,
}

impl RepositoryVersion {
    /// Create a version from a tag's main part
    pub fn new(main: &str, distance: u64, commitid: Option<String>, dirty: bool) -> Self {
        let main = main.trim_start_matches(['v', 'V']).to_string();
        let (major, minor, patch) = parse_triplet(&main);
        RepositoryVersion {
            main,
            major,
            minor,
            patch,
            distance,
            commitid,
            dirty,
            text: None,
        }
    }

    /// Clean version with no distance, commit or tag metadata
    pub fn from_triplet(major: u64, minor: u64, patch: u64) -> Self {
        RepositoryVersion::new(&format!("{}.{}.{}", major, minor, patch), 0, None, false)
    }

    /// Parse `<tag>-<distance>-g<sha>[-dirty]`
    ///
    /// # Example
    /// ```
    /// # use git_versioning::domain::RepositoryVersion;
    /// let v = RepositoryVersion::from_describe("v1.2.3-4-gabc1234-dirty").unwrap();
    /// assert_eq!((v.major, v.minor, v.patch, v.distance), (1, 2, 3, 4));
    /// assert_eq!(v.commitid.as_deref(), Some("gabc1234"));
    /// assert!(v.dirty);
    /// ```
    pub fn from_describe(text: &str) -> Option<Self> {
        let re = Regex::new(
            r"^(?P<tag>.+)-(?P<distance>\d+)-g(?P<sha>[0-9a-fA-F]+)(?P<dirty>-dirty)?$",
        )
        .ok()?;
        let text = text.trim();
        let captures = re.captures(text)?;
        let distance = captures["distance"].parse::<u64>().ok()?;
        let mut version = RepositoryVersion::new(
            &captures["tag"],
            distance,
            Some(format!("g{}", &captures["sha"])),
            captures.name("dirty").is_some(),
        );
        version.text = Some(text.to_string());
        Some(version)
    }

    /// `(major, minor, patch)` used for bump arithmetic
    pub fn bump_triplet(&self) -> semver::Version {
        semver::Version::new(self.major, self.minor, self.patch)
    }

    /// Render a known field; `None` when the field has no value
    pub fn field(&self, field: VersionField) -> Option<String> {
        match field {
            VersionField::Major => Some(self.major.to_string()),
            VersionField::Minor => Some(self.minor.to_string()),
            VersionField::Patch => Some(self.patch.to_string()),
            VersionField::Changes | VersionField::Distance => Some(self.distance.to_string()),
            VersionField::Post => Some(self.suffix("post")),
            VersionField::Dev => Some(self.suffix("dev")),
            VersionField::Devcommit => {
                let dev = self.suffix("dev");
                match &self.commitid {
                    Some(commitid) if self.distance > 0 => Some(format!("{}+{}", dev, commitid)),
                    _ => Some(dev),
                }
            }
            VersionField::Commitid => self.commitid.clone(),
            VersionField::Dirty => Some(self.dirty.to_string()),
            VersionField::Main => Some(self.main.clone()),
            VersionField::Text => self.text.clone(),
        }
    }

    fn suffix(&self, label: &str) -> String {
        if self.distance > 0 {
            format!(".{}{}", label, self.distance)
        } else {
            String::new()
        }
    }
}

fn parse_triplet(main: &str) -> (u64, u64, u64) {
    let Ok(re) = Regex::new(r"^(\d+)(?:\.(\d+))?(?:\.(\d+))?") else {
        return (0, 0, 0);
    };
    let Some(captures) = re.captures(main) else {
        return (0, 0, 0);
    };
    let part = |i: usize| {
        captures
            .get(i)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };
    (part(1), part(2), part(3))
}

/// Fields a format placeholder may reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionField {
    Major,
    Minor,
    Patch,
    Changes,
    Distance,
    Post,
    Dev,
    Devcommit,
    Commitid,
    Dirty,
    Main,
    Text,
}

impl VersionField {
    pub const ALL: [VersionField; 12] = [
        VersionField::Major,
        VersionField::Minor,
        VersionField::Patch,
        VersionField::Changes,
        VersionField::Distance,
        VersionField::Post,
        VersionField::Dev,
        VersionField::Devcommit,
        VersionField::Commitid,
        VersionField::Dirty,
        VersionField::Main,
        VersionField::Text,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            VersionField::Major => "major",
            VersionField::Minor => "minor",
            VersionField::Patch => "patch",
            VersionField::Changes => "changes",
            VersionField::Distance => "distance",
            VersionField::Post => "post",
            VersionField::Dev => "dev",
            VersionField::Devcommit => "devcommit",
            VersionField::Commitid => "commitid",
            VersionField::Dirty => "dirty",
            VersionField::Main => "main",
            VersionField::Text => "text",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        VersionField::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Component this field stands for when bumping, if any
    pub fn bump(&self) -> Option<VersionBump> {
        match self {
            VersionField::Major => Some(VersionBump::Major),
            VersionField::Minor => Some(VersionBump::Minor),
            VersionField::Patch => Some(VersionBump::Patch),
            _ => None,
        }
    }
}

/// Version bump type decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionBump {
    Major,
    Minor,
    Patch,
}

impl VersionBump {
    pub fn name(&self) -> &'static str {
        match self {
            VersionBump::Major => "major",
            VersionBump::Minor => "minor",
            VersionBump::Patch => "patch",
        }
    }

    /// Increment the matching component, resetting lower ones
    pub fn apply(&self, current: &semver::Version) -> Result<semver::Version> {
        let overflow = || VersioningError::VersionOverflow {
            component: self.name().to_string(),
            version: current.to_string(),
        };
        let next = match self {
            VersionBump::Major => {
                semver::Version::new(current.major.checked_add(1).ok_or_else(overflow)?, 0, 0)
            }
            VersionBump::Minor => semver::Version::new(
                current.major,
                current.minor.checked_add(1).ok_or_else(overflow)?,
                0,
            ),
            VersionBump::Patch => semver::Version::new(
                current.major,
                current.minor,
                current.patch.checked_add(1).ok_or_else(overflow)?,
            ),
        };
        Ok(next)
    }
}

impl fmt::Display for VersionBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VersionBump {
    type Err = VersioningError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "major" => Ok(VersionBump::Major),
            "minor" => Ok(VersionBump::Minor),
            "patch" => Ok(VersionBump::Patch),
            other => Err(VersioningError::InvalidComponent(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_clean() {
        let v = RepositoryVersion::from_describe("v0.4.1-0-g1a2b3c4").unwrap();
        assert_eq!(v.main, "0.4.1");
        assert_eq!((v.major, v.minor, v.patch), (0, 4, 1));
        assert_eq!(v.distance, 0);
        assert!(!v.dirty);
        assert_eq!(v.text.as_deref(), Some("v0.4.1-0-g1a2b3c4"));
    }

    #[test]
    fn test_describe_tag_with_dashes() {
        let v = RepositoryVersion::from_describe("v1.0-rc-1-12-gdeadbee").unwrap();
        assert_eq!(v.main, "1.0-rc-1");
        assert_eq!((v.major, v.minor, v.patch), (1, 0, 0));
        assert_eq!(v.distance, 12);
    }

    #[test]
    fn test_describe_garbage() {
        assert!(RepositoryVersion::from_describe("not a describe").is_none());
    }

    #[test]
    fn test_non_numeric_tag_yields_zeros() {
        let v = RepositoryVersion::new("release", 0, None, false);
        assert_eq!(v.bump_triplet(), semver::Version::new(0, 0, 0));
    }

    #[test]
    fn test_post_and_dev_follow_distance() {
        let v = RepositoryVersion::new("1.2.3", 5, Some("gabc".to_string()), false);
        assert_eq!(v.field(VersionField::Post).as_deref(), Some(".post5"));
        assert_eq!(v.field(VersionField::Dev).as_deref(), Some(".dev5"));
        assert_eq!(v.field(VersionField::Devcommit).as_deref(), Some(".dev5+gabc"));
        assert_eq!(v.field(VersionField::Changes).as_deref(), Some("5"));

        let clean = RepositoryVersion::from_triplet(1, 2, 3);
        assert_eq!(clean.field(VersionField::Post).as_deref(), Some(""));
        assert_eq!(clean.field(VersionField::Devcommit).as_deref(), Some(""));
        assert_eq!(clean.field(VersionField::Commitid), None);
    }

    #[test]
    fn test_field_names_round_trip() {
        for field in VersionField::ALL {
            assert_eq!(VersionField::from_name(field.name()), Some(field));
        }
        assert_eq!(VersionField::from_name("nope"), None);
    }

    #[test]
    fn test_bump_rules() {
        let v = semver::Version::new(1, 2, 3);
        assert_eq!(VersionBump::Major.apply(&v).unwrap(), semver::Version::new(2, 0, 0));
        assert_eq!(VersionBump::Minor.apply(&v).unwrap(), semver::Version::new(1, 3, 0));
        assert_eq!(VersionBump::Patch.apply(&v).unwrap(), semver::Version::new(1, 2, 4));
    }

    #[test]
    fn test_bump_at_component_limit() {
        let v = RepositoryVersion::new(&format!("{}.0.0", u64::MAX), 0, None, false);
        assert_eq!(v.major, u64::MAX);
        let err = VersionBump::Major.apply(&v.bump_triplet()).unwrap_err();
        assert!(matches!(err, VersioningError::VersionOverflow { .. }));
        assert_eq!(
            VersionBump::Minor.apply(&v.bump_triplet()).unwrap(),
            semver::Version::new(u64::MAX, 1, 0)
        );
    }

    #[test]
    fn test_bump_from_str() {
        assert_eq!("minor".parse::<VersionBump>().unwrap(), VersionBump::Minor);
        assert!("build".parse::<VersionBump>().is_err());
    }
}
