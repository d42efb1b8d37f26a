//! Engine revision strings such as `5.6.7f1` or `2020.1.0a12`.

use std::fmt;
use std::str::FromStr;

use crate::util::Error;

/// Release channel letter in an engine version string.
///
/// Declaration order is the sort order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReleaseKind {
    Alpha,
    Beta,
    China,
    #[default]
    Final,
    Patch,
    Experimental,
}

impl ReleaseKind {
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'a' => Some(Self::Alpha),
            'b' => Some(Self::Beta),
            'c' => Some(Self::China),
            'f' => Some(Self::Final),
            'p' => Some(Self::Patch),
            'x' => Some(Self::Experimental),
            _ => None,
        }
    }

    pub const fn as_char(self) -> char {
        match self {
            Self::Alpha => 'a',
            Self::Beta => 'b',
            Self::China => 'c',
            Self::Final => 'f',
            Self::Patch => 'p',
            Self::Experimental => 'x',
        }
    }
}

/// Parsed engine revision. Ordered by numeric parts, then release kind, then build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EngineVersion {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
    pub kind: ReleaseKind,
    pub build: u16,
}

impl EngineVersion {
    /// Final release `major.minor.patch` with build 0.
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self { major, minor, patch, kind: ReleaseKind::Final, build: 0 }
    }

    pub const fn with_build(self, kind: ReleaseKind, build: u16) -> Self {
        Self { kind, build, ..self }
    }

    /// Numeric part only, used for threshold comparisons.
    #[inline]
    pub const fn triple(&self) -> (u16, u16, u16) {
        (self.major, self.minor, self.patch)
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}{}{}",
            self.major,
            self.minor,
            self.patch,
            self.kind.as_char(),
            self.build
        )
    }
}

impl FromStr for EngineVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || Error::UnsupportedRevision(s.to_string());
        let s_trim = s.trim();
        let mut parts = s_trim.splitn(3, '.');
        let major = parts.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
        let minor = parts.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
        let tail = parts.next().ok_or_else(bad)?;

        let digits = tail.find(|c: char| !c.is_ascii_digit()).unwrap_or(tail.len());
        let patch = tail[..digits].parse().map_err(|_| bad())?;
        let suffix = &tail[digits..];

        let (kind, build) = if suffix.is_empty() {
            (ReleaseKind::Final, 0)
        } else {
            let mut chars = suffix.chars();
            let kind = chars.next().and_then(ReleaseKind::from_char).ok_or_else(bad)?;
            let rest = chars.as_str();
            // Some builds append a revision hash after the build number.
            let build_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
            let build = if build_end == 0 { 0 } else { rest[..build_end].parse().map_err(|_| bad())? };
            (kind, build)
        };

        Ok(Self { major, minor, patch, kind, build })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let v: EngineVersion = "2019.4.31f1".parse().unwrap();
        assert_eq!(v.triple(), (2019, 4, 31));
        assert_eq!(v.kind, ReleaseKind::Final);
        assert_eq!(v.build, 1);

        let v: EngineVersion = "2020.1.0a12".parse().unwrap();
        assert_eq!(v.kind, ReleaseKind::Alpha);
        assert_eq!(v.build, 12);

        let v: EngineVersion = "5.5.0".parse().unwrap();
        assert_eq!(v, EngineVersion::new(5, 5, 0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<EngineVersion>().is_err());
        assert!("5.x.0".parse::<EngineVersion>().is_err());
        assert!("5.5.0z1".parse::<EngineVersion>().is_err());
        assert!("hello".parse::<EngineVersion>().is_err());
    }

    #[test]
    fn test_ordering() {
        let a: EngineVersion = "5.4.6f3".parse().unwrap();
        let b: EngineVersion = "5.5.0a1".parse().unwrap();
        let c: EngineVersion = "5.5.0f1".parse().unwrap();
        let d: EngineVersion = "5.5.0p1".parse().unwrap();
        assert!(a < b && b < c && c < d);
        assert!(EngineVersion::new(5, 5, 0) < c);
        assert!(EngineVersion::new(2017, 1, 0) > d);
    }

    #[test]
    fn test_display() {
        let v = EngineVersion::new(2018, 4, 2).with_build(ReleaseKind::Patch, 3);
        assert_eq!(v.to_string(), "2018.4.2p3");
        assert_eq!(v.to_string().parse::<EngineVersion>().unwrap(), v);
    }
}
