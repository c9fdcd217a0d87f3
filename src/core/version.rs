//! Semantic version parsing, formatting, and next-version arithmetic

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Context};

/// Severity of an API delta, ordered least to greatest.
///
/// The `Ord` derive gives the fold operator: a repository verdict is the
/// maximum of its package verdicts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Change {
    /// Nothing changed
    #[default]
    None,
    /// Only unexported surface or expression bodies changed
    Patch,
    /// Exported surface grew without breaking callers
    Addition,
    /// Callers must be edited
    Breaking,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::None => write!(f, "no change"),
            Change::Patch => write!(f, "patch"),
            Change::Addition => write!(f, "addition"),
            Change::Breaking => write!(f, "breaking change"),
        }
    }
}

/// A `v<major>.<minor>.<patch>` version triple.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl SemanticVersion {
    /// A version is valid when any component is positive; the zero version
    /// is the "no version given" placeholder.
    pub fn valid(&self) -> bool {
        self.major > 0 || self.minor > 0 || self.patch > 0
    }

    /// Compute the version that follows `self` for the given change.
    ///
    /// Pre-1.0 versions treat a breaking change as a minor bump, per the
    /// semver convention that 0.x makes no stability promises.
    pub fn next(self, change: Change) -> Self {
        let mut next = self;
        match change {
            Change::Breaking => {
                if next.major > 0 {
                    next.major += 1;
                    next.minor = 0;
                    next.patch = 0;
                } else {
                    next.minor += 1;
                    next.patch = 0;
                }
            }
            Change::Addition => {
                next.minor += 1;
                next.patch = 0;
            }
            Change::Patch => {
                next.patch += 1;
            }
            Change::None => {}
        }
        next
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SemanticVersion {
    type Err = anyhow::Error;

    /// Accepts an optional leading `v`, requires `<major>.<minor>.`, then
    /// reads the longest leading run of decimal digits as the patch and
    /// ignores any suffix ("v0.12.4 beta" parses as v0.12.4).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s.strip_prefix('v').unwrap_or(s);

        let (major, rest) = rest
            .split_once('.')
            .ok_or_else(|| anyhow!("unable to parse major version: malformed version {s:?}"))?;
        let major: u64 = major
            .parse()
            .with_context(|| format!("unable to parse major version in {s:?}"))?;

        let (minor, rest) = rest
            .split_once('.')
            .ok_or_else(|| anyhow!("unable to parse minor version: malformed version {s:?}"))?;
        let minor: u64 = minor
            .parse()
            .with_context(|| format!("unable to parse minor version in {s:?}"))?;

        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        let patch: u64 = rest[..digits]
            .parse()
            .with_context(|| format!("unable to parse patch version in {s:?}"))?;

        Ok(Self { major, minor, patch })
    }
}
