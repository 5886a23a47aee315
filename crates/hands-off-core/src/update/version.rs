/// Dotted version triple with zero-fill parsing.
///
/// Missing or non-numeric components read as zero, so "1.2" parses as
/// 1.2.0 and garbage parses as 0.0.0. Components beyond the third are
/// ignored. The derived ordering compares major, then minor, then patch,
/// which is exactly the short-circuiting compare the update check needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct VersionTriple {
    /// Major component.
    pub major: u32,
    /// Minor component.
    pub minor: u32,
    /// Patch component.
    pub patch: u32,
}

impl VersionTriple {
    /// Parse a dotted version string, zero-filling anything unparseable.
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.split('.').map(|part| part.parse::<u32>().unwrap_or(0));
        Self {
            major: parts.next().unwrap_or(0),
            minor: parts.next().unwrap_or(0),
            patch: parts.next().unwrap_or(0),
        }
    }
}

impl std::fmt::Display for VersionTriple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Returns true when `latest` denotes a strictly newer release than
/// `current`. Equal or older versions, in any component mix, are not
/// an update.
pub fn update_available(current: &str, latest: &str) -> bool {
    VersionTriple::parse(latest) > VersionTriple::parse(current)
}
