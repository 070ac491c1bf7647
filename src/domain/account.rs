//! Remote account discovery heuristics.
//!
//! Pure parsing of `getent passwd` output and candidate filtering. The
//! resolver service feeds output in and presents the candidates; everything
//! here is data in, data out.

use crate::domain::host::RemoteAccount;

/// One row of passwd(5) output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswdEntry {
    pub name: String,
    pub uid: u32,
    pub gid: u32,
    pub home: String,
    pub shell: String,
}

impl PasswdEntry {
    /// Parse a single `name:x:uid:gid:gecos:home:shell` row.
    /// Malformed rows yield `None` and are skipped by the caller.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.split(':').collect();
        if fields.len() != 7 {
            return None;
        }
        Some(Self {
            name: fields[0].to_string(),
            uid: fields[2].parse().ok()?,
            gid: fields[3].parse().ok()?,
            home: fields[5].to_string(),
            shell: fields[6].to_string(),
        })
    }

    /// The session-facing account record for this row.
    #[must_use]
    pub fn to_account(&self) -> RemoteAccount {
        RemoteAccount {
            name: self.name.clone(),
            uid: self.uid,
            home: self.home.clone(),
        }
    }
}

/// Parse full `getent passwd` output, skipping malformed rows.
#[must_use]
pub fn parse_passwd(output: &str) -> Vec<PasswdEntry> {
    output.lines().filter_map(PasswdEntry::parse).collect()
}

/// Which accounts look like automation accounts.
#[derive(Debug, Clone)]
pub struct DiscoveryRules {
    /// Inclusive uid range for service accounts.
    pub uid_min: u32,
    pub uid_max: u32,
    /// Case-insensitive substrings that mark an automation account name.
    pub name_tokens: Vec<String>,
}

impl DiscoveryRules {
    /// Whether a passwd row matches both the uid range and a name token.
    #[must_use]
    pub fn matches(&self, entry: &PasswdEntry) -> bool {
        if entry.uid < self.uid_min || entry.uid > self.uid_max {
            return false;
        }
        let name = entry.name.to_ascii_lowercase();
        self.name_tokens
            .iter()
            .any(|token| name.contains(&token.to_ascii_lowercase()))
    }
}

/// Filter candidates, preserving discovery order. The order is what the
/// operator sees in the selection menu, so it must be stable.
#[must_use]
pub fn find_candidates(entries: &[PasswdEntry], rules: &DiscoveryRules) -> Vec<PasswdEntry> {
    entries
        .iter()
        .filter(|e| rules.matches(e))
        .cloned()
        .collect()
}

// ── Unit tests ────────────────────────────────────────────────────────────────
