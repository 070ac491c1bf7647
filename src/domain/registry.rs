//! Inventory file line format and duplicate detection.
//!
//! The inventory is a plain-text Ansible hosts file. Enrollment appends at
//! most one line per address:
//!
//! ```text
//! 10.0.0.5   # web-a - Added 2026-08-23 14:02:11
//! ```
//!
//! Duplicate detection treats the address as a whole token at the start of a
//! line: `10.0.0.1` must not match a `10.0.0.10` line, and `#`-prefixed
//! comment lines never match anything.

/// Format the inventory line for a newly enrolled host.
#[must_use]
pub fn format_entry(address: &str, hostname: &str, timestamp: &str) -> String {
    format!("{address}   # {hostname} - Added {timestamp}")
}

/// Whether a line is a comment (ignoring leading whitespace).
#[must_use]
pub fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

/// Whether a single inventory line registers `address`.
///
/// The address must start at column zero and be followed by whitespace or
/// end-of-line, so host variables after the address still match:
/// `10.0.0.5 ansible_user=svc-auto` registers `10.0.0.5`.
#[must_use]
pub fn line_registers(line: &str, address: &str) -> bool {
    if is_comment(line) {
        return false;
    }
    match line.strip_prefix(address) {
        Some(rest) => rest.is_empty() || rest.starts_with(char::is_whitespace),
        None => false,
    }
}

/// Whether any line of `content` registers `address`.
#[must_use]
pub fn contains_address(content: &str, address: &str) -> bool {
    content.lines().any(|line| line_registers(line, address))
}

/// Drop every line registering `address`, preserving all other lines.
/// Returns `None` when nothing matched (content unchanged).
#[must_use]
pub fn remove_address(content: &str, address: &str) -> Option<String> {
    if !contains_address(content, address) {
        return None;
    }
    let mut kept: String = content
        .lines()
        .filter(|line| !line_registers(line, address))
        .map(|line| format!("{line}\n"))
        .collect();
    if !content.ends_with('\n') {
        // original had no trailing newline; don't invent one
        while kept.ends_with('\n') {
            kept.pop();
        }
    }
    Some(kept)
}

// ── Unit tests ────────────────────────────────────────────────────────────────
