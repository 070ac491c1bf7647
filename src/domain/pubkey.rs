//! OpenSSH public key parsing and `authorized_keys` membership.
//!
//! A credential's identity is the `(algorithm, key-data)` pair. The trailing
//! comment is display-only: two lines with different comments but the same
//! algorithm and key material are the *same* credential, and installation
//! must treat them as such.

use anyhow::{Context, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

/// Key types accepted in `authorized_keys` lines.
pub const KEY_ALGORITHMS: &[&str] = &[
    "ssh-ed25519",
    "ssh-rsa",
    "ecdsa-sha2-nistp256",
    "ecdsa-sha2-nistp384",
    "ecdsa-sha2-nistp521",
    "sk-ssh-ed25519@openssh.com",
    "sk-ecdsa-sha2-nistp256@openssh.com",
];

/// A parsed OpenSSH public key line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    pub algorithm: String,
    pub key_data: String,
    pub comment: Option<String>,
}

impl PublicKey {
    /// Parse a single `authorized_keys`-format line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is empty, the algorithm is not in
    /// [`KEY_ALGORITHMS`], the key data is not valid base64, or the base64
    /// payload does not embed the declared algorithm.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let mut tokens = line.split_whitespace();
        let algorithm = tokens
            .next()
            .ok_or_else(|| anyhow::anyhow!("empty public key line"))?;
        anyhow::ensure!(
            KEY_ALGORITHMS.contains(&algorithm),
            "unsupported key algorithm '{algorithm}'"
        );

        let key_data = tokens
            .next()
            .ok_or_else(|| anyhow::anyhow!("public key line has no key data"))?;
        anyhow::ensure!(
            key_data
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "+/=".contains(c)),
            "key data contains invalid characters"
        );
        let blob = BASE64.decode(key_data).context("key data is not base64")?;
        validate_blob_algorithm(&blob, algorithm)?;

        let comment = {
            let rest = tokens.collect::<Vec<_>>().join(" ");
            if rest.is_empty() { None } else { Some(rest) }
        };
        if let Some(c) = &comment {
            anyhow::ensure!(
                !c.chars().any(char::is_control),
                "key comment contains control characters"
            );
        }

        Ok(Self {
            algorithm: algorithm.to_string(),
            key_data: key_data.to_string(),
            comment,
        })
    }

    /// The identity this credential is matched on.
    #[must_use]
    pub fn identity(&self) -> (&str, &str) {
        (&self.algorithm, &self.key_data)
    }

    /// The full line to append to `authorized_keys`, comment included.
    #[must_use]
    pub fn authorized_line(&self) -> String {
        match &self.comment {
            Some(comment) => format!("{} {} {comment}", self.algorithm, self.key_data),
            None => format!("{} {}", self.algorithm, self.key_data),
        }
    }
}

/// Wire-format blobs embed the algorithm name as a length-prefixed string;
/// a mismatch with the declared algorithm means a corrupt or spliced line.
fn validate_blob_algorithm(blob: &[u8], algorithm: &str) -> Result<()> {
    anyhow::ensure!(blob.len() >= 4, "key data too short");
    let len = u32::from_be_bytes([blob[0], blob[1], blob[2], blob[3]]) as usize;
    anyhow::ensure!(
        blob.len() >= 4 + len && blob.get(4..4 + len) == Some(algorithm.as_bytes()),
        "key data does not match declared algorithm '{algorithm}'"
    );
    Ok(())
}

/// Whether `content` (an `authorized_keys` file) already carries `key`.
///
/// Matching is by `(algorithm, key-data)` anywhere on a non-comment line, so
/// entries with different comments or with option prefixes
/// (`command="..." ssh-ed25519 ...`) still count as present.
#[must_use]
pub fn authorized_keys_contains(content: &str, key: &PublicKey) -> bool {
    let (algorithm, key_data) = key.identity();
    content.lines().any(|line| {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return false;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        tokens
            .windows(2)
            .any(|pair| pair[0] == algorithm && pair[1] == key_data)
    })
}

// ── Unit tests ────────────────────────────────────────────────────────────────
