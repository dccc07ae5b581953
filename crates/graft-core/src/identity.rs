//! Capturing, impersonating, and restoring the host's author identity.
//!
//! With identity preservation on, the host's `user.email`/`user.name` are
//! overwritten before each apply so the recorded committer matches the
//! original author. [`capture`] must run before the first [`impersonate`],
//! and [`restore`] exactly once when the session ends, whichever way it ends.

use graft_git::{HostOps, Identity, SourceOps};
use tracing::debug;

use crate::error::Result;

/// Config key for the author email.
pub const EMAIL_KEY: &str = "user.email";

/// Config key for the author name.
pub const NAME_KEY: &str = "user.name";

/// Read the host's currently configured identity. No side effects.
///
/// # Errors
/// Returns error if git config cannot be read.
pub fn capture<H: HostOps>(host: &H) -> Result<Identity> {
    Ok(Identity {
        email: host.config_get(EMAIL_KEY)?,
        name: host.config_get(NAME_KEY)?,
    })
}

/// Configure the host with the author of `commit` from the external repository.
///
/// Returns the identity that was written.
///
/// # Errors
/// Returns error if the author cannot be read or the config cannot be written.
pub fn impersonate<S: SourceOps, H: HostOps>(
    source: &S,
    host: &H,
    commit: &str,
) -> Result<Identity> {
    let author = source.commit_author(commit)?;
    debug!(commit, email = ?author.email, "impersonating author");
    write(host, &author)?;
    Ok(author)
}

/// Write a previously captured identity back. Unset keys are removed.
///
/// # Errors
/// Returns error if the config cannot be written.
pub fn restore<H: HostOps>(host: &H, identity: &Identity) -> Result<()> {
    debug!(email = ?identity.email, "restoring identity");
    write(host, identity)
}

fn write<H: HostOps>(host: &H, identity: &Identity) -> Result<()> {
    for (key, value) in [(EMAIL_KEY, &identity.email), (NAME_KEY, &identity.name)] {
        match value {
            Some(value) => host.config_set(key, value)?,
            None => host.config_unset(key)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_mocks::{MockHost, MockSource};

    #[test]
    fn test_capture_reads_config() {
        let host = MockHost::new().with_identity("host@example.com", "Host");
        assert_eq!(
            capture(&host).unwrap(),
            Identity::new("host@example.com", "Host")
        );
        assert!(host.ops().is_empty());
    }

    #[test]
    fn test_capture_unset_identity() {
        let host = MockHost::new();
        assert_eq!(capture(&host).unwrap(), Identity::default());
    }

    #[test]
    fn test_impersonate_writes_author() {
        let source = MockSource::new().with_authored_commit(
            "abc1234",
            "",
            Identity::new("ada@example.com", "Ada"),
        );
        let host = MockHost::new().with_identity("host@example.com", "Host");

        let written = impersonate(&source, &host, "abc1234").unwrap();

        assert_eq!(written, Identity::new("ada@example.com", "Ada"));
        assert_eq!(capture(&host).unwrap(), written);
    }

    #[test]
    fn test_restore_roundtrip() {
        let source = MockSource::new().with_authored_commit(
            "abc1234",
            "",
            Identity::new("ada@example.com", "Ada"),
        );
        let host = MockHost::new().with_identity("host@example.com", "Host");

        let original = capture(&host).unwrap();
        impersonate(&source, &host, "abc1234").unwrap();
        restore(&host, &original).unwrap();

        assert_eq!(capture(&host).unwrap(), original);
    }

    #[test]
    fn test_restore_unsets_missing_keys() {
        let source = MockSource::new().with_authored_commit(
            "abc1234",
            "",
            Identity::new("ada@example.com", "Ada"),
        );
        let host = MockHost::new();

        let original = capture(&host).unwrap();
        impersonate(&source, &host, "abc1234").unwrap();
        restore(&host, &original).unwrap();

        assert_eq!(capture(&host).unwrap(), Identity::default());
    }
}
