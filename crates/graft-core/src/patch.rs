//! Turning one external commit into patch text.

use graft_git::SourceOps;

use crate::error::Result;
use crate::rewrite::{DST_PLACEHOLDER, SRC_PLACEHOLDER};

/// How a patch was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchMode {
    /// Full diff of the commit against its first parent, plus the git version.
    Flattened,
    /// `git format-patch` output for the single commit.
    Standard,
}

impl PatchMode {
    /// The mode matching a `flatten` flag.
    #[must_use]
    pub const fn from_flatten(flatten: bool) -> Self {
        if flatten {
            Self::Flattened
        } else {
            Self::Standard
        }
    }
}

/// Raw patch bytes for one commit, tagged with how it was produced.
///
/// Patches are kept as bytes: the diff carries file content verbatim and
/// that content is not necessarily UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    mode: PatchMode,
    text: Vec<u8>,
}

impl Patch {
    /// Wrap patch text.
    #[must_use]
    pub const fn new(mode: PatchMode, text: Vec<u8>) -> Self {
        Self { mode, text }
    }

    /// How the patch was produced.
    #[must_use]
    pub const fn mode(&self) -> PatchMode {
        self.mode
    }

    /// The patch body.
    #[must_use]
    pub fn text(&self) -> &[u8] {
        &self.text
    }

    /// Replace the body, keeping the mode.
    #[must_use]
    pub fn with_text(self, text: Vec<u8>) -> Self {
        Self { text, ..self }
    }
}

/// Generate the patch for `commit` from the external repository.
///
/// Both modes use the placeholder prefixes so the rewriter can find every
/// path. Flattened patches end with the git version as a mail signature,
/// which `git am` needs to know the diff dialect.
///
/// # Errors
/// Returns error if any git query fails.
pub fn generate<S: SourceOps>(source: &S, commit: &str, mode: PatchMode) -> Result<Patch> {
    let src_prefix = format!("{SRC_PLACEHOLDER}/");
    let dst_prefix = format!("{DST_PLACEHOLDER}/");

    let text = match mode {
        PatchMode::Standard => source.format_patch(commit, &src_prefix, &dst_prefix)?,
        PatchMode::Flattened => {
            let diff = source.first_parent_diff(commit, &src_prefix, &dst_prefix)?;
            let version = source.git_version()?;
            let mut text = diff;
            text.extend_from_slice(b"\n--\n");
            text.extend_from_slice(version.as_bytes());
            text
        }
    };

    Ok(Patch::new(mode, text))
}
