//! Relocating file paths inside patch text.
//!
//! Patches are generated with [`SRC_PLACEHOLDER`] and [`DST_PLACEHOLDER`] as
//! the "before" and "after" path roots instead of git's `a/` and `b/`, so
//! that every path reference can be found without parsing the diff. The
//! rewriter then applies five line-anchored [`RewriteRule`]s, each inserting
//! the target directory right after the placeholder root (or after the
//! directive keyword for copy/rename lines, which carry bare paths).
//!
//! Patch text is handled as bytes. Only the matched lines are touched; hunk
//! content passes through byte for byte whatever its encoding. A filename
//! that itself contains a placeholder token is not defended against.

use std::borrow::Cow;

use bstr::ByteSlice;

use crate::patch::Patch;

/// Root standing in for the "before" side of every path.
pub const SRC_PLACEHOLDER: &str = "COMPARE_A";

/// Root standing in for the "after" side of every path.
pub const DST_PLACEHOLDER: &str = "COMPARE_B";

const DIFF_GIT: &[u8] = b"diff --git ";

/// One substitution, anchored to a specific patch construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteRule {
    /// `--- COMPARE_A/x` and `+++ COMPARE_B/x` file headers.
    HeaderMarker,
    /// The "before" path on a `diff --git` line.
    DiffSource,
    /// The "after" path on a `diff --git` line.
    DiffDestination,
    /// `copy from x` / `copy to x`.
    CopyDirective,
    /// `rename from x` / `rename to x`.
    RenameDirective,
}

impl RewriteRule {
    /// Every rule, in application order.
    pub const ALL: [Self; 5] = [
        Self::HeaderMarker,
        Self::DiffSource,
        Self::DiffDestination,
        Self::CopyDirective,
        Self::RenameDirective,
    ];

    /// Rewrite a single line (without its line terminator).
    ///
    /// Returns `None` when the rule does not match the line.
    #[must_use]
    pub fn apply(self, line: &[u8], target: &str) -> Option<Vec<u8>> {
        match self {
            Self::HeaderMarker => {
                let is_marker = line.len() > 4
                    && line[..3].iter().all(|b| matches!(b, b'-' | b'+'))
                    && line[3] == b' ';
                if !is_marker {
                    return None;
                }
                let at = placeholder_end(line, 4, &[SRC_PLACEHOLDER, DST_PLACEHOLDER])?;
                Some(insert_dir(line, at, target))
            }
            Self::DiffSource => {
                if !line.starts_with(DIFF_GIT) {
                    return None;
                }
                let at = placeholder_end(line, DIFF_GIT.len(), &[SRC_PLACEHOLDER])?;
                Some(insert_dir(line, at, target))
            }
            Self::DiffDestination => {
                let paths = line.strip_prefix(DIFF_GIT)?;
                // A line that opens with the "after" root has no "before"
                // path in front of it; leave it alone.
                if paths
                    .trim_start_with(|c| c == '"')
                    .starts_with(DST_PLACEHOLDER.as_bytes())
                {
                    return None;
                }
                let at = DIFF_GIT.len() + last_destination_end(paths)?;
                Some(insert_dir(line, at, target))
            }
            Self::CopyDirective => directive(line, &["copy from ", "copy to "], target),
            Self::RenameDirective => directive(line, &["rename from ", "rename to "], target),
        }
    }
}

/// Byte offset just past a placeholder found at `start` (after an optional
/// opening quote).
fn placeholder_end(line: &[u8], start: usize, placeholders: &[&str]) -> Option<usize> {
    let rest = line.get(start..)?;
    let (quote, rest) = match rest.strip_prefix(b"\"") {
        Some(unquoted) => (1, unquoted),
        None => (0, rest),
    };

    placeholders
        .iter()
        .find(|p| rest.starts_with(p.as_bytes()))
        .map(|p| start + quote + p.len())
}

/// Byte offset just past the last ` COMPARE_B` / ` "COMPARE_B` in `paths`
/// that is preceded by at least one byte.
fn last_destination_end(paths: &[u8]) -> Option<usize> {
    let plain = format!(" {DST_PLACEHOLDER}");
    let quoted = format!(" \"{DST_PLACEHOLDER}");

    [plain, quoted]
        .iter()
        .filter_map(|needle| {
            paths
                .rfind(needle)
                .filter(|&start| start > 0)
                .map(|start| start + needle.len())
        })
        .max()
}

fn insert_dir(line: &[u8], at: usize, target: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(line.len() + target.len() + 1);
    out.extend_from_slice(&line[..at]);
    out.push(b'/');
    out.extend_from_slice(target.as_bytes());
    out.extend_from_slice(&line[at..]);
    out
}

fn directive(line: &[u8], keywords: &[&str], target: &str) -> Option<Vec<u8>> {
    let keyword = keywords.iter().find(|k| line.starts_with(k.as_bytes()))?;
    let mut at = keyword.len();
    if line[at..].starts_with(b"\"") {
        at += 1;
    }

    let mut out = Vec::with_capacity(line.len() + target.len() + 1);
    out.extend_from_slice(&line[..at]);
    out.extend_from_slice(target.as_bytes());
    out.push(b'/');
    out.extend_from_slice(&line[at..]);
    Some(out)
}

/// Relocates every path in a patch under a target directory.
#[derive(Debug, Clone)]
pub struct PathRewriter {
    target: String,
}

impl PathRewriter {
    /// Create a rewriter for `target`, a directory relative to the git root.
    ///
    /// Backslashes are normalized to `/` and surrounding slashes dropped.
    #[must_use]
    pub fn new(target: &str) -> Self {
        let target = target.replace('\\', "/");
        Self {
            target: target.trim_matches('/').to_string(),
        }
    }

    /// The normalized target directory.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Rewrite one line (without its terminator) through every rule in order.
    #[must_use]
    pub fn rewrite_line<'a>(&self, line: &'a [u8]) -> Cow<'a, [u8]> {
        let mut current = Cow::Borrowed(line);
        for rule in RewriteRule::ALL {
            if let Some(rewritten) = rule.apply(&current, &self.target) {
                current = Cow::Owned(rewritten);
            }
        }
        current
    }

    /// Rewrite a whole patch body, preserving line terminators.
    #[must_use]
    pub fn rewrite_text(&self, text: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(text.len() + 64);
        for chunk in text.lines_with_terminator() {
            let (line, eol) = split_terminator(chunk);
            out.extend_from_slice(&self.rewrite_line(line));
            out.extend_from_slice(eol);
        }
        out
    }

    /// Rewrite a patch, keeping its mode.
    #[must_use]
    pub fn rewrite(&self, patch: Patch) -> Patch {
        let text = self.rewrite_text(patch.text());
        patch.with_text(text)
    }
}

fn split_terminator(chunk: &[u8]) -> (&[u8], &[u8]) {
    if let Some(line) = chunk.strip_suffix(b"\r\n") {
        (line, b"\r\n".as_slice())
    } else if let Some(line) = chunk.strip_suffix(b"\n") {
        (line, b"\n".as_slice())
    } else {
        (chunk, b"".as_slice())
    }
}
