//! requirements.txt parser
//!
//! Handles:
//! - one requirement per line, `#` comments and blank lines
//! - `\` line continuations
//! - pip options (`-r`, `-e`, `--index-url`, ...) which are skipped
//! - bare URLs and local paths which are skipped

use crate::domain::Dependency;
use crate::error::ManifestError;
use crate::manifest::requirement::parse_requirement;
use crate::manifest::ManifestParser;
use std::path::Path;
use tracing::{debug, warn};

/// Parser for pip requirements files
pub struct RequirementsTxtParser;

impl RequirementsTxtParser {
    /// Join continuation lines, returning (first line number, logical line)
    fn logical_lines(content: &str) -> Vec<(usize, String)> {
        let mut lines = Vec::new();
        let mut current: Option<(usize, String)> = None;

        for (index, raw) in content.lines().enumerate() {
            let number = index + 1;
            let (start, mut text) = current.take().unwrap_or((number, String::new()));

            match raw.strip_suffix('\\') {
                Some(head) => {
                    text.push_str(head);
                    current = Some((start, text));
                }
                None => {
                    text.push_str(raw);
                    lines.push((start, text));
                }
            }
        }

        if let Some(last) = current {
            lines.push(last);
        }
        lines
    }

    /// Remove a trailing comment (`#` at line start or after whitespace)
    fn strip_comment(line: &str) -> &str {
        if line.trim_start().starts_with('#') {
            return "";
        }
        let bytes = line.as_bytes();
        for (i, b) in bytes.iter().enumerate() {
            if *b == b'#' && i > 0 && bytes[i - 1].is_ascii_whitespace() {
                return &line[..i];
            }
        }
        line
    }

    /// Drop per-requirement options such as `--hash=...`
    fn strip_options(line: &str) -> &str {
        match line.find(" --") {
            Some(pos) => &line[..pos],
            None => line,
        }
    }

    /// Lines without a name in front of `@` (VCS URLs, archives, local paths)
    fn is_path_or_url(line: &str) -> bool {
        let head = line.split('@').next().unwrap_or(line);
        head.contains("://") || line.starts_with('.') || line.starts_with('/')
    }
}

impl ManifestParser for RequirementsTxtParser {
    fn parse(&self, content: &str, path: &Path) -> Result<Vec<Dependency>, ManifestError> {
        let mut dependencies = Vec::new();

        for (number, line) in Self::logical_lines(content) {
            let text = Self::strip_options(Self::strip_comment(&line)).trim();
            if text.is_empty() {
                continue;
            }

            if text.starts_with('-') {
                debug!(line = number, option = text, "skipping pip option");
                continue;
            }

            if Self::is_path_or_url(text) {
                warn!(line = number, entry = text, "skipping requirement without a package name");
                continue;
            }

            match parse_requirement(text) {
                Ok(Some(dep)) => dependencies.push(dep.at_line(number)),
                Ok(None) => {}
                Err(message) => {
                    return Err(ManifestError::parse_error(path, number, text, message));
                }
            }
        }

        Ok(dependencies)
    }

    fn name(&self) -> &'static str {
        "requirements.txt"
    }
}
