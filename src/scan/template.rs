//! Regex capture substitution into command templates
//!
//! A job's command is a list of tokens. When a path matches the job's pattern,
//! every token is expanded independently against the match's capture groups
//! using the regex crate's replacement syntax:
//!
//! | Token text | Expands to |
//! |------------|------------|
//! | `$1`, `${1}` | text of capture group 1 |
//! | `$0` | the whole match |
//! | `${name}` | named group `(?P<name>...)` |
//! | `$$` | a literal `$` |
//!
//! A reference to a group that does not exist, or did not participate in the
//! match, expands to the empty string. `$1x` is read as the group named `1x`,
//! so write `${1}x` when a reference is followed by word characters.
//!
//! The first expanded token is the program; the rest are its arguments. No
//! shell is involved unless the template names one itself.
//!
//! Patterns run against the raw bytes of the path, so names that are not valid
//! UTF-8 can still match and reach the command unchanged. In the default
//! Unicode mode `.` and character classes only match whole UTF-8 characters;
//! prefix a pattern with `(?-u)` to let them match any byte.

use regex::bytes::Regex;
use std::ffi::OsString;
use std::path::Path;

use super::error::ScanError;
use super::types::JobDescriptor;
use crate::config::ScanJobSpec;

/// A [`ScanJobSpec`] whose pattern has been compiled
#[derive(Debug, Clone)]
pub struct CompiledJob {
    name: String,
    pattern: Regex,
    template: Vec<String>,
}

impl CompiledJob {
    /// Compile the job's pattern and check its template has a program token
    pub fn compile(spec: &ScanJobSpec) -> Result<Self, ScanError> {
        if spec.command.is_empty() {
            return Err(ScanError::EmptyCommand {
                job: spec.name.clone(),
            });
        }

        let pattern = Regex::new(&spec.pattern).map_err(|source| ScanError::InvalidPattern {
            job: spec.name.clone(),
            source,
        })?;

        Ok(Self {
            name: spec.name.clone(),
            pattern,
            template: spec.command.clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve the command for `path`, or `None` when the path does not match
    pub fn render(&self, path: &Path) -> Option<JobDescriptor> {
        let haystack = path.as_os_str().as_encoded_bytes();
        let mut tokens = render_tokens(&self.pattern, haystack, &self.template)?
            .into_iter()
            .map(into_os_string);
        let command = tokens.next()?;

        Some(JobDescriptor {
            command,
            args: tokens.collect(),
            trigger_path: path.to_path_buf(),
        })
    }
}

/// Expand every template token against the first match of `pattern` in `haystack`
pub fn render_tokens(pattern: &Regex, haystack: &[u8], template: &[String]) -> Option<Vec<Vec<u8>>> {
    let captures = pattern.captures(haystack)?;

    let tokens = template
        .iter()
        .map(|token| {
            if !token.contains('$') {
                return token.as_bytes().to_vec();
            }
            let mut expanded = Vec::with_capacity(token.len());
            captures.expand(token.as_bytes(), &mut expanded);
            expanded
        })
        .collect();

    Some(tokens)
}

#[cfg(unix)]
fn into_os_string(bytes: Vec<u8>) -> OsString {
    use std::os::unix::ffi::OsStringExt;
    OsString::from_vec(bytes)
}

#[cfg(not(unix))]
fn into_os_string(bytes: Vec<u8>) -> OsString {
    String::from_utf8_lossy(&bytes).into_owned().into()
}
