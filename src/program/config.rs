//! `tsconfig.json` loading
//!
//! Only the keys that influence which files make up the program and how
//! imports resolve are read: `compilerOptions.baseUrl`,
//! `compilerOptions.paths`, `files`, `include` and `exclude`.

use super::host::SourceHost;
use super::resolver::normalize_path;
use super::FileId;
use crate::diagnostics::SourceLocation;
use crate::error::{ConfError, ConfResult};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up next to the entry file
pub const CONFIG_FILE_NAME: &str = "tsconfig.json";

/// Default `include` when neither `files` nor `include` is given
const DEFAULT_INCLUDE: &str = "**/*";

/// Raw `tsconfig.json` contents
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TsConfig {
    /// `compilerOptions`
    #[serde(default)]
    pub compiler_options: CompilerOptions,
    /// Explicit root files
    pub files: Option<Vec<String>>,
    /// Root file glob patterns
    pub include: Option<Vec<String>>,
    /// Patterns removed from `include` matches
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// The subset of `compilerOptions` used for module resolution
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    /// Base directory for bare specifiers and `paths` targets
    pub base_url: Option<String>,
    /// Path alias patterns, in declaration order
    #[serde(default)]
    pub paths: IndexMap<String, Vec<String>>,
}

impl TsConfig {
    /// Parse configuration text, tolerating comments and trailing commas
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(&strip_json_comments(text))
    }

    /// Build a configuration from an untyped JSON value
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

/// Configuration with every path made absolute against its directory
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectConfig {
    /// Directory containing the configuration
    pub root: PathBuf,
    /// Resolved `baseUrl`
    pub base_url: Option<PathBuf>,
    /// `paths` patterns and their targets, unresolved
    pub paths: Vec<(String, Vec<String>)>,
    /// Resolved `files`
    pub files: Vec<PathBuf>,
    /// Absolute `include` glob patterns
    pub include: Vec<String>,
    /// Absolute `exclude` glob patterns
    pub exclude: Vec<glob::Pattern>,
}

impl ProjectConfig {
    /// Resolve `config` against the directory it lives in
    pub fn new(config: TsConfig, root: &Path) -> Self {
        let root = normalize_path(root);
        let base_url = config
            .compiler_options
            .base_url
            .as_deref()
            .map(|base| normalize_path(&root.join(base)));
        let include = match (&config.include, &config.files) {
            (Some(include), _) => include.clone(),
            (None, Some(_)) => Vec::new(),
            (None, None) => vec![DEFAULT_INCLUDE.to_string()],
        };

        Self {
            base_url,
            paths: config.compiler_options.paths.into_iter().collect(),
            files: config
                .files
                .unwrap_or_default()
                .iter()
                .map(|file| normalize_path(&root.join(file)))
                .collect(),
            include: include
                .iter()
                .map(|pattern| absolute_pattern(&root, pattern))
                .collect(),
            exclude: config
                .exclude
                .iter()
                .filter_map(|pattern| {
                    glob::Pattern::new(&absolute_pattern(&root, pattern))
                        .inspect_err(|e| log::warn!("Ignoring exclude pattern '{pattern}': {e}"))
                        .ok()
                })
                .collect(),
            root,
        }
    }

    /// Configuration used when no tsconfig is present: no roots besides the
    /// entry, relative imports only
    pub fn detached(root: &Path) -> Self {
        Self {
            root: normalize_path(root),
            base_url: None,
            paths: Vec::new(),
            files: Vec::new(),
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }

    /// Locate and load the nearest `tsconfig.json` above `entry`
    pub fn discover<H: SourceHost + ?Sized>(host: &H, entry: &Path) -> ConfResult<Option<Self>> {
        let Some(path) = find_config_file(host, entry) else {
            return Ok(None);
        };
        log::debug!("Using configuration {}", path.display());
        let text = host.read_file(&path)?;
        let config = TsConfig::parse(&text).map_err(|e| ConfError::Parse {
            message: e.to_string(),
            location: SourceLocation::file(FileId::from(path.as_path())),
        })?;
        let root = path.parent().unwrap_or(Path::new(""));
        Ok(Some(Self::new(config, root)))
    }

    /// Like [`discover`](Self::discover), but a missing configuration is an error
    pub fn require<H: SourceHost + ?Sized>(host: &H, entry: &Path) -> ConfResult<Self> {
        Self::discover(host, entry)?.ok_or_else(|| ConfError::ConfigurationMissing {
            location: SourceLocation::file_start(FileId::from(entry)),
        })
    }

    /// Whether an `exclude` pattern or a `node_modules` segment rules out `path`
    pub fn is_excluded(&self, path: &Path) -> bool {
        path.components().any(|c| c.as_os_str() == "node_modules")
            || self.exclude.iter().any(|pattern| {
                pattern.matches_path(path)
                    || path
                        .ancestors()
                        .skip(1)
                        .any(|ancestor| pattern.matches_path(ancestor))
            })
    }
}

/// Walk up from the entry's directory looking for a configuration file
pub fn find_config_file<H: SourceHost + ?Sized>(host: &H, entry: &Path) -> Option<PathBuf> {
    let entry = normalize_path(entry);
    entry
        .ancestors()
        .skip(1)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| host.file_exists(candidate))
}

fn absolute_pattern(root: &Path, pattern: &str) -> String {
    let joined = normalize_path(&root.join(pattern));
    let mut pattern = joined.to_string_lossy().into_owned();
    // a bare directory includes everything below it
    let last = pattern.rsplit('/').next().unwrap_or_default();
    if !last.contains(['*', '?', '.']) {
        pattern.push_str("/**/*");
    }
    pattern
}

/// Remove `//` and `/* */` comments and trailing commas outside of strings
pub fn strip_json_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut previous = '\0';
                for next in chars.by_ref() {
                    if previous == '*' && next == '/' {
                        break;
                    }
                    if next == '\n' {
                        out.push('\n');
                    }
                    previous = next;
                }
            }
            '}' | ']' => {
                let trimmed = out.trim_end_matches(char::is_whitespace).len();
                if out[..trimmed].ends_with(',') {
                    out.remove(trimmed - 1);
                }
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::program::host::MemoryHost;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strip_json_comments() {
        let text = r#"{
            // line comment
            "a": "http://not-a-comment", /* block */
            "b": [1, 2,],
        }"#;
        let value: serde_json::Value = serde_json::from_str(&strip_json_comments(text)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "a": "http://not-a-comment", "b": [1, 2] })
        );
    }

    #[test]
    fn test_project_config_resolves_paths() {
        let config = TsConfig::parse(
            r#"{
                "compilerOptions": { "baseUrl": "./src", "paths": { "@shared/*": ["shared/*"] } },
                "include": ["src"],
                "exclude": ["src/legacy"]
            }"#,
        )
        .unwrap();
        let project = ProjectConfig::new(config, Path::new("/repo"));
        assert_eq!(project.base_url, Some(PathBuf::from("/repo/src")));
        assert_eq!(project.paths[0].0, "@shared/*");
        assert_eq!(project.include, vec!["/repo/src/**/*".to_string()]);
        assert!(project.is_excluded(Path::new("/repo/src/legacy/old.ts")));
        assert!(project.is_excluded(Path::new("/repo/node_modules/x/index.ts")));
        assert!(!project.is_excluded(Path::new("/repo/src/index.ts")));
    }

    #[test]
    fn test_files_disable_default_include() {
        let config = TsConfig::parse(r#"{ "files": ["main.ts"] }"#).unwrap();
        let project = ProjectConfig::new(config, Path::new("/repo"));
        assert_eq!(project.files, vec![PathBuf::from("/repo/main.ts")]);
        assert!(project.include.is_empty());
    }

    #[test]
    fn test_discover_walks_up() {
        let host = MemoryHost::new()
            .with_file("/repo/tsconfig.json", "{}")
            .with_file("/repo/config/deep/app.ts", "");
        let project = ProjectConfig::require(&host, Path::new("/repo/config/deep/app.ts")).unwrap();
        assert_eq!(project.root, PathBuf::from("/repo"));
        assert_eq!(project.include, vec!["/repo/**/*".to_string()]);
    }

    #[test]
    fn test_missing_config() {
        let host = MemoryHost::new().with_file("/repo/app.ts", "");
        let err = ProjectConfig::require(&host, Path::new("/repo/app.ts")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigurationMissing);
        assert_eq!(err.file().as_str(), "/repo/app.ts");
    }
}
