//! Module specifier resolution

use super::config::ProjectConfig;
use super::host::SourceHost;
use super::FileId;
use crate::registry::MACRO_MODULE;
use std::path::{Component, Path, PathBuf};

/// Extensions of files the parser accepts
const SOURCE_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".mts", ".cts"];

/// Suffixes tried, in order, after a specifier without a source extension
const CANDIDATE_SUFFIXES: &[&str] = &[
    ".ts",
    ".tsx",
    ".d.ts",
    "/index.ts",
    "/index.tsx",
    "/index.d.ts",
];

/// JavaScript extensions written in imports and the source extension they stand for
const EMITTED_EXTENSIONS: &[(&str, &str)] = &[
    (".js", ".ts"),
    (".jsx", ".tsx"),
    (".mjs", ".mts"),
    (".cjs", ".cts"),
];

/// Lexically normalize a path: drop `.` segments and fold `..` into its parent
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Whether `path` names a TypeScript source file
pub fn is_source_file(path: &Path) -> bool {
    let name = path.to_string_lossy();
    SOURCE_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// Resolves import specifiers to files using a host and project configuration
pub struct ModuleResolver<'a, H: SourceHost + ?Sized> {
    host: &'a H,
    config: &'a ProjectConfig,
}

impl<'a, H: SourceHost + ?Sized> ModuleResolver<'a, H> {
    /// Create a resolver
    pub fn new(host: &'a H, config: &'a ProjectConfig) -> Self {
        Self { host, config }
    }

    /// Resolve `specifier` as written in `importer`.
    ///
    /// Returns `None` for the macro module and for anything that does not
    /// lead to an existing file.
    pub fn resolve(&self, importer: &FileId, specifier: &str) -> Option<FileId> {
        if specifier == MACRO_MODULE {
            return None;
        }

        if is_relative(specifier) {
            let base = importer.as_path().parent().unwrap_or(Path::new(""));
            return self.try_file(&base.join(specifier));
        }
        if specifier.starts_with('/') {
            return self.try_file(Path::new(specifier));
        }

        let alias_root = self.config.base_url.as_ref().unwrap_or(&self.config.root);
        for (pattern, targets) in &self.config.paths {
            let Some(captured) = match_pattern(pattern, specifier) else {
                continue;
            };
            for target in targets {
                let substituted = target.replacen('*', captured, 1);
                if let Some(found) = self.try_file(&alias_root.join(substituted)) {
                    log::trace!("{specifier} -> {found} via paths pattern {pattern}");
                    return Some(found);
                }
            }
        }

        self.config
            .base_url
            .as_ref()
            .and_then(|base| self.try_file(&base.join(specifier)))
    }

    fn try_file(&self, path: &Path) -> Option<FileId> {
        let path = normalize_path(path);
        let text = path.to_string_lossy();

        if is_source_file(&path) && self.host.file_exists(&path) {
            return Some(FileId::from(path.as_path()));
        }
        for (emitted, source) in EMITTED_EXTENSIONS {
            if let Some(stem) = text.strip_suffix(emitted) {
                let candidate = PathBuf::from(format!("{stem}{source}"));
                if self.host.file_exists(&candidate) {
                    return Some(FileId::from(candidate.as_path()));
                }
            }
        }
        CANDIDATE_SUFFIXES
            .iter()
            .map(|suffix| PathBuf::from(format!("{text}{suffix}")))
            .find(|candidate| self.host.file_exists(candidate))
            .map(|candidate| FileId::from(candidate.as_path()))
    }
}

fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

/// Match a `paths` key with at most one `*`, returning the captured text
fn match_pattern<'s>(pattern: &str, specifier: &'s str) -> Option<&'s str> {
    match pattern.split_once('*') {
        Some((prefix, suffix)) => {
            if specifier.len() < prefix.len() + suffix.len() {
                return None;
            }
            specifier.strip_prefix(prefix)?.strip_suffix(suffix)
        }
        None => (pattern == specifier).then_some(""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::config::TsConfig;
    use crate::program::host::MemoryHost;
    use rstest::rstest;

    fn host() -> MemoryHost {
        MemoryHost::new()
            .with_file("/repo/src/index.ts", "")
            .with_file("/repo/src/colors.ts", "")
            .with_file("/repo/src/shared/index.ts", "")
            .with_file("/repo/src/shared/flags.tsx", "")
            .with_file("/repo/lib/util.ts", "")
            .with_file("/repo/types/globals.d.ts", "")
    }

    fn config() -> ProjectConfig {
        let config = TsConfig::parse(
            r#"{ "compilerOptions": { "baseUrl": ".", "paths": { "@shared/*": ["src/shared/*"], "@util": ["lib/util"] } } }"#,
        )
        .unwrap();
        ProjectConfig::new(config, Path::new("/repo"))
    }

    #[rstest]
    #[case("./colors", Some("/repo/src/colors.ts"))]
    #[case("./colors.js", Some("/repo/src/colors.ts"))]
    #[case("./colors.ts", Some("/repo/src/colors.ts"))]
    #[case("./shared", Some("/repo/src/shared/index.ts"))]
    #[case("../lib/util", Some("/repo/lib/util.ts"))]
    #[case("../types/globals", Some("/repo/types/globals.d.ts"))]
    #[case("@shared/flags", Some("/repo/src/shared/flags.tsx"))]
    #[case("@util", Some("/repo/lib/util.ts"))]
    #[case("src/colors", Some("/repo/src/colors.ts"))]
    #[case("./missing", None)]
    #[case("left-pad", None)]
    #[case("@conf-ts/macro", None)]
    fn test_resolve(#[case] specifier: &str, #[case] expected: Option<&str>) {
        let host = host();
        let config = config();
        let resolver = ModuleResolver::new(&host, &config);
        let importer = FileId::new("/repo/src/index.ts");
        assert_eq!(
            resolver.resolve(&importer, specifier),
            expected.map(FileId::new)
        );
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize_path(Path::new("./a.ts")), PathBuf::from("a.ts"));
        assert_eq!(normalize_path(Path::new("../a.ts")), PathBuf::from("../a.ts"));
    }

    #[test]
    fn test_match_pattern() {
        assert_eq!(match_pattern("@app/*", "@app/x/y"), Some("x/y"));
        assert_eq!(match_pattern("*.config", "a.config"), Some("a"));
        assert_eq!(match_pattern("exact", "exact"), Some(""));
        assert_eq!(match_pattern("@app/*", "@other/x"), None);
    }
}
