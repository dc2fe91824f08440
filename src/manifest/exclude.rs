use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Path patterns kept out of generated manifests.
///
/// Rules are matched against the path below the walked root, with `/`
/// separators and a leading `/`, so `/weights/` catches a top-level
/// `weights/` directory but never a directory above the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionRules {
    /// A path is excluded if it ends with any of these
    #[serde(default = "default_suffixes")]
    pub suffixes: Vec<String>,
    /// A path is excluded if it contains any of these
    #[serde(default = "default_substrings")]
    pub substrings: Vec<String>,
}

impl Default for ExclusionRules {
    fn default() -> Self {
        Self {
            suffixes: default_suffixes(),
            substrings: default_substrings(),
        }
    }
}

fn default_suffixes() -> Vec<String> {
    vec![".gitignore".to_string(), ".git".to_string()]
}

fn default_substrings() -> Vec<String> {
    vec!["/weights/".to_string()]
}

impl ExclusionRules {
    /// Rules that exclude nothing
    #[must_use]
    pub const fn none() -> Self {
        Self {
            suffixes: Vec::new(),
            substrings: Vec::new(),
        }
    }

    /// Whether `path` matches any suffix or substring rule
    #[must_use]
    pub fn is_excluded(&self, path: &str) -> bool {
        self.suffixes.iter().any(|s| path.ends_with(s.as_str()))
            || self.substrings.iter().any(|s| path.contains(s.as_str()))
    }

    /// [`Self::is_excluded`] for a file found by walking `root`
    #[must_use]
    pub fn excludes_path(&self, path: &Path, root: &Path) -> bool {
        self.is_excluded(&format!("/{}", super::record_path(path, root)))
    }

    /// Split `files` found under `root` into kept paths (order preserved) and
    /// the number excluded
    #[must_use]
    pub fn partition(&self, files: Vec<PathBuf>, root: &Path) -> (Vec<PathBuf>, usize) {
        let total = files.len();
        let kept: Vec<PathBuf> = files
            .into_iter()
            .filter(|f| !self.excludes_path(f, root))
            .collect();
        let excluded = total - kept.len();
        (kept, excluded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("assets/.gitignore", true)]
    #[case("assets/.git", true)]
    #[case("assets/sub/.git", true)]
    #[case("assets/weights/model.pt", true)]
    #[case("/abs/root/weights/x.bin", true)]
    #[case("assets/a.txt", false)]
    #[case("assets/.github/workflow.yml", false)]
    #[case("assets/myweights/x.bin", false)]
    #[case("assets/.git/HEAD", false)]
    fn test_default_rules(#[case] path: &str, #[case] excluded: bool) {
        assert_eq!(ExclusionRules::default().is_excluded(path), excluded);
    }

    #[test]
    fn test_none_excludes_nothing() {
        let rules = ExclusionRules::none();
        assert!(!rules.is_excluded(".git"));
        assert!(!rules.is_excluded("a/weights/b"));
    }

    #[test]
    fn test_custom_rules() {
        let rules = ExclusionRules {
            suffixes: vec![".tmp".to_string()],
            substrings: vec!["/cache/".to_string()],
        };
        assert!(rules.is_excluded("x/y.tmp"));
        assert!(rules.is_excluded("x/cache/y"));
        assert!(!rules.is_excluded("x/.git"));
    }

    #[test]
    fn test_partition_preserves_order() {
        let files = vec![
            PathBuf::from("r/b.txt"),
            PathBuf::from("r/.git"),
            PathBuf::from("r/a.txt"),
            PathBuf::from("r/weights/w.bin"),
        ];
        let (kept, excluded) = ExclusionRules::default().partition(files, Path::new("r"));
        assert_eq!(kept, vec![PathBuf::from("r/b.txt"), PathBuf::from("r/a.txt")]);
        assert_eq!(excluded, 2);
    }

    #[test]
    fn test_directories_above_root_are_ignored() {
        let rules = ExclusionRules::default();
        let root = Path::new("/data/weights/v1");

        assert!(!rules.excludes_path(&root.join("a.txt"), root));
        assert!(!rules.excludes_path(&root.join("sub/b.txt"), root));
        assert!(rules.excludes_path(&root.join("weights/w.bin"), root));
        assert!(rules.excludes_path(&root.join("sub/.git"), root));
    }

    #[test]
    fn test_top_level_directory_matches_leading_slash_rule() {
        let rules = ExclusionRules::default();
        let root = Path::new("assets");

        assert!(rules.excludes_path(Path::new("assets/weights/model.pt"), root));
        assert!(!rules.excludes_path(Path::new("assets/weightsfile.txt"), root));
        assert!(rules.excludes_path(Path::new("assets/.gitignore"), root));
    }

    #[test]
    fn test_rules_from_toml_fill_defaults() {
        let rules: ExclusionRules = toml::from_str("suffixes = [\".lock\"]").unwrap();
        assert_eq!(rules.suffixes, vec![".lock".to_string()]);
        assert_eq!(rules.substrings, default_substrings());
    }
}
