use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;

/// Directories never searched for modules.
const DEFAULT_EXCLUDES: &[&str] = &[
    ".git/",
    "__pycache__/",
    "venv/",
    ".venv/",
    ".tox/",
    ".mypy_cache/",
    ".pytest_cache/",
    "node_modules/",
    "*.egg-info/",
];

pub struct IgnoreFilter {
    inner: Gitignore,
}

impl IgnoreFilter {
    pub fn new(root: &Path, extra_excludes: &[String]) -> Self {
        let mut builder = GitignoreBuilder::new(root);

        // 1. Project .gitignore
        builder.add(root.join(".gitignore"));

        // 2. Defaults
        for pattern in DEFAULT_EXCLUDES {
            builder.add_line(None, pattern).ok();
        }

        // 3. User excludes
        for pattern in extra_excludes {
            if let Err(e) = builder.add_line(None, pattern) {
                tracing::warn!("Ignoring invalid exclude pattern {}: {}", pattern, e);
            }
        }

        Self {
            inner: builder.build().unwrap_or_else(|_| Gitignore::empty()),
        }
    }

    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        self.inner.matched(path, is_dir).is_ignore()
    }
}
