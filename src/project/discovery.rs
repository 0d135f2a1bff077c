//! Discovery of packages and modules in a project directory
//!
//! Every directory holding at least one eligible file becomes a package,
//! named by its path relative to the project root. Files directly in the
//! root belong to a package named after the root directory.

use super::{ModuleSource, Project};
use crate::ignore::IgnoreFilter;
use crate::object::ObjectId;
use crate::{Error, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Leading segment stripped from package names of a "src layout" project.
const SOURCE_DIR_PREFIX: &str = "src.";

/// Package name of `dir` relative to `root`
pub fn package_name(root: &Path, dir: &Path) -> String {
    let relative = dir.strip_prefix(root).unwrap_or(dir);
    let segments: Vec<String> = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();

    if segments.is_empty() {
        return root_package_name(root);
    }

    let name = segments.join(".");
    match name.strip_prefix(SOURCE_DIR_PREFIX) {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}

fn root_package_name(root: &Path) -> String {
    let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    root.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "root".to_string())
}

impl Project {
    /// Add the packages and modules found under `root`.
    ///
    /// A module whose full name equals a package's (`pkg/sub.py` next to
    /// `pkg/sub/`) is shadowed by that package and skipped.
    pub(super) fn discover(&mut self, root: &Path) -> Result<()> {
        if !root.is_dir() {
            return Err(Error::InvalidRoot(root.display().to_string()));
        }

        let files = self.eligible_files(root);
        let package_names: HashSet<String> = files
            .iter()
            .filter_map(|path| path.parent())
            .map(|dir| package_name(root, dir))
            .collect();

        let mut current: Option<(PathBuf, ObjectId)> = None;
        for path in files {
            let (Some(dir), Some(stem)) = (path.parent(), path.file_stem()) else {
                continue;
            };

            let package = match &current {
                Some((current_dir, id)) if current_dir == dir => *id,
                _ => {
                    let name = package_name(root, dir);
                    debug!("Package {} at {}", name, dir.display());
                    let id = if is_root_dir(root, dir) {
                        self.add_root_package(&name)
                    } else {
                        self.add_package(&name)
                    };
                    current = Some((dir.to_path_buf(), id));
                    id
                }
            };

            let stem = stem.to_string_lossy();
            let full_name = format!("{}.{}", self.graph[package].full_name, stem);
            if package_names.contains(&full_name) {
                warn!("Skipping module {}: shadowed by package {}", path.display(), full_name);
                continue;
            }
            self.add_module(package, &stem, ModuleSource::File(path.clone()));
        }

        if self.modules.is_empty() {
            return Err(Error::NoSourceFiles(root.display().to_string()));
        }
        info!("Discovered {} modules", self.modules.len());
        Ok(())
    }

    /// Eligible files below `root`, each directory's files before its
    /// subdirectories.
    fn eligible_files(&self, root: &Path) -> Vec<PathBuf> {
        let filter = IgnoreFilter::new(root, &self.settings.exclude);
        let walker = WalkDir::new(root)
            .sort_by(|a, b| {
                a.file_type()
                    .is_dir()
                    .cmp(&b.file_type().is_dir())
                    .then_with(|| a.file_name().cmp(b.file_name()))
            })
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0 || !filter.is_ignored(entry.path(), entry.file_type().is_dir())
            });

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if entry.file_type().is_file() && self.adapter.is_eligible(entry.path()) {
                files.push(entry.into_path());
            }
        }
        files
    }
}

fn is_root_dir(root: &Path, dir: &Path) -> bool {
    dir.strip_prefix(root)
        .map(|relative| relative.as_os_str().is_empty())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn full_names(project: &Project) -> Vec<String> {
        project.graph().full_names().map(str::to_string).collect()
    }

    #[test]
    fn test_package_name() {
        let root = Path::new("/work/project");
        assert_eq!(package_name(root, Path::new("/work/project/pkg/sub")), "pkg.sub");
        assert_eq!(package_name(root, Path::new("/work/project/src/pkg")), "pkg");
        assert_eq!(package_name(root, Path::new("/work/project/src")), "src");
        assert_eq!(package_name(root, Path::new("/work/project/tests/src/x")), "tests.src.x");
        assert_eq!(package_name(root, root), "project");
    }

    #[test]
    fn test_discover_packages_and_modules() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "pkg/sub/deep.py", "");
        write(dir.path(), "pkg/b.py", "");
        write(dir.path(), "pkg/__init__.py", "");
        write(dir.path(), "pkg/notes.txt", "");
        write(dir.path(), "empty/README.md", "");

        let project = Project::from_directory(dir.path(), Settings::default()).unwrap();
        assert_eq!(
            full_names(&project),
            vec!["pkg", "pkg.__init__", "pkg.b", "pkg.sub", "pkg.sub.deep"]
        );
        assert_eq!(project.module_count(), 3);
    }

    #[test]
    fn test_setup_py_is_excluded() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "setup.py", "");
        write(dir.path(), "pkg/logic.py", "");

        let project = Project::from_directory(dir.path(), Settings::default()).unwrap();
        assert_eq!(full_names(&project), vec!["pkg", "pkg.logic"]);
    }

    #[test]
    fn test_root_files_use_root_name() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("mini");
        write(&root, "main.py", "");

        let project = Project::from_directory(&root, Settings::default()).unwrap();
        assert_eq!(full_names(&project), vec!["mini", "mini.main"]);
    }

    #[test]
    fn test_src_layout() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/app/core.py", "");

        let project = Project::from_directory(dir.path(), Settings::default()).unwrap();
        assert_eq!(full_names(&project), vec!["app", "app.core"]);
    }

    #[test]
    fn test_ignored_directories() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "pkg/logic.py", "");
        write(dir.path(), ".venv/lib/site.py", "");
        write(dir.path(), "pkg/__pycache__/cached.py", "");
        write(dir.path(), "docs/conf.py", "");

        let settings = Settings {
            exclude: vec!["docs/".to_string()],
            ..Settings::default()
        };
        let project = Project::from_directory(dir.path(), settings).unwrap();
        assert_eq!(full_names(&project), vec!["pkg", "pkg.logic"]);
    }

    #[test]
    fn test_no_source_files() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "setup.py", "");
        write(dir.path(), "README.md", "");

        let result = Project::from_directory(dir.path(), Settings::default());
        assert!(matches!(result, Err(Error::NoSourceFiles(_))));
    }

    #[test]
    fn test_invalid_root() {
        let dir = TempDir::new().unwrap();
        let result = Project::from_directory(&dir.path().join("missing"), Settings::default());
        assert!(matches!(result, Err(Error::InvalidRoot(_))));
    }

    #[test]
    fn test_package_shadows_module_of_same_name() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "pkg/sub.py", "def helper():\n    other()\n\ndef other():\n    pass\n");
        write(dir.path(), "pkg/sub/helper.py", "X = 1\n");
        write(dir.path(), "pkg/core.py", "");

        let project = Project::from_directory(dir.path(), Settings::default()).unwrap();
        assert_eq!(
            full_names(&project),
            vec!["pkg", "pkg.core", "pkg.sub", "pkg.sub.helper"]
        );
        let sub = project.graph().find("pkg.sub").unwrap();
        assert_eq!(sub.kind, crate::object::ObjectKind::Package);
        assert_eq!(project.module_count(), 2);
    }

    #[test]
    fn test_root_package_is_not_test_code() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("test_utils");
        write(&root, "main.py", "");
        write(&root, "tests/test_main.py", "");

        let settings = Settings {
            determine_test_types: true,
            ..Settings::default()
        };
        let project = Project::from_directory(&root, settings).unwrap();
        let graph = project.graph();
        let package = graph.find("test_utils").unwrap();
        assert!(!package.is_test_object);
        assert_eq!(package.test_type, None);
        assert_eq!(graph.find("test_utils.main").unwrap().label(), "module");
        assert!(graph.find("tests").unwrap().is_test_object);
    }
}
