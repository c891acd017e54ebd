use coldcall_core::paths::CONFIG_FILE;
use std::path::{Path, PathBuf};

/// Resolve the project root directory.
///
/// Priority:
/// 1. `--root` flag / `COLDCALL_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `coldcall.yaml`
/// 3. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_config_dir(&cwd).unwrap_or(cwd)
}

fn find_config_dir(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(CONFIG_FILE).is_file())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_root(Some(dir.path()));
        assert_eq!(result, dir.path());
    }

    #[test]
    fn finds_config_in_ancestor() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "course: econ26\n").unwrap();
        let subdir = dir.path().join("lists/fall");
        std::fs::create_dir_all(&subdir).unwrap();
        assert_eq!(find_config_dir(&subdir).as_deref(), Some(dir.path()));
    }

    #[test]
    fn no_config_found() {
        let dir = TempDir::new().unwrap();
        let subdir = dir.path().join("nested");
        std::fs::create_dir_all(&subdir).unwrap();
        // tempdirs normally live outside any project; an ancestor match would
        // have to be above the tempdir itself
        let found = find_config_dir(&subdir);
        assert!(found.map_or(true, |p| !p.starts_with(dir.path())));
    }
}
