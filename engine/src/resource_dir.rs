use std::env;
use std::path::{Path, PathBuf};

/// Parent levels above the executable that are searched.
const MAX_PARENT_LEVELS: usize = 3;

/// Finds a directory called `name` next to the working directory or next to
/// the executable (or up to three levels above it).
///
/// Falls back to the relative `name` so later loads report the missing file.
pub fn locate(name: &str) -> PathBuf {
    let cwd = env::current_dir().ok();
    let exe_dir = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    search(name, cwd.as_deref(), exe_dir.as_deref()).unwrap_or_else(|| PathBuf::from(name))
}

fn search(name: &str, cwd: Option<&Path>, exe_dir: Option<&Path>) -> Option<PathBuf> {
    let from_cwd = cwd.map(|dir| dir.join(name));
    let from_exe = exe_dir
        .into_iter()
        .flat_map(|dir| dir.ancestors().take(MAX_PARENT_LEVELS + 1))
        .map(|dir| dir.join(name));
    from_cwd.into_iter().chain(from_exe).find(|candidate| candidate.is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn prefers_working_directory() {
        let cwd = tempfile::tempdir().unwrap();
        let exe = tempfile::tempdir().unwrap();
        fs::create_dir(cwd.path().join("resources")).unwrap();
        fs::create_dir(exe.path().join("resources")).unwrap();

        let found = search("resources", Some(cwd.path()), Some(exe.path()));
        assert_eq!(found, Some(cwd.path().join("resources")));
    }

    #[test]
    fn walks_up_from_executable() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("resources")).unwrap();
        let exe_dir = root.path().join("target").join("debug");
        fs::create_dir_all(&exe_dir).unwrap();

        let found = search("resources", None, Some(&exe_dir));
        assert_eq!(found, Some(root.path().join("resources")));
    }

    #[test]
    fn stops_after_three_levels() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("resources")).unwrap();
        let exe_dir = root.path().join("a").join("b").join("c").join("d");
        fs::create_dir_all(&exe_dir).unwrap();

        assert_eq!(search("resources", None, Some(&exe_dir)), None);
    }
}
