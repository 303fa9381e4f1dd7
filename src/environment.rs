//! Resolution of the invoking user, their home, and the provisioning root.
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::CONFIG_FILE;
use crate::error::PreconditionError;

/// Who the run is for and where its inputs live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunEnvironment {
    /// Login name of the invoking (non-root) user.
    pub user: String,
    /// The user's home directory.
    pub home: PathBuf,
    /// Directory holding `setup.toml` and the dotfiles tree.
    pub root: PathBuf,
}

impl RunEnvironment {
    /// Resolve from the process environment.
    ///
    /// `root_override` is the `--root` / `SETUP_ROOT` value, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`PreconditionError`] when the user is root or unknown, the
    /// home directory is missing, or no provisioning root can be found.
    pub fn resolve(root_override: Option<&Path>) -> Result<Self, PreconditionError> {
        Self::resolve_with(
            |key| std::env::var_os(key),
            root_override,
            std::env::current_exe().ok().as_deref(),
            std::env::current_dir().ok().as_deref(),
        )
    }

    fn resolve_with(
        lookup: impl Fn(&str) -> Option<OsString>,
        root_override: Option<&Path>,
        exe: Option<&Path>,
        cwd: Option<&Path>,
    ) -> Result<Self, PreconditionError> {
        let user = ["USER", "LOGNAME"]
            .iter()
            .filter_map(|key| lookup(key))
            .map(|v| v.to_string_lossy().into_owned())
            .find(|v| !v.is_empty())
            .ok_or(PreconditionError::UnknownUser)?;
        if user == "root" {
            return Err(PreconditionError::RunningAsRoot);
        }

        let home = lookup("HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(dirs::home_dir)
            .filter(|p| p.is_dir())
            .ok_or_else(|| PreconditionError::UnknownHome(user.clone()))?;

        let root = resolve_root(root_override, exe, cwd)?;

        Ok(Self { user, home, root })
    }

    /// Expand a leading `~/` against the user's home; resolve other relative
    /// paths against the provisioning root.
    #[must_use]
    pub fn expand(&self, path: &Path) -> PathBuf {
        if let Ok(rest) = path.strip_prefix("~") {
            self.home.join(rest)
        } else if path.is_relative() {
            self.root.join(path)
        } else {
            path.to_path_buf()
        }
    }
}

/// Find the provisioning root.
///
/// An explicit override wins (and must be a directory). Otherwise the first
/// directory holding `setup.toml` among the binary's location (installed
/// next to the tree, in `bin/`, or in `target/<profile>/`) and the current
/// directory is used.
fn resolve_root(
    root_override: Option<&Path>,
    exe: Option<&Path>,
    cwd: Option<&Path>,
) -> Result<PathBuf, PreconditionError> {
    if let Some(root) = root_override {
        return dunce::canonicalize(root)
            .ok()
            .filter(|p| p.is_dir())
            .ok_or(PreconditionError::UnknownRoot);
    }

    let exe_candidates = exe
        .and_then(Path::parent)
        .map(|dir| vec![dir.to_path_buf(), dir.join(".."), dir.join("../..")])
        .unwrap_or_default();

    exe_candidates
        .into_iter()
        .chain(cwd.map(Path::to_path_buf))
        .find(|candidate| candidate.join(CONFIG_FILE).is_file())
        .and_then(|candidate| dunce::canonicalize(candidate).ok())
        .ok_or(PreconditionError::UnknownRoot)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<OsString> {
        let map: HashMap<String, OsString> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), OsString::from(v)))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn fixture() -> (tempfile::TempDir, PathBuf, PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let home = tmp.path().join("home");
        let root = tmp.path().join("root");
        std::fs::create_dir_all(&home).unwrap();
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join(CONFIG_FILE), "").unwrap();
        (tmp, home, root)
    }

    #[test]
    fn resolves_user_home_and_root() {
        let (_tmp, home, root) = fixture();
        let env = RunEnvironment::resolve_with(
            env_of(&[("USER", "alice"), ("HOME", home.to_str().unwrap())]),
            Some(&root),
            None,
            None,
        )
        .unwrap();
        assert_eq!(env.user, "alice");
        assert_eq!(env.home, home);
        assert_eq!(env.root, dunce::canonicalize(&root).unwrap());
    }

    #[test]
    fn falls_back_to_logname() {
        let (_tmp, home, root) = fixture();
        let env = RunEnvironment::resolve_with(
            env_of(&[("LOGNAME", "bob"), ("HOME", home.to_str().unwrap())]),
            Some(&root),
            None,
            None,
        )
        .unwrap();
        assert_eq!(env.user, "bob");
    }

    #[test]
    fn rejects_root_user() {
        let (_tmp, home, root) = fixture();
        let err = RunEnvironment::resolve_with(
            env_of(&[("USER", "root"), ("HOME", home.to_str().unwrap())]),
            Some(&root),
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, PreconditionError::RunningAsRoot));
    }

    #[test]
    fn rejects_unknown_user() {
        let err = RunEnvironment::resolve_with(env_of(&[("USER", "")]), None, None, None)
            .unwrap_err();
        assert!(matches!(err, PreconditionError::UnknownUser));
    }

    #[test]
    fn rejects_missing_home_directory() {
        let (tmp, _home, root) = fixture();
        let missing = tmp.path().join("nope");
        let err = RunEnvironment::resolve_with(
            env_of(&[("USER", "alice"), ("HOME", missing.to_str().unwrap())]),
            Some(&root),
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, PreconditionError::UnknownHome(ref u) if u == "alice"));
    }

    #[test]
    fn root_found_next_to_binary() {
        let (_tmp, _home, root) = fixture();
        let exe = root.join("bin").join("setup");
        let found = resolve_root(None, Some(&exe), None).unwrap();
        assert_eq!(found, dunce::canonicalize(&root).unwrap());
    }

    #[test]
    fn root_found_in_current_directory() {
        let (_tmp, _home, root) = fixture();
        let found = resolve_root(None, Some(Path::new("/usr/bin/setup")), Some(&root)).unwrap();
        assert_eq!(found, dunce::canonicalize(&root).unwrap());
    }

    #[test]
    fn root_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let err = resolve_root(None, None, Some(tmp.path())).unwrap_err();
        assert!(matches!(err, PreconditionError::UnknownRoot));
    }

    #[test]
    fn override_must_exist() {
        let err = resolve_root(Some(Path::new("/nonexistent/setup-root")), None, None)
            .unwrap_err();
        assert!(matches!(err, PreconditionError::UnknownRoot));
    }

    #[test]
    fn expand_handles_tilde_and_relative_paths() {
        let env = RunEnvironment {
            user: "alice".to_string(),
            home: PathBuf::from("/home/alice"),
            root: PathBuf::from("/srv/setup"),
        };
        assert_eq!(
            env.expand(Path::new("~/.config/nvim")),
            PathBuf::from("/home/alice/.config/nvim")
        );
        assert_eq!(
            env.expand(Path::new("dotfiles")),
            PathBuf::from("/srv/setup/dotfiles")
        );
        assert_eq!(env.expand(Path::new("/etc/hosts")), PathBuf::from("/etc/hosts"));
    }
}
