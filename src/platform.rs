//! Host detection.
use std::path::Path;

/// Facts about the host that decide which tasks can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    /// Arch Linux (or a derivative shipping `/etc/arch-release`).
    pub is_arch: bool,
    /// systemd is the running init system.
    pub has_systemd: bool,
}

impl Platform {
    /// Detect the current platform.
    #[must_use]
    pub fn detect() -> Self {
        Self::detect_in(Path::new("/"))
    }

    /// Detect using `root` as the filesystem root.
    #[must_use]
    pub fn detect_in(root: &Path) -> Self {
        Self {
            is_arch: root.join("etc/arch-release").exists() || os_release_is_arch(root),
            has_systemd: root.join("run/systemd/system").is_dir(),
        }
    }

    /// Create a platform with explicit values.
    #[must_use]
    pub const fn new(is_arch: bool, has_systemd: bool) -> Self {
        Self {
            is_arch,
            has_systemd,
        }
    }

    /// Short description for log lines.
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match (self.is_arch, self.has_systemd) {
            (true, true) => "arch linux (systemd)",
            (true, false) => "arch linux (no systemd)",
            (false, _) => "not arch linux",
        }
    }
}

/// Whether `etc/os-release` names Arch as the distribution or its base.
fn os_release_is_arch(root: &Path) -> bool {
    std::fs::read_to_string(root.join("etc/os-release")).is_ok_and(|content| {
        content.lines().any(|line| {
            line.split_once('=').is_some_and(|(key, value)| {
                matches!(key, "ID" | "ID_LIKE")
                    && value
                        .trim_matches('"')
                        .split_whitespace()
                        .any(|id| id == "arch")
            })
        })
    })
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn detect_does_not_panic() {
        let _ = Platform::detect();
    }

    #[test]
    fn arch_release_marks_arch() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("etc")).unwrap();
        std::fs::write(tmp.path().join("etc/arch-release"), "").unwrap();
        assert!(Platform::detect_in(tmp.path()).is_arch);
    }

    #[test]
    fn os_release_id_like_marks_arch() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("etc")).unwrap();
        std::fs::write(
            tmp.path().join("etc/os-release"),
            "NAME=\"EndeavourOS\"\nID=endeavouros\nID_LIKE=\"arch\"\n",
        )
        .unwrap();
        assert!(Platform::detect_in(tmp.path()).is_arch);
    }

    #[test]
    fn other_distribution_is_not_arch() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("etc")).unwrap();
        std::fs::write(
            tmp.path().join("etc/os-release"),
            "ID=debian\nID_LIKE=\"ubuntu debian\"\n",
        )
        .unwrap();
        let platform = Platform::detect_in(tmp.path());
        assert!(!platform.is_arch);
        assert!(!platform.has_systemd);
    }

    #[test]
    fn systemd_detected_from_run_dir() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("run/systemd/system")).unwrap();
        assert!(Platform::detect_in(tmp.path()).has_systemd);
    }

    #[test]
    fn describe_mentions_arch() {
        assert_eq!(Platform::new(true, true).describe(), "arch linux (systemd)");
        assert_eq!(Platform::new(false, true).describe(), "not arch linux");
    }
}
