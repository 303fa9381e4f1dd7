use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::environment::RunEnvironment;
use crate::exec::Executor;
use crate::logging::Log;
use crate::platform::Platform;
use crate::scratch::ScratchRegistry;

/// Shared, per-run context passed by reference to every task.
pub struct Context {
    /// Configuration loaded from `setup.toml`.
    pub config: Arc<Config>,
    /// Invoking user, their home, and the provisioning root.
    pub env: Arc<RunEnvironment>,
    /// Detected platform information.
    pub platform: Arc<Platform>,
    /// Logger for output and task recording.
    pub log: Arc<dyn Log>,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Temporary paths removed when the run ends.
    pub scratch: ScratchRegistry,
    /// Report what would change without changing anything.
    pub dry_run: bool,
    /// Command tracing enabled; child tools that support it print traces too.
    pub debug: bool,
    /// A terminal is attached and can be handed to interactive children.
    pub interactive: bool,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &"<Config>")
            .field("env", &self.env)
            .field("platform", &self.platform)
            .field("log", &"<dyn Log>")
            .field("executor", &"<dyn Executor>")
            .field("scratch", &self.scratch)
            .field("dry_run", &self.dry_run)
            .field("debug", &self.debug)
            .field("interactive", &self.interactive)
            .finish()
    }
}

impl Context {
    /// Creates a new context. Flags start off; set them with the `with_*`
    /// methods.
    #[must_use]
    pub fn new(
        config: Config,
        env: RunEnvironment,
        platform: Platform,
        log: Arc<dyn Log>,
        executor: Arc<dyn Executor>,
        scratch: ScratchRegistry,
    ) -> Self {
        Self {
            config: Arc::new(config),
            env: Arc::new(env),
            platform: Arc::new(platform),
            log,
            executor,
            scratch,
            dry_run: false,
            debug: false,
            interactive: false,
        }
    }

    /// Set the dry-run flag.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the debug flag.
    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set whether a terminal is attached.
    #[must_use]
    pub const fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Login name of the user being provisioned.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.env.user
    }

    /// The user's home directory.
    #[must_use]
    pub fn home(&self) -> &Path {
        &self.env.home
    }

    /// Provisioning root holding `setup.toml`.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.env.root
    }

    /// Resolve a configured path (`~/` against home, relative against root).
    #[must_use]
    pub fn expand(&self, path: &Path) -> PathBuf {
        self.env.expand(path)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::MockExecutor;
    use crate::tasks::test_helpers::{empty_config, make_context, quiet_logger};

    fn ctx() -> Context {
        make_context(empty_config(), Arc::new(MockExecutor::default()), quiet_logger())
    }

    #[test]
    fn accessors_return_environment() {
        let ctx = ctx();
        assert_eq!(ctx.user(), "alice");
        assert_eq!(ctx.home(), Path::new("/home/alice"));
        assert_eq!(ctx.root(), Path::new("/srv/setup"));
    }

    #[test]
    fn expand_uses_home_and_root() {
        let ctx = ctx();
        assert_eq!(
            ctx.expand(Path::new("~/.config/nvim")),
            PathBuf::from("/home/alice/.config/nvim")
        );
        assert_eq!(
            ctx.expand(Path::new("dotfiles")),
            PathBuf::from("/srv/setup/dotfiles")
        );
        assert_eq!(ctx.expand(Path::new("/etc/x")), PathBuf::from("/etc/x"));
    }

    #[test]
    fn flags_default_off_and_builders_set_them() {
        let ctx = ctx().with_interactive(false);
        assert!(!ctx.dry_run && !ctx.debug && !ctx.interactive);
        let ctx = ctx.with_dry_run(true).with_debug(true).with_interactive(true);
        assert!(ctx.dry_run && ctx.debug && ctx.interactive);
    }

    #[test]
    fn debug_format_includes_key_fields() {
        let debug = format!("{:?}", ctx());
        assert!(debug.contains("Context"));
        assert!(debug.contains("dry_run"));
        assert!(debug.contains("alice"));
    }
}
