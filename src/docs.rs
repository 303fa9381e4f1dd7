//! Per-task documentation shown by `--docs` and before each full-mode prompt.
use crate::tasks::TaskId;

/// Documentation block for a task.
#[must_use]
pub const fn describe(id: TaskId) -> &'static str {
    match id {
        TaskId::PreFlightChecks => {
            "Verifies that the run can succeed before anything is changed: the tool
is running as a regular user, the host is Arch Linux, sudo is available
and authorised, the network is reachable, and every file listed under
[preflight].required_files exists. Makes no changes. Always runs first."
        }
        TaskId::SetupRepositories => {
            "Enables the pacman repositories listed under [repositories].enable by
uncommenting (or appending) their section in pacman.conf, then refreshes
the package databases. Repositories that are already enabled are left
alone."
        }
        TaskId::InstallPackages => {
            "Installs the native packages listed under [packages].native with pacman
and the AUR packages under [packages].aur with the configured AUR helper.
If AUR packages are requested and the helper is missing it is built from
the AUR first (needs an interactive terminal). Installed packages are
skipped."
        }
        TaskId::LinkDotfiles => {
            "Links every stow package listed under [dotfiles].packages from the
dotfiles directory into the home directory with GNU stow. Packages whose
files are all linked already are skipped; conflicting files abort the
task instead of being overwritten."
        }
        TaskId::ConfigureUser => {
            "Sets the login shell, adds the user to the configured supplementary
groups, and applies the home-manager configuration when [user.home_manager]
is set. A failed home-manager switch is retried once with a backup
extension so existing files are moved aside."
        }
        TaskId::SetupEditors => {
            "Bootstraps each editor listed under [[editors]] by running its bootstrap
command (plugin install, language servers, and so on) attached to the
terminal. An editor whose marker path already exists is considered done."
        }
        TaskId::Cleanup => {
            "Removes orphaned packages (dependencies nothing requires any more) when
[cleanup].remove_orphans is set. Does nothing if there are no orphans."
        }
        TaskId::SetupLoginManager => {
            "Installs the display manager package named under [login_manager] and
enables its systemd service so it starts at boot. Skipped when no login
manager is configured."
        }
        TaskId::HardenSystem => {
            "Installs and enables the ufw firewall with the configured allow rules,
then writes the kernel parameters under [hardening].sysctl into a sysctl
drop-in and reloads them. Each step is skipped when already in place."
        }
    }
}

/// Render the documentation block for one task.
#[must_use]
pub fn render_task(id: TaskId) -> String {
    let mut out = format!("--{}\n", id.name());
    for line in describe(id).lines() {
        out.push_str("    ");
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Render documentation for every task in canonical order.
#[must_use]
pub fn render_all() -> String {
    TaskId::ALL
        .iter()
        .map(|id| render_task(*id))
        .collect::<Vec<_>>()
        .join("\n")
}
