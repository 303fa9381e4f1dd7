//! Build script: embeds the version string via `SETUP_VERSION`.

use std::process::Command;

fn main() {
    // CI release builds pass SETUP_VERSION; local builds use git describe.
    if let Ok(version) = std::env::var("SETUP_VERSION") {
        println!("cargo:rustc-env=SETUP_VERSION={version}");
    } else if let Ok(output) = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        && output.status.success()
    {
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=SETUP_VERSION={version}");
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-env-changed=SETUP_VERSION");
}
