//! Embeds the build version as `HOSTPREP_VERSION`.
use std::process::Command;

fn main() {
    // HOSTPREP_VERSION wins when set (release builds); otherwise use git describe.
    if let Ok(version) = std::env::var("HOSTPREP_VERSION") {
        println!("cargo:rustc-env=HOSTPREP_VERSION={version}");
    } else if let Ok(output) = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        && output.status.success()
    {
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=HOSTPREP_VERSION={version}");
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-env-changed=HOSTPREP_VERSION");
}
