//! Stamps the CLI with the source revision and cargo profile for `--version`.

use std::env;
use std::process::Command;

fn describe() -> String {
    let out = Command::new("git")
        .args(["describe", "--always", "--dirty", "--abbrev=12"])
        .output();
    match out {
        Ok(o) if o.status.success() => {
            let text = String::from_utf8_lossy(&o.stdout).trim().to_owned();
            if text.is_empty() {
                "untracked".to_owned()
            } else {
                text
            }
        }
        _ => "untracked".to_owned(),
    }
}

fn main() {
    println!("cargo:rustc-env=RELIEF_GIT_DESCRIBE={}", describe());
    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown".to_owned());
    println!("cargo:rustc-env=RELIEF_BUILD_PROFILE={profile}");
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=PROFILE");
}
