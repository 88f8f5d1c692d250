use std::process::Command;

/// First line of `cmd`'s stdout, if it ran and succeeded.
fn command_output(cmd: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(cmd).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let line = text.lines().next()?.trim();
    (!line.is_empty()).then(|| line.to_owned())
}

fn main() {
    if let Ok(target) = std::env::var("TARGET") {
        println!("cargo:rustc-env=CGBF_BUILD_TARGET={target}");
    }

    let rustc = std::env::var("RUSTC").unwrap_or_else(|_| "rustc".to_owned());
    if let Some(version) = command_output(&rustc, &["--version"]) {
        println!("cargo:rustc-env=RUSTC_VERSION={version}");
    }
    if let Some(hash) = command_output("git", &["rev-parse", "--short=12", "HEAD"]) {
        println!("cargo:rustc-env=GIT_HASH={hash}");
    }

    println!("cargo:rerun-if-env-changed=TARGET");
    println!("cargo:rerun-if-env-changed=RUSTC");
}
