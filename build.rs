use std::process::Command;

/// Run git in the package root; `None` if git is missing or the call fails.
fn git(args: &[&str]) -> Option<String> {
    let out = Command::new("git").args(args).output().ok()?;
    out.status
        .success()
        .then(|| String::from_utf8_lossy(&out.stdout).trim().to_owned())
}

fn main() {
    for watched in [".git/HEAD", ".git/refs/"] {
        println!("cargo:rerun-if-changed={watched}");
    }

    // `imgver --version` prints the crate version on a release tag and
    // `dev@<hash>` everywhere else.
    let hash = git(&["rev-parse", "--short=10", "HEAD"]).unwrap_or_default();
    let release = git(&["describe", "--tags", "--exact-match"]).is_some_and(|tag| !tag.is_empty());

    println!("cargo:rustc-env=GIT_HASH={hash}");
    println!("cargo:rustc-env=ON_RELEASE_TAG={release}");
}
