//! Build identification stamped by build.rs

#[test]
fn test_long_version_carries_build_info() {
    let long_version = env!("LONG_VERSION");
    assert!(long_version.starts_with(env!("CARGO_PKG_VERSION")));
    assert!(long_version.contains(&format!("commit {}", env!("GIT_HASH"))));
    assert!(long_version.contains(env!("BUILD_TIMESTAMP")));
    assert!(long_version.ends_with(&format!("{})", env!("BUILD_PROFILE"))));
}
