use std::path::{Path, PathBuf};

/// Join two paths, only including the normal components.
pub fn join_normalized(base: impl AsRef<Path>, path: impl AsRef<Path>) -> PathBuf {
    let mut out = base.as_ref().to_path_buf();
    out.extend(path.as_ref().components().filter(|v| matches!(v, std::path::Component::Normal(_))));
    out
}

/// Whether two URLs point at the same host, ignoring a leading `www.`.
pub fn same_host(a: &str, b: &str) -> bool {
    a.trim_start_matches("www.").eq_ignore_ascii_case(b.trim_start_matches("www."))
}
