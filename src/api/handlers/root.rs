use crate::{GIT_COMMIT_HASH, short_commit};

/// Plain-text banner: name, version and short commit.
pub async fn root() -> String {
    format!(
        "{} {} ({})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_commit(GIT_COMMIT_HASH)
    )
}
