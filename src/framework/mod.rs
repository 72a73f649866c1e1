pub mod config;
pub use config::Config;

pub mod logging;

/// `url` with a trailing slash on its path, so [`url::Url::join`] appends
/// to it instead of replacing the last segment.
pub(crate) fn base_url(url: &url::Url) -> url::Url {
    let mut base = url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}
