//! Compatibility polyfill download

pub mod http;

pub use http::HttpShimFetcher;

use crate::error::Result;
use std::path::Path;

/// Places the compatibility shim next to the manifest.
pub trait ShimFetcher: Send + Sync {
    /// Write the shim into `dest_dir` and return its file name.
    ///
    /// Any failure is reported as [`crate::ConvertError::ShimFetch`]; the
    /// pipeline aborts the job instead of shipping a package without it.
    fn fetch(&self, dest_dir: &Path) -> Result<String>;
}
