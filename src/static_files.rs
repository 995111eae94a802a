use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::dispatcher::{Handler, HandlerRequest, HandlerResponse, Next};
use crate::server::not_found_response;

/// Name of the catch-all parameter the responder reads its file path from
pub const FILEPATH_PARAM: &str = "filepath";

/// Serves files below a base directory for a `.../*filepath` route
pub struct StaticFiles {
    base_dir: PathBuf,
}

impl StaticFiles {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self { base_dir: base.into() }
    }

    fn map_path(&self, url_path: &str) -> Option<PathBuf> {
        let mut pb = self.base_dir.clone();
        for comp in Path::new(url_path.trim_start_matches('/')).components() {
            match comp {
                Component::Normal(s) => pb.push(s),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(pb)
    }

    fn content_type(path: &Path) -> &'static str {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "html" | "htm" => "text/html",
            "css" => "text/css",
            "js" => "application/javascript",
            "json" => "application/json",
            "txt" => "text/plain",
            "svg" => "image/svg+xml",
            "png" => "image/png",
            _ => "application/octet-stream",
        }
    }

    /// Read the file `url_path` maps to, with its content type
    ///
    /// # Errors
    ///
    /// `NotFound` when the path escapes the base directory or is not a regular
    /// file; any other I/O error from reading it.
    pub fn load(&self, url_path: &str) -> io::Result<(Vec<u8>, &'static str)> {
        let path = self
            .map_path(url_path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "invalid path"))?;
        if !path.is_file() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        }
        let bytes = fs::read(&path)?;
        Ok((bytes, Self::content_type(&path)))
    }
}

impl Handler for StaticFiles {
    fn call(&self, req: &mut HandlerRequest, res: &mut HandlerResponse, _next: Next<'_>) {
        let url_path = req.get_path_param(FILEPATH_PARAM).unwrap_or("/");
        match self.load(url_path) {
            Ok((bytes, content_type)) => {
                debug!(
                    path = %url_path,
                    size = bytes.len(),
                    content_type,
                    "Static file served"
                );
                *res = HandlerResponse::bytes(200, bytes, content_type);
            }
            Err(err) => {
                debug!(path = %url_path, error = %err, "Static file not served");
                *res = not_found_response();
            }
        }
    }
}
