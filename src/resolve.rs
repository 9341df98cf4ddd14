//! Database path resolution.
//!
//! Turns configuration plus request parameters into the on-disk database
//! file location. A fixed configured file always wins over the request's
//! `db` parameter; request-supplied names have their parent-directory
//! segments stripped before they touch the filesystem.

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::params::{ParamList, DB_FILE_PARAM};

/// Resolve the database file for this request.
///
/// Precedence: `config.db_file` verbatim (trusted), else the first `db`
/// parameter with `..` segments stripped. Either result is joined under
/// `config.base_dir` when one is set. The resolved path must exist as a
/// regular file.
pub fn database_path(config: &GatewayConfig, params: &ParamList) -> Result<PathBuf, GatewayError> {
    let name = match &config.db_file {
        Some(fixed) => fixed.clone(),
        None => {
            let supplied = params
                .get(DB_FILE_PARAM)
                .ok_or(GatewayError::MissingDatabase)?;
            strip_parents(supplied)
        }
    };

    let path = match &config.base_dir {
        Some(base) => PathBuf::from(join_under_base(base, &name)),
        None => PathBuf::from(name),
    };

    debug!(path = %path.display(), "database path resolved");

    match fs::metadata(&path) {
        Ok(meta) if meta.is_file() => Ok(path),
        _ => Err(GatewayError::DatabaseNotFound(path)),
    }
}

/// Drop `..` and `.` segments from a caller-supplied name.
///
/// Removal, not lexical resolution: `a/../b` becomes `a/b`. A leading `/`
/// survives (the caller may legitimately address an absolute path when no
/// base directory is configured).
pub fn strip_parents(name: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    for segment in name.split('/') {
        match segment {
            "." | ".." => {}
            other => kept.push(other),
        }
    }
    kept.join("/")
}

/// Join `base` and `name` with exactly one separator, collapsing any runs
/// of separators in the combined string.
fn join_under_base(base: &str, name: &str) -> String {
    let combined = format!("{base}/{name}");
    let mut out = String::with_capacity(combined.len());
    let mut last_was_sep = false;
    for ch in combined.chars() {
        if ch == '/' {
            if !last_was_sep {
                out.push(ch);
            }
            last_was_sep = true;
        } else {
            out.push(ch);
            last_was_sep = false;
        }
    }
    out
}
