//! Hands external menu links to the system URL opener.

use std::io;

use thiserror::Error;

use crate::domain::menu::is_external;

#[derive(Debug, Error)]
pub enum OpenError {
    #[error("{0} is not an external link")]
    NotExternal(String),
    #[error("system opener failed: {0}")]
    Launch(#[from] io::Error),
}

/// Open `url` in the default browser without blocking the UI. The opener
/// process is detached and reaped by the system, and its output never
/// reaches the terminal.
pub fn open_link(url: &str) -> Result<(), OpenError> {
    if !is_external(url) {
        return Err(OpenError::NotExternal(url.to_string()));
    }
    let target = if url.starts_with("//") {
        format!("https:{url}")
    } else {
        url.to_string()
    };
    open::that_detached(target)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_paths_never_reach_the_opener() {
        assert!(matches!(
            open_link("/settings/profile"),
            Err(OpenError::NotExternal(path)) if path == "/settings/profile"
        ));
        assert!(matches!(open_link(""), Err(OpenError::NotExternal(_))));
    }
}
