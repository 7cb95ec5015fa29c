use crate::auth::SessionStorage;
use anyhow::Result;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub portal_url: String,
    pub data_dir: Option<PathBuf>,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(portal_url: String) -> Self {
        Self {
            portal_url,
            data_dir: None,
        }
    }

    /// Session mirror at `--data-dir` when given, `~/.securemed` otherwise.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be resolved or created.
    pub fn session_storage(&self) -> Result<SessionStorage> {
        match &self.data_dir {
            Some(dir) => SessionStorage::new(dir),
            None => SessionStorage::default_location(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new("http://localhost:8000".to_string());
        assert_eq!(args.portal_url, "http://localhost:8000");
        assert!(args.data_dir.is_none());
    }

    #[test]
    fn test_storage_honors_data_dir() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let mut args = GlobalArgs::new("http://localhost:8000".to_string());
        args.data_dir = Some(temp_dir.path().join("sessions"));

        args.session_storage().unwrap();
        assert!(temp_dir.path().join("sessions").is_dir());
    }
}
