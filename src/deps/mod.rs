// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 sc contributors

//! Dependency checker
//!
//! Looks up the external binaries sc drives on the executable search path.
//! All names are checked before reporting, so a single run lists every
//! missing command.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{ScError, ScResult};

/// Google Cloud CLI
pub const GCLOUD_BINARY: &str = "gcloud";
/// Kubernetes CLI
pub const KUBECTL_BINARY: &str = "kubectl";
/// cfssl certificate tool
pub const CFSSL_BINARY: &str = "cfssl";
/// cfssljson, turns cfssl JSON output into PEM files
pub const CFSSLJSON_BINARY: &str = "cfssljson";

/// Binaries required for installing Service Catalog and configuring the GCP broker
pub const REQUIRED_BINARIES: [&str; 4] =
    [GCLOUD_BINARY, KUBECTL_BINARY, CFSSL_BINARY, CFSSLJSON_BINARY];

/// Check that every name resolves on the process `PATH`
///
/// A name containing a path separator is checked as a path instead.
pub fn check_dependencies<S: AsRef<OsStr>>(names: &[S]) -> ScResult<()> {
    collect_missing(names, |name| which::which(name).ok())
}

/// Check that every name resolves against an explicit search path
///
/// `search_path` uses the platform `PATH` syntax (`:`-separated on Unix).
pub fn check_dependencies_in<S, P, C>(names: &[S], search_path: Option<P>, cwd: C) -> ScResult<()>
where
    S: AsRef<OsStr>,
    P: AsRef<OsStr>,
    C: AsRef<Path>,
{
    let search_path: Option<&OsStr> = search_path.as_ref().map(|p| p.as_ref());
    collect_missing(names, |name| {
        which::which_in(name, search_path, cwd.as_ref()).ok()
    })
}

/// Resolve a single binary to its absolute path
pub fn resolve(name: impl AsRef<OsStr>) -> Option<PathBuf> {
    which::which(name).ok()
}

fn collect_missing<S, F>(names: &[S], mut lookup: F) -> ScResult<()>
where
    S: AsRef<OsStr>,
    F: FnMut(&OsStr) -> Option<PathBuf>,
{
    let mut missing = Vec::new();

    for name in names {
        let name = name.as_ref();
        match lookup(name) {
            Some(path) => debug!("found {} at {}", name.to_string_lossy(), path.display()),
            None => {
                debug!("{} not found", name.to_string_lossy());
                missing.push(name.to_string_lossy().into_owned());
            }
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ScError::missing_binaries(missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[cfg(unix)]
    fn make_executable(dir: &Path, name: &str) {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_all_present() {
        let temp = TempDir::new().unwrap();
        for name in REQUIRED_BINARIES {
            make_executable(temp.path(), name);
        }

        let result = check_dependencies_in(&REQUIRED_BINARIES, Some(temp.path()), temp.path());
        assert!(result.is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_reports_every_missing_name_in_order() {
        let temp = TempDir::new().unwrap();
        make_executable(temp.path(), "kubectl");
        make_executable(temp.path(), "cfssl");

        let err = check_dependencies_in(&REQUIRED_BINARIES, Some(temp.path()), temp.path())
            .unwrap_err();

        match &err {
            ScError::MissingBinaries { names } => {
                assert_eq!(names, &vec!["gcloud".to_string(), "cfssljson".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let message = err.to_string();
        assert_eq!(message, "gcloud,cfssljson commands not found in the PATH");
        assert!(!message.contains("kubectl"));
    }

    #[test]
    fn test_empty_search_dir_misses_everything() {
        let temp = TempDir::new().unwrap();
        let err = check_dependencies_in(&["kubectl", "gcloud"], Some(temp.path()), temp.path())
            .unwrap_err();
        assert_eq!(err.to_string(), "kubectl,gcloud commands not found in the PATH");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_executable_file_is_missing() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("kubectl"), "not a program").unwrap();

        let result = check_dependencies_in(&["kubectl"], Some(temp.path()), temp.path());
        assert!(matches!(result, Err(ScError::MissingBinaries { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_sh_resolves_on_process_path() {
        assert!(check_dependencies(&["sh"]).is_ok());
        assert!(resolve("sh").is_some());
    }

    #[test]
    fn test_check_is_repeatable() {
        let names = ["sc-test-binary-that-does-not-exist"];
        let first = check_dependencies(&names).unwrap_err().to_string();
        let second = check_dependencies(&names).unwrap_err().to_string();
        assert_eq!(first, second);
    }
}
