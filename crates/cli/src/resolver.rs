//! Finds packages on disk.
//!
//! A package is a directory of `.chk` files, and its import path is the directory's path
//! relative to the package root.

use chicklet_interpreter::PackageResolver;
use std::{
  fs, io,
  path::{Path, PathBuf},
};

const EXTENSION: &str = "chk";

#[derive(Debug)]
pub struct DirectoryResolver {
  root: PathBuf,
}
impl DirectoryResolver {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }
}
impl PackageResolver for DirectoryResolver {
  fn resolve(&self, path: &str) -> Option<Vec<String>> {
    let directory = self.root.join(path);
    tracing::debug!(path, directory = %directory.display(), "resolving package");

    match read_package(&directory) {
      Ok(files) if files.is_empty() => None,
      Ok(files) => Some(files.into_iter().map(|(_, source)| source).collect()),
      Err(error) => {
        tracing::debug!(path, %error, "unable to read package");
        None
      }
    }
  }
}

/// Reads the path and source of every file in a package directory, in file name order
pub fn read_package(directory: &Path) -> io::Result<Vec<(PathBuf, String)>> {
  let mut paths = fs::read_dir(directory)?
    .map(|entry| entry.map(|entry| entry.path()))
    .collect::<io::Result<Vec<_>>>()?;
  paths.retain(|path| path.is_file() && path.extension().is_some_and(|ext| ext == EXTENSION));
  paths.sort();

  (paths.into_iter())
    .map(|path| fs::read_to_string(&path).map(|source| (path, source)))
    .collect()
}
