//! Discovery and hashing of Swiss Ephemeris data files.

use crate::ephemeris::types::{DataFileKind, EphemerisFile};
use log::{debug, warn};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File-name prefixes, most specific first: `semo*` must win over `sem*`.
const FILE_PATTERNS: &[(&str, DataFileKind)] = &[
    ("sepl", DataFileKind::Planets),
    ("semo", DataFileKind::Moon),
    ("seas", DataFileKind::Asteroids),
    ("sem", DataFileKind::OuterBodies),
];

/// Classify a file name against the `<prefix>*.se*` patterns.
pub fn classify_file_name(name: &str) -> Option<DataFileKind> {
    let lower = name.to_ascii_lowercase();
    FILE_PATTERNS
        .iter()
        .find(|(prefix, _)| {
            lower
                .strip_prefix(prefix)
                .map(|rest| rest.contains(".se"))
                .unwrap_or(false)
        })
        .map(|(_, kind)| *kind)
}

fn sha256_file(path: &Path) -> io::Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Hashed data files found in one directory.
///
/// Built once per configured directory; the adapter rebuilds it when its
/// data directory changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataFileCatalog {
    dir: Option<PathBuf>,
    files: Vec<EphemerisFile>,
}

impl DataFileCatalog {
    /// Scan `dir` for ephemeris tables. Unreadable and empty files are
    /// skipped; a missing directory yields an empty catalog.
    pub fn scan(dir: &Path) -> Self {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot read ephemeris directory {}: {}", dir.display(), e);
                return Self {
                    dir: Some(dir.to_path_buf()),
                    files: Vec::new(),
                };
            }
        };

        let mut found: BTreeMap<PathBuf, EphemerisFile> = BTreeMap::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let Some(kind) = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(classify_file_name)
            else {
                continue;
            };
            let size = match entry.metadata() {
                Ok(meta) if meta.is_file() => meta.len(),
                Ok(_) => continue,
                Err(e) => {
                    warn!("Skipping ephemeris file {}: {}", path.display(), e);
                    continue;
                }
            };
            if size == 0 {
                warn!("Skipping empty ephemeris file {}", path.display());
                continue;
            }
            match sha256_file(&path) {
                Ok(sha256) => {
                    debug!("Hashed {} ({} bytes)", path.display(), size);
                    found.insert(
                        path.clone(),
                        EphemerisFile {
                            path,
                            kind,
                            sha256,
                            size,
                        },
                    );
                }
                Err(e) => warn!("Skipping unreadable ephemeris file {}: {}", path.display(), e),
            }
        }

        Self {
            dir: Some(dir.to_path_buf()),
            files: found.into_values().collect(),
        }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn files(&self) -> &[EphemerisFile] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// True when the catalog was built for `dir`.
    pub fn is_for(&self, dir: &Path) -> bool {
        self.dir.as_deref() == Some(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_file_name() {
        assert_eq!(classify_file_name("sepl_18.se1"), Some(DataFileKind::Planets));
        assert_eq!(classify_file_name("semo_18.se1"), Some(DataFileKind::Moon));
        assert_eq!(classify_file_name("seas_18.se1"), Some(DataFileKind::Asteroids));
        assert_eq!(classify_file_name("semom48.se1"), Some(DataFileKind::Moon));
        assert_eq!(classify_file_name("sem_ext.se1"), Some(DataFileKind::OuterBodies));
        assert_eq!(classify_file_name("sepl_18.txt"), None);
        assert_eq!(classify_file_name("README"), None);
    }

    #[test]
    fn test_scan_hashes_and_skips() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("sepl_18.se1"), b"dummy ephemeris data").unwrap();
        fs::write(dir.path().join("semo_18.se1"), b"moon tables").unwrap();
        fs::write(dir.path().join("seas_18.se1"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let catalog = DataFileCatalog::scan(dir.path());
        assert!(catalog.is_for(dir.path()));
        assert_eq!(catalog.files().len(), 2);
        let planets = &catalog.files()[1];
        assert_eq!(planets.kind, DataFileKind::Planets);
        assert_eq!(planets.size, 20);
        assert_eq!(planets.sha256.len(), 64);
        // sorted by path: semo_ before sepl_
        assert_eq!(catalog.files()[0].kind, DataFileKind::Moon);
    }

    #[test]
    fn test_scan_missing_dir_is_empty() {
        let catalog = DataFileCatalog::scan(Path::new("/nonexistent/urania/ephe"));
        assert!(catalog.is_empty());
    }
}
