use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const EXTENSION: &str = "png";

/// `<input dir>/<stem>[_<name>...].png`
pub fn default_path(input: &Path, stem: &str, display: &[String]) -> PathBuf {
    let mut name = stem.to_string();
    for d in display {
        name.push('_');
        name.push_str(d);
    }
    sibling(input, &name)
}

/// Image named after the input file, next to it.
pub fn stem_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "plot".to_string());
    sibling(input, &stem)
}

fn sibling(input: &Path, name: &str) -> PathBuf {
    let dir = input.parent().unwrap_or_else(|| Path::new(""));
    dir.join(format!("{}.{}", name, EXTENSION))
}

pub fn ensure_absent(path: &Path) -> Result<()> {
    if path.exists() {
        Err(Error::OutputExists(path.to_path_buf()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_path() {
        let input = Path::new("runs/a/chain.txt");
        assert_eq!(
            default_path(input, "walkers", &[]),
            PathBuf::from("runs/a/walkers.png")
        );
        assert_eq!(
            default_path(input, "corner", &["m".to_string(), "b".to_string()]),
            PathBuf::from("runs/a/corner_m_b.png")
        );
        assert_eq!(
            default_path(Path::new("chain.txt"), "walkers", &[]),
            PathBuf::from("walkers.png")
        );
    }

    #[test]
    fn test_stem_path() {
        assert_eq!(
            stem_path(Path::new("data/points.csv")),
            PathBuf::from("data/points.png")
        );
    }

    #[test]
    fn test_ensure_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("walkers.png");
        assert!(ensure_absent(&path).is_ok());
        std::fs::write(&path, b"").unwrap();
        match ensure_absent(&path) {
            Err(Error::OutputExists(p)) => assert_eq!(p, path),
            other => panic!("unexpected {:?}", other),
        }
    }
}
