use crate::manifest::PackageManifest;
use semver::Version;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HistoryError {
    #[error("release history is empty")]
    Empty,
    #[error("release #{index} is '{found}', expected '{expected}'")]
    NameMismatch {
        index: usize,
        expected: String,
        found: String,
    },
    #[error("release #{index} version {next} does not follow {previous}")]
    NotIncreasing {
        index: usize,
        previous: Version,
        next: Version,
    },
}

/// Check a sequence of releases of one package, oldest first.
///
/// All releases must share a name and versions must strictly increase, so no
/// two releases share a version.
pub fn check_release_history(releases: &[PackageManifest]) -> Result<(), HistoryError> {
    let Some(first) = releases.first() else {
        return Err(HistoryError::Empty);
    };

    for (index, pair) in releases.windows(2).enumerate() {
        let (previous, next) = (&pair[0], &pair[1]);
        if next.name != first.name {
            return Err(HistoryError::NameMismatch {
                index: index + 1,
                expected: first.name.to_string(),
                found: next.name.to_string(),
            });
        }
        if next.version <= previous.version {
            return Err(HistoryError::NotIncreasing {
                index: index + 1,
                previous: previous.version.clone(),
                next: next.version.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::parse_manifest_str;

    fn release(name: &str, version: &str) -> PackageManifest {
        parse_manifest_str(&format!(
            "name = \"{name}\"\nversion = \"{version}\"\nauthors = [\"a\"]\n"
        ))
        .unwrap()
    }

    #[test]
    fn accepts_strictly_increasing_versions() {
        let releases = vec![
            release("hdcycles", "0.7.6"),
            release("hdcycles", "0.7.23"),
            release("hdcycles", "0.8.6"),
            release("hdcycles", "0.9.1"),
        ];
        assert!(check_release_history(&releases).is_ok());
    }

    #[test]
    fn single_release_is_valid() {
        assert!(check_release_history(&[release("x", "1.0.0")]).is_ok());
    }

    #[test]
    fn rejects_repeated_version() {
        let releases = vec![release("x", "1.0.0"), release("x", "1.0.0")];
        assert!(matches!(
            check_release_history(&releases),
            Err(HistoryError::NotIncreasing { index: 1, .. })
        ));
    }

    #[test]
    fn rejects_decreasing_version() {
        let releases = vec![
            release("x", "0.7.23"),
            release("x", "0.8.6"),
            release("x", "0.7.6"),
        ];
        assert!(matches!(
            check_release_history(&releases),
            Err(HistoryError::NotIncreasing { index: 2, .. })
        ));
    }

    #[test]
    fn rejects_mixed_packages() {
        let releases = vec![release("x", "1.0.0"), release("y", "1.1.0")];
        assert!(matches!(
            check_release_history(&releases),
            Err(HistoryError::NameMismatch { index: 1, .. })
        ));
    }

    #[test]
    fn rejects_empty_history() {
        assert_eq!(check_release_history(&[]), Err(HistoryError::Empty));
    }
}
