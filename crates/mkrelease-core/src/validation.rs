//! Pre-release validation of local files

use tracing::debug;

use crate::error::ValidationError;
use crate::types::ReleaseBundle;

/// Check that the notes file and every asset exist, in that order.
///
/// Fails on the first missing file.
pub fn validate_release_files(bundle: &ReleaseBundle) -> Result<(), ValidationError> {
    if !bundle.notes_path.exists() {
        return Err(ValidationError::MissingNotes(bundle.notes_path.clone()));
    }

    for asset in &bundle.assets {
        if !asset.path.exists() {
            return Err(ValidationError::MissingAsset(asset.path.clone()));
        }
    }

    debug!(assets = bundle.assets.len(), "release files present");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AssetNaming;
    use tempfile::TempDir;

    fn bundle_in(temp: &TempDir) -> ReleaseBundle {
        let mut bundle = ReleaseBundle::new("1.2.3", temp.path());
        bundle.create_assets(temp.path(), "tool", AssetNaming::Plain);
        bundle
    }

    #[test]
    fn test_all_present() {
        let temp = TempDir::new().unwrap();
        let bundle = bundle_in(&temp);
        std::fs::write(&bundle.notes_path, "notes").unwrap();
        for asset in &bundle.assets {
            std::fs::write(&asset.path, "zip").unwrap();
        }

        assert!(validate_release_files(&bundle).is_ok());
    }

    #[test]
    fn test_missing_notes_reported_first() {
        let temp = TempDir::new().unwrap();
        let bundle = bundle_in(&temp);

        let err = validate_release_files(&bundle).unwrap_err();
        assert!(matches!(err, ValidationError::MissingNotes(_)));
        assert!(err.to_string().starts_with("release notes not found at"));
    }

    #[test]
    fn test_missing_asset() {
        let temp = TempDir::new().unwrap();
        let bundle = bundle_in(&temp);
        std::fs::write(&bundle.notes_path, "notes").unwrap();
        std::fs::write(&bundle.assets[0].path, "zip").unwrap();
        std::fs::write(&bundle.assets[1].path, "zip").unwrap();

        let err = validate_release_files(&bundle).unwrap_err();
        match err {
            ValidationError::MissingAsset(path) => assert_eq!(path, bundle.assets[2].path),
            other => panic!("unexpected error: {other}"),
        }
    }
}
