use crate::errors::DiagnosisError;
use std::path::{Path, PathBuf};

/// Fixed file names the evaluator writes into the reports directory.
pub const TSNE_IMAGE: &str = "t-SNE_Visualization.png";
pub const CONFUSION_MATRIX_IMAGE: &str = "Confusion_Matrix.png";

/// Evaluator image artifacts mapped to filesystem paths and servable refs.
#[derive(Debug, Clone)]
pub struct ResolvedArtifacts {
    pub tsne_path: PathBuf,
    pub confusion_matrix_path: PathBuf,
    pub tsne_url: String,
    pub confusion_matrix_url: String,
}

/// Everything in the reports directory is served statically by basename.
pub fn public_url(basename: &str) -> String {
    format!("/reports/{}", basename)
}

/// Map the two well-known evaluator images to stable, servable identifiers.
///
/// A missing image after the evaluator reported success is a contract
/// violation, surfaced as `ArtifactMissing` (distinct from a parse failure).
pub fn resolve(reports_dir: &Path) -> Result<ResolvedArtifacts, DiagnosisError> {
    let tsne_path = reports_dir.join(TSNE_IMAGE);
    let confusion_matrix_path = reports_dir.join(CONFUSION_MATRIX_IMAGE);

    for path in [&tsne_path, &confusion_matrix_path] {
        if !path.exists() {
            return Err(DiagnosisError::ArtifactMissing { path: path.clone() });
        }
    }

    Ok(ResolvedArtifacts {
        tsne_url: public_url(TSNE_IMAGE),
        confusion_matrix_url: public_url(CONFUSION_MATRIX_IMAGE),
        tsne_path,
        confusion_matrix_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_both_images_when_present() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TSNE_IMAGE), b"png").unwrap();
        std::fs::write(dir.path().join(CONFUSION_MATRIX_IMAGE), b"png").unwrap();

        let resolved = resolve(dir.path()).unwrap();
        assert_eq!(resolved.tsne_url, "/reports/t-SNE_Visualization.png");
        assert_eq!(
            resolved.confusion_matrix_url,
            "/reports/Confusion_Matrix.png"
        );
        assert!(resolved.tsne_path.ends_with(TSNE_IMAGE));
    }

    #[test]
    fn missing_image_is_artifact_missing_with_offending_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFUSION_MATRIX_IMAGE), b"png").unwrap();

        match resolve(dir.path()) {
            Err(DiagnosisError::ArtifactMissing { path }) => {
                assert!(path.ends_with(TSNE_IMAGE));
            }
            other => panic!("expected ArtifactMissing, got {:?}", other.map(|_| ())),
        }
    }
}
