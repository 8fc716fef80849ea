use std::path::{Path, PathBuf};

use tracing::debug;

/// Key result files, relative to the downloaded asset dir.
pub const KEY_OUTPUTS: [&str; 8] = [
    "odm_orthophoto/odm_orthophoto.tif",
    "odm_orthophoto/odm_orthophoto.png",
    "odm_dem/dsm.tif",
    "odm_georeferencing/odm_georeferenced_model.laz",
    "odm_texturing/odm_textured_model.obj",
    "odm_texturing/odm_textured_model_geo.obj",
    "odm_mesh/odm_mesh.ply",
    "odm_report/report.pdf",
];

/// Copy the key results present under `odm_dir` flat into `processed_dir`.
///
/// Missing files are skipped. Returns the copied destinations, in [`KEY_OUTPUTS`] order.
pub async fn curate(odm_dir: &Path, processed_dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(processed_dir).await?;

    let mut copied = Vec::new();
    for rel in KEY_OUTPUTS {
        let src = odm_dir.join(rel);
        if !tokio::fs::try_exists(&src).await? {
            debug!(target: "odm.pipeline.curate", file = rel, "key output not produced");
            continue;
        }
        let Some(name) = src.file_name() else {
            continue;
        };
        let dst = processed_dir.join(name);
        tokio::fs::copy(&src, &dst).await?;
        debug!(target: "odm.pipeline.curate", src = %src.display(), dst = %dst.display(), "copied key output");
        copied.push(dst);
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn copies_present_outputs_flat() {
        let tmp = tempfile::tempdir().unwrap();
        let odm = tmp.path().join("odm");
        for rel in ["odm_orthophoto/odm_orthophoto.tif", "odm_report/report.pdf", "odm_dem/dtm.tif"] {
            let p = odm.join(rel);
            std::fs::create_dir_all(p.parent().unwrap()).unwrap();
            std::fs::write(&p, rel.as_bytes()).unwrap();
        }
        let processed = tmp.path().join("processed/run_1");

        let copied = curate(&odm, &processed).await.unwrap();

        assert_eq!(
            copied,
            vec![processed.join("odm_orthophoto.tif"), processed.join("report.pdf")]
        );
        assert_eq!(
            std::fs::read(processed.join("report.pdf")).unwrap(),
            b"odm_report/report.pdf"
        );
        assert!(!processed.join("dtm.tif").exists());
    }

    #[tokio::test]
    async fn nothing_to_copy_still_creates_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let processed = tmp.path().join("processed");
        let copied = curate(&tmp.path().join("odm"), &processed).await.unwrap();
        assert!(copied.is_empty());
        assert!(processed.is_dir());
    }
}
