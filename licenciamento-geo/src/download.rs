//! Écriture des exports sur disque
//!
//! Le contenu est d'abord écrit dans un fichier temporaire voisin, puis
//! renommé vers sa destination finale. Le temporaire est supprimé dans tous
//! les cas, que le renommage ait réussi ou non.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use geocamadas::{sanitize_filename, ExportFormat, GeoError, GeoLayer};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Fichier écrit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedFile {
    pub path: PathBuf,
    pub bytes: usize,
    pub mime: &'static str,
}

/// Encode une couche et l'écrit sous `<dir>/<nom normalisé>.<ext>`
pub fn save_layer(layer: &GeoLayer, format: ExportFormat, dir: &Path) -> Result<SavedFile, GeoError> {
    let content = format.encode(layer)?;
    debug!(layer = %layer.id, format = %format, bytes = content.len(), "Layer encoded");
    save_text(&content, &layer.name, format, dir)
}

/// Écrit un contenu déjà encodé ; `stem` est normalisé avant usage
pub fn save_text(
    content: &str,
    stem: &str,
    format: ExportFormat,
    dir: &Path,
) -> Result<SavedFile, GeoError> {
    let path = dir.join(format!("{}.{}", sanitize_filename(stem), format.extension()));
    let staging = TempFile::new(path.with_extension(format!("{}.part", format.extension())));

    {
        let mut file = fs::File::create(staging.path())?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(staging.path(), &path)?;

    info!(path = %path.display(), bytes = content.len(), mime = format.mime_type(), "Export saved");

    Ok(SavedFile {
        path,
        bytes: content.len(),
        mime: format.mime_type(),
    })
}

/// Fichier temporaire supprimé au drop s'il existe encore
struct TempFile {
    path: PathBuf,
}

impl TempFile {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if !self.path.exists() {
            return;
        }
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "Failed to remove temporary file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geocamadas::{FeatureGeometry, GeoFeature};

    fn layer() -> GeoLayer {
        let mut layer = GeoLayer::new("risco", "Área de Risco #1");
        layer.add_feature(GeoFeature::new("a", "A", FeatureGeometry::Point([-63.9, -8.7])));
        layer
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_save_layer_all_formats() {
        let dir = tempfile::tempdir().unwrap();
        for format in ExportFormat::ALL {
            let saved = save_layer(&layer(), format, dir.path()).unwrap();
            assert_eq!(saved.mime, format.mime_type());
            assert_eq!(saved.bytes, fs::metadata(&saved.path).unwrap().len() as usize);
        }

        assert_eq!(
            entries(dir.path()),
            vec![
                "area_de_risco_1.csv".to_string(),
                "area_de_risco_1.geojson".to_string(),
                "area_de_risco_1.kml".to_string(),
            ]
        );
    }

    #[test]
    fn test_save_text_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        save_text("first", "Nota", ExportFormat::Csv, dir.path()).unwrap();
        let saved = save_text("second", "Nota", ExportFormat::Csv, dir.path()).unwrap();

        assert_eq!(fs::read_to_string(&saved.path).unwrap(), "second");
        assert_eq!(entries(dir.path()), vec!["nota.csv".to_string()]);
    }

    #[test]
    fn test_failed_save_leaves_no_temporary() {
        let dir = tempfile::tempdir().unwrap();
        // La destination est un répertoire : le renommage échoue
        fs::create_dir(dir.path().join("bloqueado.kml")).unwrap();
        fs::write(dir.path().join("bloqueado.kml").join("x"), "x").unwrap();

        let result = save_text("<kml/>", "Bloqueado", ExportFormat::Kml, dir.path());
        assert!(matches!(result, Err(GeoError::Io(_))));
        assert_eq!(entries(dir.path()), vec!["bloqueado.kml".to_string()]);
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = save_text("x", "a", ExportFormat::Csv, &dir.path().join("nope"));
        assert!(result.is_err());
    }
}
