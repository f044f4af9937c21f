use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use flag_features::{identifier_from_path, BatchReport, FeatureStore, FlagAnalysisEngine, FlagError, FlagImage};
use thiserror::Error;
use tracing::{debug, info};

/// File extensions picked up from an input directory
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

#[derive(Error, Debug)]
pub enum FlagCliError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    FlagError(#[from] FlagError),
    #[error("Input path {0} is not a directory")]
    NotADirectory(PathBuf),
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext)))
}

/// Read every image file directly inside `dir`, sorted by file name
pub fn collect_flag_images<P: AsRef<Path>>(dir: P) -> Result<Vec<FlagImage>, FlagCliError> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(FlagCliError::NotADirectory(dir.to_path_buf()));
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_image(path))
        .collect();
    paths.sort();

    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = fs::read(&path)?;
        let identifier = identifier_from_path(&path);
        debug!("Found {} as '{}'", path.display(), identifier);
        images.push(FlagImage::new(identifier, bytes).with_path(path.to_string_lossy()));
    }
    Ok(images)
}

/// Analyse a directory of flags and merge the results into the store at
/// `store_path`. Existing records for other identifiers are kept.
pub fn analyze_directory(
    engine: &FlagAnalysisEngine,
    input: &Path,
    store_path: &Path,
) -> Result<BatchReport, FlagCliError> {
    let images = collect_flag_images(input)?;
    info!("Collected {} images from {}", images.len(), input.display());

    let report = engine.analyze_batch(images);

    let mut store = FeatureStore::open(store_path)?;
    let mut merged: BTreeMap<_, _> = store.records().clone();
    merged.extend(report.records.clone());
    store.save(merged)?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    fn write_flag(dir: &Path, name: &str, colors: [[u8; 3]; 3]) {
        let rgb = RgbImage::from_fn(90, 60, |_, y| Rgb(colors[(y / 20) as usize]));
        rgb.save(dir.join(name)).unwrap();
    }

    #[test]
    fn test_collects_only_images() {
        let dir = TempDir::new().unwrap();
        write_flag(dir.path(), "hu_flag.png", [[206, 41, 57], [255, 255, 255], [71, 112, 80]]);
        write_flag(dir.path(), "de_flag.PNG", [[0, 0, 0], [221, 0, 0], [255, 206, 0]]);
        fs::write(dir.path().join("notes.txt"), "not a flag").unwrap();

        let images = collect_flag_images(dir.path()).unwrap();
        let ids: Vec<_> = images.iter().map(|i| i.identifier.as_str()).collect();
        assert_eq!(ids, vec!["de", "hu"]);
        assert!(images[1].path.as_deref().is_some_and(|p| p.ends_with("hu_flag.png")));
    }

    #[test]
    fn test_rejects_missing_directory() {
        let dir = TempDir::new().unwrap();
        let err = collect_flag_images(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, FlagCliError::NotADirectory(_)));
    }

    #[test]
    fn test_analyze_directory_writes_store() {
        let input = TempDir::new().unwrap();
        write_flag(input.path(), "bw_flag.png", [[0, 0, 0], [255, 255, 255], [0, 0, 0]]);
        fs::write(input.path().join("xx_flag.png"), b"truncated").unwrap();

        let out = TempDir::new().unwrap();
        let store_path = out.path().join("features.json");
        let engine = FlagAnalysisEngine::builder().build().unwrap();

        let report = analyze_directory(&engine, input.path(), &store_path).unwrap();
        assert_eq!(report.records.len(), 1);
        assert!(report.failures.contains_key("xx"));

        let store = FeatureStore::open(&store_path).unwrap();
        assert!(store.records().contains_key("bw"));
        assert!(store.records()["bw"].stripes.has_horizontal_bands);
    }
}
