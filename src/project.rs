//! # Projects
//!
//! A project bundles a spec file with the assets it references (source
//! image, fonts). Three layouts are accepted:
//!
//! | Input | Spec file | Assets resolved against |
//! |-------|-----------|-------------------------|
//! | directory | `spec.toml`, else first `*.toml` | the directory |
//! | `*.toml` file | that file | its parent directory |
//! | `*.stamp` / `*.zip` archive | `spec.toml`, else first root `*.toml` | the archive (read in memory) |
//!
//! [`init_project`] creates a starter project and [`pack_project`] bundles a
//! project directory into a `.stamp` archive.

use image::DynamicImage;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::engine::Engine;
use crate::error::StampError;
use crate::spec::Spec;

/// Name of the spec file created by [`init_project`].
pub const SPEC_FILE_NAME: &str = "spec.toml";

/// Spec written by [`init_project`].
pub const DEFAULT_SPEC: &str = r#"stack-size = 1
source-image = ""

[layout]
grid-size = [1, 1]
gap = 0
margin = 0

[[texts]]
template = "Sample Text"
position = [10, 10]
size = 24
color = "black"
"#;

const ZIP_MAGIC: &[u8; 4] = b"PK\x03\x04";

/// Where a project's relative asset paths point.
#[derive(Debug, Clone)]
pub enum Assets {
    /// Files below a directory. Absolute paths are used as-is.
    Directory(PathBuf),
    /// Files of an unpacked archive, keyed by `/`-separated relative path.
    Archive(Arc<BTreeMap<String, Vec<u8>>>),
}

impl Default for Assets {
    fn default() -> Self {
        Assets::Directory(PathBuf::from("."))
    }
}

impl Assets {
    /// Read the asset at `path`.
    pub fn read(&self, path: &str) -> Result<Vec<u8>, StampError> {
        match self {
            Assets::Directory(base) => Ok(std::fs::read(base.join(path))?),
            Assets::Archive(files) => files
                .get(&normalize_entry_name(path))
                .cloned()
                .ok_or_else(|| {
                    StampError::Io(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("'{}' is not in the project archive", path),
                    ))
                }),
        }
    }

    /// Decode the image at `path`.
    pub fn image(&self, path: &str) -> Result<DynamicImage, StampError> {
        let bytes = self.read(path)?;
        Ok(image::load_from_memory(&bytes)?)
    }
}

fn normalize_entry_name(name: &str) -> String {
    let name = name.replace('\\', "/");
    let mut name = name.as_str();
    while let Some(rest) = name.strip_prefix("./") {
        name = rest;
    }
    name.trim_start_matches('/').to_string()
}

/// An opened project.
#[derive(Debug, Clone)]
pub struct Project {
    /// The path the project was opened from.
    pub root: PathBuf,
    /// Name of the spec file within the project.
    pub spec_name: String,
    spec_text: String,
    assets: Assets,
}

impl Project {
    /// Open a project directory, spec file or archive.
    pub fn open(path: &Path) -> Result<Self, StampError> {
        if path.is_dir() {
            return Self::open_directory(path);
        }
        if !path.is_file() {
            return Err(StampError::Config(format!(
                "project path not found: {}",
                path.display()
            )));
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("stamp") | Some("zip") => Self::open_archive(path),
            Some("toml") => Self::open_spec_file(path),
            _ if is_zip(path)? => Self::open_archive(path),
            _ => Err(StampError::Config(format!(
                "unsupported project file: {}",
                path.display()
            ))),
        }
    }

    fn open_directory(dir: &Path) -> Result<Self, StampError> {
        let spec_name = if dir.join(SPEC_FILE_NAME).is_file() {
            SPEC_FILE_NAME.to_string()
        } else {
            let mut tomls: Vec<String> = std::fs::read_dir(dir)?
                .filter_map(|e| e.ok())
                .filter(|e| e.path().is_file())
                .filter_map(|e| e.file_name().to_str().map(str::to_string))
                .filter(|n| n.ends_with(".toml"))
                .collect();
            tomls.sort();
            tomls.into_iter().next().ok_or_else(|| {
                StampError::Config(format!("no spec file found in {}", dir.display()))
            })?
        };

        let spec_text = std::fs::read_to_string(dir.join(&spec_name))?;
        Ok(Self {
            root: dir.to_path_buf(),
            spec_name,
            spec_text,
            assets: Assets::Directory(dir.to_path_buf()),
        })
    }

    fn open_spec_file(path: &Path) -> Result<Self, StampError> {
        let base = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let spec_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(SPEC_FILE_NAME)
            .to_string();

        Ok(Self {
            root: path.to_path_buf(),
            spec_name,
            spec_text: std::fs::read_to_string(path)?,
            assets: Assets::Directory(base),
        })
    }

    fn open_archive(path: &Path) -> Result<Self, StampError> {
        let mut archive = ZipArchive::new(File::open(path)?)?;
        let mut files = BTreeMap::new();
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if !entry.is_file() {
                continue;
            }
            let name = normalize_entry_name(entry.name());
            let mut bytes = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut bytes)?;
            files.insert(name, bytes);
        }

        let spec_name = if files.contains_key(SPEC_FILE_NAME) {
            SPEC_FILE_NAME.to_string()
        } else {
            files
                .keys()
                .find(|n| n.ends_with(".toml") && !n.contains('/'))
                .cloned()
                .ok_or_else(|| {
                    StampError::Config(format!("no spec file found in {}", path.display()))
                })?
        };

        let spec_text = String::from_utf8(files[&spec_name].clone()).map_err(|_| {
            StampError::Config(format!("{} is not valid UTF-8", spec_name))
        })?;

        log::debug!("Opened archive {} ({} files)", path.display(), files.len());
        Ok(Self {
            root: path.to_path_buf(),
            spec_name,
            spec_text,
            assets: Assets::Archive(Arc::new(files)),
        })
    }

    pub fn assets(&self) -> &Assets {
        &self.assets
    }

    pub fn spec_text(&self) -> &str {
        &self.spec_text
    }

    /// Parse and validate the project's spec.
    pub fn spec(&self) -> Result<Spec, StampError> {
        Spec::from_toml_str(&self.spec_text)
    }

    /// Decode the spec's source image.
    pub fn source_image(&self, spec: &Spec) -> Result<DynamicImage, StampError> {
        if spec.source_image.is_empty() {
            return Err(StampError::Config("source-image is not set".into()));
        }
        self.assets.image(&spec.source_image).map_err(|e| match e {
            StampError::Io(io) => StampError::Config(format!(
                "source image '{}' could not be read: {}",
                spec.source_image, io
            )),
            other => other,
        })
    }

    /// Build an engine for this project.
    pub fn engine(&self) -> Result<Engine, StampError> {
        let spec = self.spec()?;
        let source = self.source_image(&spec)?;
        Ok(Engine::new(spec, source).with_assets(self.assets.clone()))
    }
}

fn is_zip(path: &Path) -> Result<bool, StampError> {
    let mut magic = [0u8; 4];
    let mut file = File::open(path)?;
    Ok(file.read_exact(&mut magic).is_ok() && &magic == ZIP_MAGIC)
}

/// Create a new project directory with an `assets/` folder and a starter spec.
///
/// Refuses to overwrite an existing spec file.
pub fn init_project(path: &Path) -> Result<(), StampError> {
    std::fs::create_dir_all(path.join("assets"))?;
    let spec_path = path.join(SPEC_FILE_NAME);
    if spec_path.exists() {
        return Err(StampError::Config(format!(
            "{} already exists",
            spec_path.display()
        )));
    }
    std::fs::write(&spec_path, DEFAULT_SPEC)?;
    Ok(())
}

/// Bundle every file below `source` into a `.stamp` archive at `output`.
pub fn pack_project(source: &Path, output: &Path) -> Result<(), StampError> {
    if !source.is_dir() {
        return Err(StampError::Config(format!(
            "{} is not a directory",
            source.display()
        )));
    }

    let mut files = Vec::new();
    collect_files(source, &mut files)?;
    files.sort();

    let output_abs = std::path::absolute(output)?;
    let mut zip = ZipWriter::new(File::create(output)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in files {
        if std::path::absolute(&path)? == output_abs {
            continue;
        }
        let relative = path.strip_prefix(source).unwrap_or(&path);
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        zip.start_file(name, options)?;
        zip.write_all(&std::fs::read(&path)?)?;
    }
    zip.finish()?;
    Ok(())
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), StampError> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else if path.is_file() {
            files.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};

    fn write_png(path: &Path, w: u32, h: u32) {
        RgbImage::from_pixel(w, h, Rgb([90, 90, 90])).save(path).unwrap();
    }

    fn sample_project(dir: &Path) {
        std::fs::create_dir_all(dir.join("assets")).unwrap();
        write_png(&dir.join("assets/ticket.png"), 20, 10);
        std::fs::write(
            dir.join("spec.toml"),
            r#"
            source-image = "assets/ticket.png"
            [layout]
            grid-size = [2, 1]
            "#,
        )
        .unwrap();
    }

    #[test]
    fn test_open_directory() {
        let dir = tempfile::tempdir().unwrap();
        sample_project(dir.path());
        let project = Project::open(dir.path()).unwrap();
        assert_eq!(project.spec_name, "spec.toml");
        let spec = project.spec().unwrap();
        assert_eq!(project.source_image(&spec).unwrap().width(), 20);
    }

    #[test]
    fn test_open_directory_with_other_spec_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.toml"), "[layout]\ngrid-size = [1, 1]\n").unwrap();
        std::fs::write(dir.path().join("a.toml"), "[layout]\ngrid-size = [2, 2]\n").unwrap();
        let project = Project::open(dir.path()).unwrap();
        assert_eq!(project.spec_name, "a.toml");
        assert_eq!(project.spec().unwrap().layout.grid_area(), 4);
    }

    #[test]
    fn test_open_spec_file_resolves_assets_next_to_it() {
        let dir = tempfile::tempdir().unwrap();
        sample_project(dir.path());
        let project = Project::open(&dir.path().join("spec.toml")).unwrap();
        let spec = project.spec().unwrap();
        assert_eq!(project.source_image(&spec).unwrap().height(), 10);
    }

    #[test]
    fn test_pack_and_open_archive() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("proj");
        sample_project(&source);
        let packed = dir.path().join("proj.stamp");
        pack_project(&source, &packed).unwrap();

        let project = Project::open(&packed).unwrap();
        assert!(matches!(project.assets(), Assets::Archive(_)));
        let spec = project.spec().unwrap();
        assert_eq!(project.source_image(&spec).unwrap().dimensions(), (20, 10));
        assert!(project.assets().read("./assets/ticket.png").is_ok());
    }

    #[test]
    fn test_archive_detected_by_magic() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("proj");
        sample_project(&source);
        let packed = dir.path().join("proj.bin");
        pack_project(&source, &packed).unwrap();
        assert!(Project::open(&packed).is_ok());
    }

    #[test]
    fn test_missing_source_image_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("spec.toml"),
            "source-image = \"nope.png\"\n[layout]\ngrid-size = [1, 1]\n",
        )
        .unwrap();
        let project = Project::open(dir.path()).unwrap();
        let spec = project.spec().unwrap();
        assert!(matches!(
            project.source_image(&spec),
            Err(StampError::Config(_))
        ));
    }

    #[test]
    fn test_init_project() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("new");
        init_project(&target).unwrap();
        assert!(target.join("assets").is_dir());
        let project = Project::open(&target).unwrap();
        let spec = project.spec().unwrap();
        assert_eq!(spec.texts[0].template, "Sample Text");
        assert_eq!(spec.texts[0].size, 24);

        assert!(init_project(&target).is_err());
    }

    #[test]
    fn test_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Project::open(&dir.path().join("absent")),
            Err(StampError::Config(_))
        ));
    }
}
