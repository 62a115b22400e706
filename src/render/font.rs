//! Font resolution for ticket text.
//!
//! Each text element names an optional TrueType file. Fonts are resolved when
//! a renderer is built, following a fixed chain:
//!
//! 1. the requested file, looked up in the project assets, then by file name
//!    in the configured search directories;
//! 2. the platform default face (the first of [`FontConfig::fallback_faces`]
//!    found in the search directories);
//! 3. the bundled Spleen 12×24 bitmap face, scaled to the requested size.
//!
//! [`FontBook`] memoizes the result per `(reference, size)`.

use ab_glyph::FontArc;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::project::Assets;

/// How deep to descend into font directories.
const MAX_SEARCH_DEPTH: usize = 4;

/// Where to look for fonts that are not project assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontConfig {
    /// Directories searched (recursively) by file name.
    pub search_dirs: Vec<PathBuf>,
    /// File names tried, in order, for the platform default face.
    pub fallback_faces: Vec<String>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            search_dirs: platform_font_dirs(),
            fallback_faces: ["Arial.ttf", "arial.ttf", "DejaVuSans.ttf", "LiberationSans-Regular.ttf"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl FontConfig {
    /// A configuration that never touches system fonts.
    pub fn bundled_only() -> Self {
        Self {
            search_dirs: Vec::new(),
            fallback_faces: Vec::new(),
        }
    }

    /// Search `dirs` before the configured directories.
    pub fn with_dirs_first(mut self, dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut search_dirs: Vec<PathBuf> = dirs.into_iter().collect();
        search_dirs.append(&mut self.search_dirs);
        self.search_dirs = search_dirs;
        self
    }
}

fn platform_font_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if cfg!(target_os = "macos") {
        dirs.push(PathBuf::from("/Library/Fonts"));
        dirs.push(PathBuf::from("/System/Library/Fonts"));
    } else if cfg!(target_os = "windows") {
        dirs.push(PathBuf::from(r"C:\Windows\Fonts"));
    } else {
        dirs.push(PathBuf::from("/usr/share/fonts"));
        dirs.push(PathBuf::from("/usr/local/share/fonts"));
    }
    if let Some(home) = std::env::var_os("HOME") {
        let home = PathBuf::from(home);
        dirs.push(home.join(".fonts"));
        dirs.push(home.join(".local/share/fonts"));
        dirs.push(home.join("Library/Fonts"));
    }
    dirs
}

/// A loaded typeface.
#[derive(Clone)]
pub enum Face {
    /// TrueType/OpenType outlines.
    Outline(FontArc),
    /// The bundled Spleen bitmap font.
    Bitmap,
}

impl std::fmt::Debug for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Face::Outline(_) => f.write_str("Face::Outline"),
            Face::Bitmap => f.write_str("Face::Bitmap"),
        }
    }
}

/// A face at a specific em size in pixels.
#[derive(Debug, Clone)]
pub struct FontHandle {
    pub face: Face,
    pub size: u32,
}

/// Memoizing font resolver for one generation run.
pub struct FontBook {
    config: FontConfig,
    assets: Assets,
    faces: HashMap<Option<String>, Face>,
    handles: HashMap<(Option<String>, u32), FontHandle>,
}

impl FontBook {
    pub fn new(config: FontConfig, assets: Assets) -> Self {
        Self {
            config,
            assets,
            faces: HashMap::new(),
            handles: HashMap::new(),
        }
    }

    /// Resolve `reference` (a font file, or `None` for the default) at `size`.
    pub fn resolve(&mut self, reference: Option<&str>, size: u32) -> FontHandle {
        let key = (reference.map(str::to_string), size);
        if let Some(handle) = self.handles.get(&key) {
            return handle.clone();
        }

        let face = self.face(reference);
        let handle = FontHandle { face, size };
        self.handles.insert(key, handle.clone());
        handle
    }

    fn face(&mut self, reference: Option<&str>) -> Face {
        let key = reference.map(str::to_string);
        if let Some(face) = self.faces.get(&key) {
            return face.clone();
        }

        let face = match reference {
            Some(name) => match self.load_requested(name) {
                Some(font) => Face::Outline(font),
                None => {
                    log::warn!("Font '{}' could not be loaded; using the default font", name);
                    self.face(None)
                }
            },
            None => match self.load_platform_default() {
                Some(font) => Face::Outline(font),
                None => {
                    log::warn!("No platform default font found; using the bundled bitmap font");
                    Face::Bitmap
                }
            },
        };

        self.faces.insert(key, face.clone());
        face
    }

    fn load_requested(&self, name: &str) -> Option<FontArc> {
        if let Ok(bytes) = self.assets.read(name)
            && let Some(font) = parse_font(name, bytes)
        {
            return Some(font);
        }

        let file_name = Path::new(name).file_name()?.to_str()?;
        let path = find_in_dirs(&self.config.search_dirs, file_name)?;
        load_font_file(&path)
    }

    fn load_platform_default(&self) -> Option<FontArc> {
        self.config.fallback_faces.iter().find_map(|name| {
            let path = find_in_dirs(&self.config.search_dirs, name)?;
            log::debug!("Default font: {}", path.display());
            load_font_file(&path)
        })
    }
}

fn load_font_file(path: &Path) -> Option<FontArc> {
    match std::fs::read(path) {
        Ok(bytes) => parse_font(&path.display().to_string(), bytes),
        Err(e) => {
            log::warn!("Failed to read font {}: {}", path.display(), e);
            None
        }
    }
}

fn parse_font(name: &str, bytes: Vec<u8>) -> Option<FontArc> {
    match FontArc::try_from_vec(bytes) {
        Ok(font) => Some(font),
        Err(e) => {
            log::warn!("Failed to parse font {}: {}", name, e);
            None
        }
    }
}

/// Depth-limited search for a file name (ASCII case-insensitive).
fn find_in_dirs(dirs: &[PathBuf], file_name: &str) -> Option<PathBuf> {
    let mut pending: Vec<(PathBuf, usize)> = dirs.iter().map(|d| (d.clone(), 0)).collect();
    pending.reverse();

    while let Some((dir, depth)) = pending.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        let mut entries: Vec<PathBuf> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
        entries.sort();

        for path in &entries {
            let matches = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.eq_ignore_ascii_case(file_name));
            if matches && path.is_file() {
                return Some(path.clone());
            }
        }
        if depth < MAX_SEARCH_DEPTH {
            for path in entries.into_iter().rev().filter(|p| p.is_dir()) {
                pending.push((path, depth + 1));
            }
        }
    }
    None
}
