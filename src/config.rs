// ── Launch configuration ──────────────────────────────────────────────────────
//
// Reads and writes `%APPDATA%\Cradle\window.json`: the window title, logical
// placement, and quit-on-close policy used at startup.
// No `unsafe` — pure safe Rust + serde_json.

use std::{fs, io, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Size};

// ── On-disk types ─────────────────────────────────────────────────────────────

/// Root of the JSON configuration file.
#[derive(Serialize, Deserialize)]
pub(crate) struct ConfigFile {
    pub(crate) version: u32,
    /// Window title.
    #[serde(default = "default_title")]
    pub(crate) title: String,
    /// Logical (96-DPI) origin of the window's top-left corner.
    pub(crate) origin: PointEntry,
    /// Logical size of the created window (outer frame included).
    pub(crate) size: SizeEntry,
    /// Whether closing the window exits the process.
    #[serde(default = "default_true")]
    pub(crate) quit_on_close: bool,
}

#[derive(Serialize, Deserialize)]
pub(crate) struct PointEntry {
    pub(crate) x: i32,
    pub(crate) y: i32,
}

#[derive(Serialize, Deserialize)]
pub(crate) struct SizeEntry {
    pub(crate) width: i32,
    pub(crate) height: i32,
}

fn default_title() -> String {
    "Cradle".to_owned()
}

fn default_true() -> bool {
    true
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            title: default_title(),
            origin: PointEntry { x: 10, y: 10 },
            size: SizeEntry {
                width: 1280,
                height: 720,
            },
            quit_on_close: true,
        }
    }
}

impl ConfigFile {
    /// The configured origin as a logical point.
    pub(crate) fn origin(&self) -> Point {
        Point {
            x: self.origin.x,
            y: self.origin.y,
        }
    }

    /// The configured size as a logical size.
    pub(crate) fn size(&self) -> Size {
        Size {
            width: self.size.width,
            height: self.size.height,
        }
    }
}

// ── Format version ────────────────────────────────────────────────────────────

const CONFIG_VERSION: u32 = 1;

// ── Path ──────────────────────────────────────────────────────────────────────

/// Return the path to the configuration file: `%APPDATA%\Cradle\window.json`.
///
/// Returns `None` if the `APPDATA` environment variable is not set.
pub(crate) fn config_path() -> Option<PathBuf> {
    let appdata = std::env::var_os("APPDATA")?;
    let mut p = PathBuf::from(appdata);
    p.push("Cradle");
    p.push("window.json");
    Some(p)
}

// ── Save ──────────────────────────────────────────────────────────────────────

/// Write the configuration to `%APPDATA%\Cradle\window.json`.
///
/// Creates the `Cradle` directory if it does not exist.
pub(crate) fn save(cfg: &ConfigFile) -> io::Result<()> {
    let path =
        config_path().ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "APPDATA not set"))?;

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }

    let file = fs::File::create(&path)?;
    serde_json::to_writer_pretty(file, cfg).map_err(io::Error::other)
}

// ── Load ──────────────────────────────────────────────────────────────────────

/// Read and parse the configuration file.
///
/// Returns `None` on any error: file missing, JSON parse failure, or an
/// unrecognised version number.
pub(crate) fn load() -> Option<ConfigFile> {
    let path = config_path()?;
    let data = fs::read(&path).ok()?;
    let cfg: ConfigFile = serde_json::from_slice(&data).ok()?;
    if cfg.version != CONFIG_VERSION {
        return None;
    }
    Some(cfg)
}

/// Load the configuration, materialising the defaults on first run.
///
/// A file that exists but cannot be parsed is left untouched; the defaults
/// are used for this launch only.  The first-run write is best-effort — a
/// missing `APPDATA` or an I/O failure still yields a usable in-memory
/// configuration.
pub(crate) fn load_or_init() -> ConfigFile {
    if let Some(cfg) = load() {
        return cfg;
    }
    let cfg = ConfigFile::default();
    if let Some(path) = config_path() {
        if !path.exists() {
            let _ = save(&cfg);
        }
    }
    cfg
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_full_file() {
        let cfg = ConfigFile {
            version: CONFIG_VERSION,
            title: "My App".to_owned(),
            origin: PointEntry { x: 200, y: 120 },
            size: SizeEntry {
                width: 800,
                height: 600,
            },
            quit_on_close: false,
        };
        let json = serde_json::to_string(&cfg).expect("serialize");
        let cfg2: ConfigFile = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(cfg2.version, CONFIG_VERSION);
        assert_eq!(cfg2.title, "My App");
        assert_eq!(cfg2.origin.x, 200);
        assert_eq!(cfg2.origin.y, 120);
        assert_eq!(cfg2.size.width, 800);
        assert_eq!(cfg2.size.height, 600);
        assert!(!cfg2.quit_on_close);
    }

    /// Files written by hand often omit the optional fields; they must parse
    /// with the documented defaults.
    #[test]
    fn optional_fields_default_when_absent() {
        let json = r#"{"version":1,"origin":{"x":0,"y":0},"size":{"width":640,"height":480}}"#;
        let cfg: ConfigFile = serde_json::from_str(json).expect("deserialize minimal file");
        assert_eq!(cfg.title, "Cradle");
        assert!(cfg.quit_on_close, "missing quit_on_close should default to true");
    }

    /// A configuration file with an unrecognised version number must be
    /// rejected by `load()`.  Test the parse-and-check logic directly.
    #[test]
    fn wrong_version_is_rejected() {
        let cfg = ConfigFile {
            version: 99,
            ..ConfigFile::default()
        };
        let json = serde_json::to_string(&cfg).expect("serialize");
        let parsed: ConfigFile = serde_json::from_str(&json).expect("deserialize");
        // load() would return None for this version; assert the condition directly.
        assert_ne!(parsed.version, CONFIG_VERSION);
    }

    #[test]
    fn defaults_match_the_runner_template() {
        let cfg = ConfigFile::default();
        assert_eq!(cfg.version, CONFIG_VERSION);
        assert_eq!(cfg.title, "Cradle");
        assert_eq!(cfg.origin(), Point { x: 10, y: 10 });
        assert_eq!(
            cfg.size(),
            Size {
                width: 1280,
                height: 720
            }
        );
        assert!(cfg.quit_on_close);
    }

    #[test]
    fn geometry_accessors_mirror_entries() {
        let cfg = ConfigFile {
            origin: PointEntry { x: -300, y: 40 },
            size: SizeEntry {
                width: 1024,
                height: 768,
            },
            ..ConfigFile::default()
        };
        assert_eq!(cfg.origin(), Point { x: -300, y: 40 });
        assert_eq!(
            cfg.size(),
            Size {
                width: 1024,
                height: 768
            }
        );
    }
}
