// ── Engine DLL hosting ────────────────────────────────────────────────────────
//
// This is one of exactly two modules where `unsafe` is permitted.
// Every `unsafe` block MUST carry a `// SAFETY:` comment.
//
// ── DLL ownership model ───────────────────────────────────────────────────────
//
// `Engine` owns the single `LoadLibraryExW` call for `cradle_engine.dll` and
// the export pointers resolved from it.  `run()` holds it in an `Rc`; the
// host window keeps a second reference so the destroy path can release the
// view through the engine.  Resolved pointers stay valid for the lifetime of
// `Engine`; `FreeLibrary` runs on `Drop`, after the window (and with it the
// view HWND) is gone.
//
// ── Security note ─────────────────────────────────────────────────────────────
//
// The DLL is loaded by full path (resolved next to the executable) with
// LOAD_WITH_ALTERED_SEARCH_PATH, so the working directory never participates
// in resolution.

#![allow(unsafe_code)]

pub mod abi;

use std::os::windows::ffi::OsStrExt;
use std::path::PathBuf;

use windows::{
    core::{PCSTR, PCWSTR},
    Win32::{
        Foundation::{FreeLibrary, HANDLE, HMODULE, HWND},
        Graphics::Gdi::HMONITOR,
        System::LibraryLoader::{GetProcAddress, LoadLibraryExW, LOAD_WITH_ALTERED_SEARCH_PATH},
    },
};

use crate::error::{CradleError, Result};

// ── DLL identity ──────────────────────────────────────────────────────────────

const DLL_NAME: &str = "cradle_engine.dll";

/// Full path to `cradle_engine.dll`, next to the executable.
fn dll_path() -> Result<PathBuf> {
    let mut p = std::env::current_exe()?;
    p.pop();
    p.push(DLL_NAME);
    Ok(p)
}

/// Resolve `name` from `module`, or fail with `MissingExport`.
///
/// Returns the raw export pointer; callers transmute it to the signature
/// documented in `abi`.
fn resolve(module: HMODULE, name: &'static str) -> Result<unsafe extern "system" fn() -> isize> {
    let symbol: Vec<u8> = name.bytes().chain(std::iter::once(0)).collect();
    // SAFETY: symbol is a null-terminated ASCII export name; module is a live
    // HMODULE owned by the caller.
    unsafe { GetProcAddress(module, PCSTR(symbol.as_ptr())) }
        .ok_or(CradleError::MissingExport { symbol: name })
}

// ── Engine ────────────────────────────────────────────────────────────────────

/// RAII handle to the loaded engine DLL plus its resolved exports.
pub(crate) struct Engine {
    module: HMODULE,
    create_view: abi::CreateViewFn,
    destroy_view: abi::DestroyViewFn,
    /// Absent in engine builds that predate the DPI export.
    monitor_dpi: Option<abi::MonitorDpiFn>,
}

impl Engine {
    /// Load `cradle_engine.dll` and resolve its exports.
    ///
    /// The required exports (`create_view`, `destroy_view`) fail the load
    /// when missing; the DPI export is optional.
    pub(crate) fn load() -> Result<Self> {
        let path = dll_path()?;
        let wide: Vec<u16> = path
            .as_os_str()
            .encode_wide()
            .chain(std::iter::once(0))
            .collect();

        // SAFETY: wide is a valid null-terminated UTF-16 path that outlives
        // the call.  The altered-search-path flag makes resolution of the
        // DLL's own dependencies relative to that path, not the CWD.
        let module = unsafe {
            LoadLibraryExW(
                PCWSTR(wide.as_ptr()),
                HANDLE::default(),
                LOAD_WITH_ALTERED_SEARCH_PATH,
            )
        }
        .map_err(CradleError::from)?;

        let create_view = resolve(module, abi::CREATE_VIEW)?;
        let destroy_view = resolve(module, abi::DESTROY_VIEW)?;
        let monitor_dpi = resolve(module, abi::MONITOR_DPI).ok();

        // SAFETY: each pointer was resolved from the live module and the
        // export signatures are fixed by the embedding ABI (see abi.rs).
        // Transmuting the generic export pointer to its documented signature
        // is the standard GetProcAddress pattern.
        unsafe {
            Ok(Self {
                module,
                create_view: std::mem::transmute::<
                    unsafe extern "system" fn() -> isize,
                    abi::CreateViewFn,
                >(create_view),
                destroy_view: std::mem::transmute::<
                    unsafe extern "system" fn() -> isize,
                    abi::DestroyViewFn,
                >(destroy_view),
                monitor_dpi: monitor_dpi.map(|p| {
                    std::mem::transmute::<unsafe extern "system" fn() -> isize, abi::MonitorDpiFn>(
                        p,
                    )
                }),
            })
        }
    }

    /// Ask the engine for a monitor's effective DPI.
    ///
    /// `None` when the export is absent or answers 0; the caller falls back
    /// to the platform query (`platform::win32::dpi::monitor_dpi`).
    pub(crate) fn dpi_for_monitor(&self, monitor: HMONITOR) -> Option<u32> {
        let query = self.monitor_dpi?;
        // SAFETY: query was resolved from the live module kept loaded by
        // self; the monitor handle is plain data to the callee.
        let dpi = unsafe { query(monitor) };
        if dpi == 0 {
            None
        } else {
            Some(dpi)
        }
    }

    /// Create the rendering surface as a child of `parent`.
    ///
    /// `width`/`height` are physical pixels (the parent's client size).
    pub(crate) fn create_view(&self, parent: HWND, width: i32, height: i32) -> Result<ViewSurface> {
        // SAFETY: pointer resolved from the live module; parent is a valid
        // window handle owned by the caller.
        let hwnd = unsafe { (self.create_view)(parent, width, height) };
        if hwnd == HWND::default() {
            return Err(CradleError::ViewCreation);
        }
        Ok(ViewSurface { hwnd })
    }

    /// Release engine-side state for `view`.
    ///
    /// The child HWND itself is destroyed by Windows with the parent window;
    /// this only tells the engine to drop what it holds for the surface.
    pub(crate) fn destroy_view(&self, view: HWND) {
        // SAFETY: pointer resolved from the live module; the ABI requires
        // the engine to tolerate a view whose HWND is already gone.
        unsafe { (self.destroy_view)(view) };
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        // SAFETY: self.module was returned by a successful LoadLibraryExW and
        // has not been freed since.  All views are already released — the
        // host window tears them down before the last Engine reference drops.
        unsafe {
            let _ = FreeLibrary(self.module);
        }
    }
}

// ── ViewSurface ───────────────────────────────────────────────────────────────

/// A hosted engine rendering surface.
///
/// Does **not** own the engine module or the child HWND — Windows destroys
/// the HWND with the parent window, and engine-side state is released
/// through `Engine::destroy_view`.  The host only positions and focuses it.
pub(crate) struct ViewSurface {
    hwnd: HWND,
}

impl ViewSurface {
    /// The surface handle.  Valid until the parent window is destroyed.
    pub(crate) fn hwnd(&self) -> HWND {
        self.hwnd
    }
}
