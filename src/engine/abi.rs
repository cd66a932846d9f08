// ── Engine embedding ABI ──────────────────────────────────────────────────────
//
// Export names and signatures of the C ABI that `cradle_engine.dll` must
// implement.  All calls use the `system` calling convention and plain handle
// values; nothing here allocates or takes ownership across the boundary.

use windows::Win32::{Foundation::HWND, Graphics::Gdi::HMONITOR};

// ── Export names ──────────────────────────────────────────────────────────────

/// Create the rendering surface as a child of `parent`.  Required.
pub(super) const CREATE_VIEW: &str = "cradle_engine_create_view";
/// Release engine-side state for a surface.  Required.
pub(super) const DESTROY_VIEW: &str = "cradle_engine_destroy_view";
/// Effective DPI for a monitor, 0 if unknown.  Optional export.
pub(super) const MONITOR_DPI: &str = "cradle_engine_monitor_dpi";

// ── Export signatures ─────────────────────────────────────────────────────────

/// `cradle_engine_create_view(parent, width, height) -> view`
///
/// `width`/`height` are physical pixels.  Returns the surface HWND, or null
/// on failure.  The HWND belongs to Windows (destroyed with the parent);
/// engine-side state belongs to the engine until `cradle_engine_destroy_view`.
pub(super) type CreateViewFn =
    unsafe extern "system" fn(parent: HWND, width: i32, height: i32) -> HWND;

/// `cradle_engine_destroy_view(view)`
///
/// Releases engine-side state.  Must tolerate a `view` whose HWND Windows
/// has already destroyed as part of parent-window teardown.
pub(super) type DestroyViewFn = unsafe extern "system" fn(view: HWND);

/// `cradle_engine_monitor_dpi(monitor) -> dpi`
///
/// Returns 0 when the engine cannot answer; the host then falls back to the
/// platform DPI query.
pub(super) type MonitorDpiFn = unsafe extern "system" fn(monitor: HMONITOR) -> u32;
