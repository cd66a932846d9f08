// ── Host window ───────────────────────────────────────────────────────────────
//
// Responsibilities in this file (unsafe confined here):
//   • Register the host window class (explicit object, unregistered on drop).
//   • Create the DPI-scaled top-level window and attach the engine view.
//   • Run the Win32 message loop.
//   • Dispatch WM_DESTROY, WM_DPICHANGED, WM_SIZE, WM_ACTIVATE to the host.
//   • Expose a safe error-dialog helper for use by main().

#![allow(unsafe_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use windows::{
    core::{w, PCWSTR},
    Win32::{
        Foundation::{GetLastError, HINSTANCE, HWND, LPARAM, LRESULT, RECT, WPARAM},
        Graphics::Gdi::{GetStockObject, UpdateWindow, HBRUSH, WHITE_BRUSH},
        System::LibraryLoader::GetModuleHandleW,
        UI::Input::KeyboardAndMouse::SetFocus,
        UI::WindowsAndMessaging::{
            CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetClientRect,
            GetMessageW, LoadCursorW, LoadIconW, MessageBoxW, MoveWindow, PostQuitMessage,
            RegisterClassExW, SetParent, SetWindowPos, ShowWindow, TranslateMessage,
            UnregisterClassW, UpdateWindow, CS_HREDRAW, CS_VREDRAW, HMENU, IDC_ARROW,
            IDI_APPLICATION, MB_ICONERROR, MB_OK, MSG, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOZORDER,
            SW_SHOWNORMAL, WINDOW_EX_STYLE, WM_ACTIVATE, WM_DESTROY, WM_DPICHANGED,
            WM_DWMCOLORIZATIONCOLORCHANGED, WM_NCCREATE, WM_NCDESTROY, WM_SIZE, WNDCLASSEXW,
            WS_OVERLAPPEDWINDOW,
        },
    },
};

use crate::{
    config,
    engine::{Engine, ViewSurface},
    error::{CradleError, Result},
    geometry::{Point, Size},
};

use super::{dpi, registry};

// ── Window identity ───────────────────────────────────────────────────────────

/// Atom name used to register (and later find) the host window class.
const CLASS_NAME: PCWSTR = w!("CradleHostWindow");

// ── Public API ────────────────────────────────────────────────────────────────

/// Register the window class, load the engine, create the host window, and
/// drive the message loop until the user closes the application.
///
/// Records a startup timestamp and logs elapsed time (debug builds only) once
/// the window is first shown on screen.
pub(crate) fn run() -> Result<()> {
    // Startup benchmark harness — only compiled in debug builds so the
    // variable is never unused in release mode.
    #[cfg(debug_assertions)]
    let t0 = std::time::Instant::now();

    // Per-Monitor v2 awareness must precede all window creation.
    dpi::init();

    // SAFETY: GetModuleHandleW(None) returns the .exe's own HMODULE, which is
    // always valid for the process lifetime and never fails in practice.
    let hmodule = unsafe { GetModuleHandleW(None) }.map_err(CradleError::from)?;

    // HINSTANCE and HMODULE represent the same underlying value on Windows
    // (guaranteed by the Win32 ABI).
    let hinstance = HINSTANCE(hmodule.0);

    let class = WindowClass::register(hinstance)?;
    let engine = Rc::new(Engine::load()?);
    let cfg = config::load_or_init();

    let host = HostWindow::new();
    host.set_quit_on_close(cfg.quit_on_close);
    host.create(&class, &engine, &cfg.title, cfg.origin(), cfg.size())?;
    let _ = host.show();

    // Startup milestone — window is now visible on screen.
    #[cfg(debug_assertions)]
    eprintln!(
        "[cradle] window visible in {:.1} ms",
        t0.elapsed().as_secs_f64() * 1000.0
    );

    // Locals drop in reverse order once the loop returns: the host first
    // (plain state), then the engine (FreeLibrary), then the class
    // registration.  The window itself is already gone — quit-on-close is
    // what ended the loop.
    message_loop()
}

/// Show a modal error dialog with the given message.
///
/// Safe to call from any context; performs the UTF-16 conversion internally.
/// Used by `main()` when `run()` returns an error.
pub(crate) fn show_error_dialog(message: &str) {
    let msg_wide: Vec<u16> = message.encode_utf16().chain(std::iter::once(0)).collect();
    let title_wide: Vec<u16> = "Cradle — Fatal Error"
        .encode_utf16()
        .chain(std::iter::once(0))
        .collect();

    // SAFETY: msg_wide and title_wide are valid null-terminated UTF-16 strings
    // that remain allocated for the duration of the MessageBoxW call.
    // HWND::default() (null) means the dialog has no owner window.
    // Return value (button pressed) is intentionally unused for an error dialog.
    unsafe {
        let _ = MessageBoxW(
            HWND::default(),
            PCWSTR(msg_wide.as_ptr()),
            PCWSTR(title_wide.as_ptr()),
            MB_OK | MB_ICONERROR,
        );
    }
}

// ── Window class ──────────────────────────────────────────────────────────────

/// Process-wide registration of the host window class.
///
/// Registered once at startup and passed by reference to every window
/// creation; `Drop` unregisters it after the message loop returns, when all
/// windows of the class are gone.
pub(crate) struct WindowClass {
    hinstance: HINSTANCE,
}

impl WindowClass {
    /// Register the host window class.
    pub(crate) fn register(hinstance: HINSTANCE) -> Result<Self> {
        // SAFETY: LoadIconW with IDI_APPLICATION always succeeds; it loads the
        // built-in application icon resource, which exists on all Windows versions.
        let icon = unsafe { LoadIconW(None, IDI_APPLICATION) }.map_err(CradleError::from)?;

        // SAFETY: LoadCursorW with IDC_ARROW always succeeds; the arrow cursor is
        // a built-in resource guaranteed to exist on all Windows versions.
        let cursor = unsafe { LoadCursorW(None, IDC_ARROW) }.map_err(CradleError::from)?;

        // SAFETY: GetStockObject with WHITE_BRUSH always returns a valid HGDIOBJ.
        // Casting to HBRUSH is correct: stock brush objects are compatible types.
        let bg_brush = unsafe { HBRUSH(GetStockObject(WHITE_BRUSH).0) };

        let wndclass = WNDCLASSEXW {
            // WNDCLASSEXW is ~72 bytes; the cast to u32 is always lossless.
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            // CS_HREDRAW | CS_VREDRAW: repaint on resize.  The engine view
            // covers the client area, so this only affects the brief gap
            // before attachment.
            style: CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(wnd_proc),
            cbClsExtra: 0,
            cbWndExtra: 0,
            hInstance: hinstance,
            hIcon: icon,
            hCursor: cursor,
            hbrBackground: bg_brush,
            lpszMenuName: PCWSTR::null(),
            lpszClassName: CLASS_NAME,
            hIconSm: icon,
        };

        // SAFETY: wndclass is fully initialised with valid handles;
        // CLASS_NAME is a valid null-terminated UTF-16 string literal.
        let atom = unsafe { RegisterClassExW(&wndclass) };
        if atom == 0 {
            return Err(last_error("RegisterClassExW"));
        }

        Ok(Self { hinstance })
    }

    /// The registered class name, for `CreateWindowExW`.
    pub(crate) fn name(&self) -> PCWSTR {
        CLASS_NAME
    }

    pub(crate) fn hinstance(&self) -> HINSTANCE {
        self.hinstance
    }
}

impl Drop for WindowClass {
    fn drop(&mut self) {
        // SAFETY: the class was registered by `register` with this hinstance;
        // every window of the class is destroyed before run() unwinds.
        // UnregisterClassW failure (class still in use) is intentionally ignored.
        unsafe {
            let _ = UnregisterClassW(CLASS_NAME, self.hinstance);
        }
    }
}

// ── HostWindow ────────────────────────────────────────────────────────────────

/// A top-level host window embedding one engine rendering surface.
///
/// All state lives in `Cell`s: Win32 calls made while handling one message
/// (SetWindowPos, DestroyWindow) can synchronously dispatch another message
/// to the same host, so no borrow may be held across any Win32 call.
/// Hosts are shared with the dispatch registry and therefore live behind an
/// `Rc`; everything runs on the UI thread.
pub(crate) struct HostWindow {
    /// The native window, `None` before creation and again after destroy.
    hwnd: Cell<Option<HWND>>,
    /// The engine surface hosted in the client area.  Not owned: Windows
    /// destroys the HWND with the parent, the engine owns the rest.
    child_content: Cell<Option<HWND>>,
    /// Whether destroying this window exits the process.
    quit_on_close: Cell<bool>,
    /// Set at creation so the destroy path can release the view.
    engine: RefCell<Option<Rc<Engine>>>,
}

impl HostWindow {
    /// A fresh host with no native window.
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self {
            hwnd: Cell::new(None),
            child_content: Cell::new(None),
            quit_on_close: Cell::new(false),
            engine: RefCell::new(None),
        })
    }

    /// Create the native window at `origin` with client size `size`, both in
    /// logical units.
    ///
    /// Physical placement is computed from the DPI of the monitor nearest to
    /// `origin` (engine query first, platform fallback), one rounding rule
    /// for all four values.  On success the window has been repainted once
    /// and the engine view is attached; creating over a live window destroys
    /// the previous one first.
    pub(crate) fn create(
        self: &Rc<Self>,
        class: &WindowClass,
        engine: &Rc<Engine>,
        title: &str,
        origin: Point,
        size: Size,
    ) -> Result<()> {
        self.destroy();

        let monitor = dpi::monitor_from_point(origin);
        let dpi = engine
            .dpi_for_monitor(monitor)
            .unwrap_or_else(|| dpi::monitor_dpi(monitor));
        let factor = dpi::scale_factor(dpi);
        let origin = origin.scaled(factor);
        let size = size.scaled(factor);

        let title_wide: Vec<u16> = title.encode_utf16().chain(std::iter::once(0)).collect();

        registry::begin_create(Rc::clone(self));

        // SAFETY: class keeps the registration alive for the call; title_wide
        // is a valid null-terminated UTF-16 string that outlives it.  No
        // creation data is passed — wnd_proc recovers this host from the
        // registry at WM_NCCREATE, which also stores the handle.
        let created = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE(0),
                class.name(),
                PCWSTR(title_wide.as_ptr()),
                WS_OVERLAPPEDWINDOW,
                origin.x,
                origin.y,
                size.width,
                size.height,
                HWND::default(),
                HMENU::default(),
                class.hinstance(),
                None,
            )
        };
        let hwnd = match created {
            Ok(hwnd) => hwnd,
            Err(e) => {
                registry::cancel_create();
                return Err(CradleError::Win32 {
                    function: "CreateWindowExW",
                    code: e.code().0 as u32,
                });
            }
        };

        // SAFETY: hwnd was just created and is owned by this host.
        // UpdateWindow's success BOOL is intentionally ignored.
        unsafe {
            let _ = UpdateWindow(hwnd);
        }

        self.on_create(engine, hwnd)
    }

    /// Show the window at its normal size.
    ///
    /// Returns whether a window exists to show; the underlying call is
    /// treated as always succeeding.
    pub(crate) fn show(&self) -> bool {
        let Some(hwnd) = self.hwnd.get() else {
            return false;
        };
        // SAFETY: hwnd is a live window owned by this host.  ShowWindow's
        // return (previous visibility) is intentionally ignored.
        unsafe {
            let _ = ShowWindow(hwnd, SW_SHOWNORMAL);
        }
        true
    }

    /// Destroy the native window, if one exists.
    ///
    /// Handle invalidation and view teardown run through the destroy
    /// notification that DestroyWindow dispatches before returning.
    pub(crate) fn destroy(&self) {
        if let Some(hwnd) = self.hwnd.get() {
            // SAFETY: hwnd is a live window owned by this host.
            unsafe {
                let _ = DestroyWindow(hwnd);
            }
        }
    }

    /// The native window handle, `None` before creation and after destroy.
    pub(crate) fn window_handle(&self) -> Option<HWND> {
        self.hwnd.get()
    }

    /// Whether destroying this window posts the thread's quit message.
    pub(crate) fn quit_on_close(&self) -> bool {
        self.quit_on_close.get()
    }

    pub(crate) fn set_quit_on_close(&self, quit: bool) {
        self.quit_on_close.set(quit);
    }

    /// Attach the engine surface as this window's child content.
    ///
    /// Reparents the surface, sizes it to exactly fill the current client
    /// area, and hands it focus.
    pub(crate) fn attach_child_content(&self, view: &ViewSurface) {
        let Some(hwnd) = self.hwnd.get() else {
            return;
        };
        let content = view.hwnd();
        self.child_content.set(Some(content));

        // SAFETY: both handles are live; results are intentionally ignored —
        // attachment is treated as always succeeding.
        unsafe {
            let _ = SetParent(content, hwnd);
            if let Ok(frame) = client_area(hwnd) {
                let _ = MoveWindow(
                    content,
                    frame.left,
                    frame.top,
                    frame.right - frame.left,
                    frame.bottom - frame.top,
                    true,
                );
            }
            let _ = SetFocus(content);
        }
    }

    // ── Creation / teardown hooks ─────────────────────────────────────────────

    /// Creation hook: build the engine view sized to the client area and
    /// attach it as the child content surface.
    fn on_create(&self, engine: &Rc<Engine>, hwnd: HWND) -> Result<()> {
        let frame = client_area(hwnd)?;
        let view = engine.create_view(hwnd, frame.right - frame.left, frame.bottom - frame.top)?;
        *self.engine.borrow_mut() = Some(Rc::clone(engine));
        self.attach_child_content(&view);
        Ok(())
    }

    /// Teardown hook: release the engine view.
    ///
    /// The child HWND is already gone (Windows destroys children before the
    /// parent's destroy notification), so only engine-side state remains.
    fn on_destroy(&self) {
        let engine = self.engine.borrow_mut().take();
        let content = self.child_content.take();
        if let (Some(engine), Some(content)) = (engine, content) {
            engine.destroy_view(content);
        }
    }

    // ── Message handling ──────────────────────────────────────────────────────

    /// Handle one message for this host's window.
    ///
    /// Called from `wnd_proc` after registry lookup.
    fn message_handler(&self, hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
        match msg {
            WM_DESTROY => {
                // Invalidate the handle before anything else runs; later
                // resize/activate notifications must see it gone.
                self.hwnd.set(None);
                self.on_destroy();
                if self.quit_on_close.get() {
                    // SAFETY: posts WM_QUIT to this thread's queue; always
                    // safe from a destroy notification.
                    unsafe { PostQuitMessage(0) };
                }
                LRESULT(0)
            }

            WM_DPICHANGED => {
                // The suggested rectangle is already in physical pixels for
                // the new monitor; apply it verbatim rather than re-scaling.
                // SAFETY: for WM_DPICHANGED, lparam points to a RECT valid
                // for the duration of the message.
                let suggested = unsafe { *(lparam.0 as *const RECT) };
                // SAFETY: hwnd is live (messages stop after WM_NCDESTROY);
                // result intentionally ignored.
                unsafe {
                    let _ = SetWindowPos(
                        hwnd,
                        None,
                        suggested.left,
                        suggested.top,
                        suggested.right - suggested.left,
                        suggested.bottom - suggested.top,
                        SWP_NOZORDER | SWP_NOACTIVATE,
                    );
                }
                LRESULT(0)
            }

            WM_SIZE => {
                let _ = self.resize_child_to_client();
                LRESULT(0)
            }

            WM_ACTIVATE => {
                let _ = self.focus_child();
                LRESULT(0)
            }

            // Accent-colour changes repaint nothing here; the engine view
            // repaints itself.
            WM_DWMCOLORIZATIONCOLORCHANGED => LRESULT(0),

            // SAFETY: parameters are forwarded unchanged from wnd_proc.
            _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
        }
    }

    /// Size the child content to exactly fill the client area.
    ///
    /// Returns whether the child was laid out; `false` when the host's
    /// window is gone or no child is attached.
    fn resize_child_to_client(&self) -> bool {
        let (Some(hwnd), Some(content)) = (self.hwnd.get(), self.child_content.get()) else {
            return false;
        };
        let Ok(frame) = client_area(hwnd) else {
            return false;
        };
        // SAFETY: both handles are live.  SWP_NOMOVE keeps the surface
        // anchored at the client origin where attach placed it;
        // SWP_NOACTIVATE avoids focus churn during live resizing.
        unsafe {
            let _ = SetWindowPos(
                content,
                None,
                frame.left,
                frame.top,
                frame.right - frame.left,
                frame.bottom - frame.top,
                SWP_NOMOVE | SWP_NOACTIVATE,
            );
        }
        true
    }

    /// Hand focus to the child content.
    ///
    /// Returns whether focus was transferred; `false` when the host's
    /// window is gone or no child is attached.
    fn focus_child(&self) -> bool {
        if self.hwnd.get().is_none() {
            return false;
        }
        let Some(content) = self.child_content.get() else {
            return false;
        };
        // SAFETY: content is a live child window; the previous-focus return
        // is intentionally ignored.
        unsafe {
            let _ = SetFocus(content);
        }
        true
    }

    fn set_window_handle(&self, hwnd: HWND) {
        self.hwnd.set(Some(hwnd));
    }
}

/// The window's client rectangle (origin is always (0, 0)).
fn client_area(hwnd: HWND) -> Result<RECT> {
    let mut frame = RECT::default();
    // SAFETY: hwnd is valid per caller; &mut frame lives for the call.
    unsafe { GetClientRect(hwnd, &mut frame) }.map_err(CradleError::from)?;
    Ok(frame)
}

// ── Message loop ──────────────────────────────────────────────────────────────

fn message_loop() -> Result<()> {
    let mut msg = MSG::default();

    loop {
        // SAFETY: &mut msg is a valid MSG pointer; HWND::default() retrieves
        // messages for all windows on this thread; 0,0 filter accepts all.
        let ret = unsafe { GetMessageW(&mut msg, HWND::default(), 0, 0) };

        match ret.0 {
            // GetMessageW returns -1 on error.
            -1 => return Err(last_error("GetMessageW")),
            // Returns 0 when WM_QUIT is retrieved — exit the loop cleanly.
            0 => break,
            // Any other value: a normal message to dispatch.
            _ => unsafe {
                // SAFETY: msg was populated by a successful GetMessageW call.
                // TranslateMessage return value (whether it generated WM_CHAR)
                // and DispatchMessageW's LRESULT are intentionally unused.
                let _ = TranslateMessage(&msg);
                let _ = DispatchMessageW(&msg);
            },
        }
    }

    Ok(())
}

// ── Window procedure ──────────────────────────────────────────────────────────

// SAFETY: wnd_proc is registered as lpfnWndProc in WNDCLASSEXW.
// Windows guarantees that hwnd, msg, wparam, and lparam are valid for the
// lifetime of this call.  Host recovery goes through the registry; no
// pointer is ever reinterpreted out of window data.
unsafe extern "system" fn wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if msg == WM_NCCREATE {
        // First message that carries the new handle: bind the staged host.
        // Messages before this one (WM_GETMINMAXINFO) miss the lookup below
        // and take default handling.
        if let Some(host) = registry::bind_pending(hwnd) {
            host.set_window_handle(hwnd);
        }
        return DefWindowProcW(hwnd, msg, wparam, lparam);
    }

    if msg == WM_NCDESTROY {
        // Final message for this window: drop the registry binding.
        registry::remove(hwnd);
        return DefWindowProcW(hwnd, msg, wparam, lparam);
    }

    match registry::lookup(hwnd) {
        Some(host) => host.message_handler(hwnd, msg, wparam, lparam),
        None => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

// ── Error helpers ─────────────────────────────────────────────────────────────

/// Capture the current Win32 last-error code and wrap it in a `CradleError`.
///
/// Call immediately after a Win32 function that signals failure — `GetLastError`
/// reads thread-local state that can be overwritten by any subsequent API call.
fn last_error(function: &'static str) -> CradleError {
    // SAFETY: GetLastError reads thread-local state set by the last Win32 call.
    // It is always safe to call and never fails.
    let code = unsafe { GetLastError() };
    CradleError::Win32 {
        function,
        code: code.0,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_hwnd(value: isize) -> HWND {
        HWND(value as *mut core::ffi::c_void)
    }

    #[test]
    fn new_host_has_no_window() {
        let host = HostWindow::new();
        assert!(host.window_handle().is_none());
        assert!(!host.quit_on_close());
    }

    #[test]
    fn quit_on_close_is_settable() {
        let host = HostWindow::new();
        host.set_quit_on_close(true);
        assert!(host.quit_on_close());
        host.set_quit_on_close(false);
        assert!(!host.quit_on_close());
    }

    #[test]
    fn show_without_window_reports_failure() {
        assert!(!HostWindow::new().show());
    }

    #[test]
    fn destroy_notification_invalidates_the_handle() {
        let host = HostWindow::new();
        host.set_window_handle(fake_hwnd(0x10));
        assert_eq!(host.window_handle(), Some(fake_hwnd(0x10)));

        let result = host.message_handler(fake_hwnd(0x10), WM_DESTROY, WPARAM(0), LPARAM(0));
        assert_eq!(result, LRESULT(0));
        assert!(host.window_handle().is_none());
    }

    #[test]
    fn resize_and_activate_are_noops_after_destroy() {
        let host = HostWindow::new();
        host.set_window_handle(fake_hwnd(0x10));
        host.child_content.set(Some(fake_hwnd(0x20)));

        host.message_handler(fake_hwnd(0x10), WM_DESTROY, WPARAM(0), LPARAM(0));

        assert!(!host.resize_child_to_client());
        assert!(!host.focus_child());
    }

    #[test]
    fn destroy_notification_releases_the_child() {
        let host = HostWindow::new();
        host.set_window_handle(fake_hwnd(0x10));
        host.child_content.set(Some(fake_hwnd(0x20)));

        host.message_handler(fake_hwnd(0x10), WM_DESTROY, WPARAM(0), LPARAM(0));
        assert!(host.child_content.get().is_none());
    }

    #[test]
    fn focus_requires_an_attached_child() {
        let host = HostWindow::new();
        host.set_window_handle(fake_hwnd(0x10));
        assert!(!host.focus_child());
    }

    #[test]
    fn resize_requires_window_and_child() {
        let host = HostWindow::new();
        assert!(!host.resize_child_to_client());

        host.set_window_handle(fake_hwnd(0x10));
        assert!(!host.resize_child_to_client());
    }
}
