// ── WndProc dispatch registry ─────────────────────────────────────────────────
//
// Maps window handles to their `HostWindow` so `wnd_proc` can recover the
// host by key instead of reinterpreting a pointer smuggled through window
// creation data.  Hosts live on the UI thread only, so storage is
// `thread_local` and needs no locking.
//
// Binding protocol: `begin_create` stages the host, the new handle's
// WM_NCCREATE moves it into the map (`bind_pending`), and the entry stays
// until the final message (`remove` on WM_NCDESTROY).  Messages that precede
// WM_NCCREATE (WM_GETMINMAXINFO) miss the lookup and take default handling.
//
// Every function confines its map borrow to a single expression; no host
// code runs while a borrow is held, so a message dispatched re-entrantly
// from inside a handler can look its host up again without panicking.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use windows::Win32::Foundation::HWND;

use super::window::HostWindow;

thread_local! {
    /// Live hosts keyed by window handle.
    static HOSTS: RefCell<HashMap<isize, Rc<HostWindow>>> = RefCell::new(HashMap::new());
    /// Host staged between CreateWindowExW and its WM_NCCREATE.
    static PENDING: RefCell<Option<Rc<HostWindow>>> = const { RefCell::new(None) };
}

fn key(hwnd: HWND) -> isize {
    hwnd.0 as isize
}

/// Stage `host` for the window about to be created on this thread.
pub(crate) fn begin_create(host: Rc<HostWindow>) {
    PENDING.with(|slot| {
        *slot.borrow_mut() = Some(host);
    });
}

/// Discard the staged host after a failed creation call.
pub(crate) fn cancel_create() {
    PENDING.with(|slot| {
        slot.borrow_mut().take();
    });
}

/// Bind the staged host to its freshly created handle.
///
/// Consumes the pending slot, inserts the host under `hwnd`'s key, and
/// returns it.  `None` when no creation is in flight (a message for some
/// foreign window routed through our class, or a pre-WM_NCCREATE call).
pub(crate) fn bind_pending(hwnd: HWND) -> Option<Rc<HostWindow>> {
    let host = PENDING.with(|slot| slot.borrow_mut().take())?;
    HOSTS.with(|map| {
        map.borrow_mut().insert(key(hwnd), Rc::clone(&host));
    });
    Some(host)
}

/// The host bound to `hwnd`, if any.
pub(crate) fn lookup(hwnd: HWND) -> Option<Rc<HostWindow>> {
    HOSTS.with(|map| map.borrow().get(&key(hwnd)).cloned())
}

/// Drop the binding for `hwnd` (the window's final message).
pub(crate) fn remove(hwnd: HWND) -> Option<Rc<HostWindow>> {
    HOSTS.with(|map| map.borrow_mut().remove(&key(hwnd)))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_hwnd(value: isize) -> HWND {
        HWND(value as *mut core::ffi::c_void)
    }

    #[test]
    fn bind_without_stage_is_none() {
        assert!(bind_pending(fake_hwnd(0x100)).is_none());
    }

    #[test]
    fn staged_host_binds_and_is_found() {
        let host = HostWindow::new();
        begin_create(Rc::clone(&host));

        let bound = bind_pending(fake_hwnd(0x200)).expect("staged host should bind");
        assert!(Rc::ptr_eq(&bound, &host));

        let found = lookup(fake_hwnd(0x200)).expect("bound host should be found");
        assert!(Rc::ptr_eq(&found, &host));
    }

    #[test]
    fn bind_consumes_the_stage() {
        let host = HostWindow::new();
        begin_create(host);
        assert!(bind_pending(fake_hwnd(0x300)).is_some());
        // The slot is empty now; a second window gets nothing.
        assert!(bind_pending(fake_hwnd(0x301)).is_none());
    }

    #[test]
    fn cancel_discards_the_stage() {
        let host = HostWindow::new();
        begin_create(host);
        cancel_create();
        assert!(bind_pending(fake_hwnd(0x400)).is_none());
    }

    #[test]
    fn lookup_misses_unknown_handles() {
        assert!(lookup(fake_hwnd(0x500)).is_none());
    }

    #[test]
    fn remove_clears_the_binding() {
        let host = HostWindow::new();
        begin_create(host);
        bind_pending(fake_hwnd(0x600));

        assert!(remove(fake_hwnd(0x600)).is_some());
        assert!(lookup(fake_hwnd(0x600)).is_none());
        // Removing again is a no-op.
        assert!(remove(fake_hwnd(0x600)).is_none());
    }
}
