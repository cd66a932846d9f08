#![allow(unsafe_code)]

use windows::Win32::{
    Foundation::POINT,
    Graphics::Gdi::{MonitorFromPoint, HMONITOR, MONITOR_DEFAULTTONEAREST},
    UI::HiDpi::{
        GetDpiForMonitor, GetDpiForSystem, SetProcessDpiAwarenessContext,
        DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2, MDT_EFFECTIVE_DPI,
    },
};

use crate::geometry::Point;

pub(crate) const BASE_DPI: u32 = 96;

/// The logical→physical scale factor for a monitor reporting `dpi`.
pub(crate) fn scale_factor(dpi: u32) -> f64 {
    f64::from(dpi) / f64::from(BASE_DPI)
}

/// Opt into Per-Monitor v2 DPI awareness.
/// MUST be called before any window is created on the calling thread.
/// V2 also scales the non-client area automatically, so no per-window
/// opt-in is needed at creation time.
pub(crate) fn init() {
    // SAFETY: Must precede all window creation; single call at process start.
    unsafe {
        let _ = SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2);
    }
}

/// The monitor nearest to a logical origin point.
///
/// Used before any window exists; the nearest-monitor flag means an
/// off-screen origin still resolves to a real monitor.
pub(crate) fn monitor_from_point(origin: Point) -> HMONITOR {
    let pt = POINT {
        x: origin.x,
        y: origin.y,
    };
    // SAFETY: MonitorFromPoint takes the point by value and, with the
    // nearest flag, always returns a valid monitor handle.
    unsafe { MonitorFromPoint(pt, MONITOR_DEFAULTTONEAREST) }
}

/// Effective DPI of `monitor`.  Falls back to the system DPI, then to
/// BASE_DPI (96), so a scale factor can always be derived.
pub(crate) fn monitor_dpi(monitor: HMONITOR) -> u32 {
    let mut dpi_x = 0u32;
    let mut dpi_y = 0u32;
    // SAFETY: monitor is a valid handle from MonitorFromPoint; the out
    // pointers reference live locals for the duration of the call.
    let queried = unsafe { GetDpiForMonitor(monitor, MDT_EFFECTIVE_DPI, &mut dpi_x, &mut dpi_y) };
    if queried.is_ok() && dpi_x != 0 {
        return dpi_x;
    }
    // SAFETY: GetDpiForSystem takes no parameters and always succeeds on Win10+.
    let system = unsafe { GetDpiForSystem() };
    if system == 0 {
        BASE_DPI
    } else {
        system
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_dpi_is_identity_factor() {
        assert_eq!(scale_factor(BASE_DPI), 1.0);
    }

    #[test]
    fn common_monitor_dpis() {
        assert_eq!(scale_factor(120), 1.25);
        assert_eq!(scale_factor(144), 1.5);
        assert_eq!(scale_factor(192), 2.0);
    }
}
