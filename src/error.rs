// ── Central error type ────────────────────────────────────────────────────────
//
// All fallible operations in Cradle return `error::Result<T>`.  No panics
// in production paths; startup errors surface as a native dialog (see
// `platform::win32::window::show_error_dialog`).

/// Every error that Cradle can produce.
#[derive(Debug)]
pub enum CradleError {
    /// A Win32 API call returned a failure code.
    Win32 {
        /// The name of the failing function, for display purposes.
        function: &'static str,
        /// The raw Win32 error code (`GetLastError()` value) or HRESULT.
        code: u32,
    },

    /// The engine DLL loaded but lacks a required export.
    MissingExport {
        /// The unresolved symbol name.
        symbol: &'static str,
    },

    /// The engine's create-view export returned a null surface handle.
    ViewCreation,

    /// A standard I/O error (executable path lookup, config write, …).
    Io(std::io::Error),
}

impl std::fmt::Display for CradleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Win32 { function, code } => {
                write!(f, "{function} failed (error {code:#010x})")
            }
            Self::MissingExport { symbol } => {
                write!(f, "engine DLL is missing required export `{symbol}`")
            }
            Self::ViewCreation => write!(f, "engine failed to create a view surface"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CradleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Win32 { .. } | Self::MissingExport { .. } | Self::ViewCreation => None,
        }
    }
}

impl From<std::io::Error> for CradleError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

// Convert a windows-crate error (HRESULT) directly into a CradleError so that
// `?` can be used on `windows::core::Result<T>` throughout the platform module.
impl From<windows::core::Error> for CradleError {
    fn from(e: windows::core::Error) -> Self {
        // HRESULT.0 is i32; reinterpret bits as u32 for display purposes.
        // Win32 errors appear as 0x8007xxxx HRESULTs.
        Self::Win32 {
            function: "windows",
            code: e.code().0 as u32,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CradleError>;
