/// Cradle build script.
///
/// Validates that the host targets Windows and reserves the spot where
/// engine import-library linking would be wired up if the runtime-loading
/// approach is ever replaced.
fn main() {
    // Hard gate: Cradle is Windows-only. Fail loudly on any other target
    // rather than silently producing a broken binary.
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os != "windows" {
        panic!(
            "Cradle only builds for Windows \
             (CARGO_CFG_TARGET_OS = {target_os:?})"
        );
    }

    // Only re-run the build script when it changes.
    println!("cargo:rerun-if-changed=build.rs");

    // ── Engine linkage ────────────────────────────────────────────────────────
    // Integration decision: the UI engine ships as a DLL next to the
    // executable and is loaded at runtime via LoadLibraryExW, so nothing is
    // linked here. Switching to an import library would add the
    // `cargo:rustc-link-lib` / `cargo:rustc-link-search` lines at this spot.
}
