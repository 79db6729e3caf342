use std::{env, fs, path::Path};

/// Discovers the bundled UI locales at build time: every subdirectory of
/// `i18n/` holding at least one `.ftl` file becomes an entry in the generated
/// `SUPPORTED_LOCALES` slice. No FTL parsing happens here; i18n-embed does the
/// real loading at runtime. Each translation file gets its own
/// `rerun-if-changed` trigger so edits retrigger the build.
fn main() {
    let crate_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let i18n_dir = Path::new(&crate_dir).join("i18n");

    let mut locales: Vec<String> = Vec::new();
    if let Ok(entries) = fs::read_dir(&i18n_dir) {
        for entry in entries.flatten() {
            if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }
            let mut has_ftl = false;
            if let Ok(files) = fs::read_dir(entry.path()) {
                for file in files.flatten() {
                    let is_ftl = file
                        .path()
                        .extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("ftl"));
                    if is_ftl {
                        has_ftl = true;
                        cargo_emit::rerun_if_changed!(file.path().to_string_lossy());
                    }
                }
            }
            if has_ftl {
                locales.push(entry.file_name().to_string_lossy().to_string());
            }
        }
    }

    // Deterministic order keeps the generated file stable across builds.
    locales.sort();

    let out_dir = env::var("OUT_DIR").unwrap();
    let dst = Path::new(&out_dir).join("supported_locales.rs");
    let body = format!(
        "pub static SUPPORTED_LOCALES: &[&str] = &{:?};",
        locales.iter().map(String::as_str).collect::<Vec<_>>()
    );
    fs::write(dst, body).unwrap();

    cargo_emit::rerun_if_changed!("i18n/");
    cargo_emit::rerun_if_changed!("build.rs");
}
