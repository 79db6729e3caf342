pub mod delete;
pub mod import;
pub mod schema;
pub mod sync;
pub mod template;

/// Load the layered configuration. Missing files yield the defaults; a
/// present-but-malformed file is a usage defect and ends the process.
pub(crate) fn load_cfg() -> catloc_config::CatLocConfig {
    match catloc_config::load_config() {
        Ok(cfg) => cfg,
        Err(err) => {
            crate::ui_err!("config-invalid", message = err.to_string());
            std::process::exit(2);
        }
    }
}
