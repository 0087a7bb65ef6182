use redox_log::{OutputBuilder, RedoxLogger};

pub fn output_level() -> log::LevelFilter {
    //TODO: adjust with bootloader environment
    log::LevelFilter::Info
}

pub fn file_level() -> log::LevelFilter {
    log::LevelFilter::Debug
}

/// Configures logging for a single gadget driver.
///
/// Console output is always enabled. On Redox the driver additionally gets a plain and an
/// ANSI log file under `category/subcategory`.
#[cfg_attr(not(target_os = "redox"), allow(unused_variables, unused_mut))]
pub fn setup_logging(
    category: &str,
    subcategory: &str,
    logfile_base: &str,
    output_level: log::LevelFilter,
    file_level: log::LevelFilter,
) {
    let mut logger = RedoxLogger::new().with_output(
        OutputBuilder::stderr()
            .with_filter(output_level)
            .with_ansi_escape_codes()
            .flush_on_newline(true)
            .build(),
    );

    #[cfg(target_os = "redox")]
    for (suffix, ansi) in [("log", false), ("ansi.log", true)] {
        match OutputBuilder::in_redox_logging_scheme(
            category,
            subcategory,
            format!("{logfile_base}.{suffix}"),
        ) {
            Ok(b) => {
                let b = b.with_filter(file_level).flush_on_newline(true);
                let b = if ansi { b.with_ansi_escape_codes() } else { b };
                logger = logger.with_output(b.build());
            }
            Err(error) => eprintln!("Failed to create {logfile_base}.{suffix}: {}", error),
        }
    }

    if let Err(error) = logger.enable() {
        eprintln!("{logfile_base}: failed to set default logger: {error}");
    }
}
