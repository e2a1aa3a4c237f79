//! Configuration: runtime settings, default locations, the XML file and validation.
//! Precedence is defaults < config.xml < command-line flags.

pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use paths::{
    CONFIG_ENV, default_config_path, default_log_path, path_has_symlink_ancestor,
};
pub use types::{Config, LogLevel};
pub use validate::validate_paths;
pub use xml::{create_template_config, load_config_file};
