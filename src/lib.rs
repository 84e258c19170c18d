//! flagfile
//!
//! Resolves a process's configuration from one optional YAML file. The file
//! may include other files and may spell options by any of their aliases;
//! the result is a flat key/value source meant to sit beneath command-line
//! flags and environment variables.
//!
//! ```no_run
//! use flagfile::descriptor::OptionDescriptor;
//! use flagfile::gate::load_config_file;
//! use flagfile::source::KeyValueSource;
//!
//! let options = [OptionDescriptor::new("listen-http").alias("listen_http")];
//! let source = load_config_file("/etc/app/server.yml".as_ref(), false, &options)?;
//! if source.is_set("listen-http") {
//!     println!("{}", source.get_string("listen-http")?);
//! }
//! # Ok::<(), flagfile::error::ConfigError>(())
//! ```

pub mod cli;
pub mod descriptor;
pub mod error;
pub mod format;
pub mod gate;
pub mod include;
pub mod logging;
pub mod overlay;
pub mod parser;
pub mod source;
pub mod value;
