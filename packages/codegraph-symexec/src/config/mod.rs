//! Engine configuration
//!
//! Two levels:
//! - Preset: `SymexConfig::from_preset(Preset::Fast)`
//! - YAML: `SymexConfig::from_yaml_file("symex.yaml")?` (preset + overrides)
//!
//! ```rust,ignore
//! use codegraph_symexec::config::{Preset, SymexConfig};
//!
//! let config = SymexConfig::from_preset(Preset::Balanced).max_explored_states(50_000);
//! ```

pub mod error;
pub mod io;
pub mod preset;
pub mod symex_config;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use io::{CheckTogglesPatch, ConfigExportV1, ConfigOverrides};
pub use preset::Preset;
pub use symex_config::{CheckToggles, SymexConfig};
pub use validation::Validatable;
