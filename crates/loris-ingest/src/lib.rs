pub mod config;
pub mod csv_inspect;
pub mod discovery;
pub mod error;
pub mod manifest;

pub use config::{
    CONFIG_ENV_VAR, PASSWORD_ENV_VAR, USERNAME_ENV_VAR, load_config, resolve_config_path,
    validate_config,
};
pub use csv_inspect::{
    CsvInspection, MANDATORY_COLUMNS, count_rows, inspect_csv, missing_mandatory_columns,
    validate_instrument_file,
};
pub use discovery::{DiscoveryFilter, discover_projects};
pub use error::{InspectError, Result};
pub use manifest::{MANIFEST_FILE, load_manifest, manifest_path};
