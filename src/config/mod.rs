//! Layered configuration.
//!
//! Configuration is merged field-by-field from these tiers, lowest first:
//! 1. **Defaults** - compiled in
//! 2. **Project** - `$CWD/onboarding/config.yaml`
//! 3. **User** - `~/.onboarding/config.yaml`
//! 4. **Environment** - `ONBOARDING_DB_PATH`
//!
//! ## Environment Variables
//! - `ONBOARDING_CONFIG_PATH` - Explicit config file (skips tier discovery)
//! - `ONBOARDING_DB_PATH` - Database path
//! - `ONBOARDING_USER_DIR` - User config dir (default: `~/.onboarding`)
//! - `ONBOARDING_PROJECT_DIR` - Project config dir (default: `./onboarding`)

mod loader;
mod merge;
mod types;

pub use loader::{ConfigLoader, ConfigPaths, ConfigTier};
pub use merge::deep_merge;
pub use types::*;
