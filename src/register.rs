use failure::Error;

use crate::config::Config;
use crate::remote::Registry;
use crate::trypod::Trypod;

/// Add every remote mentioned in the config to the registry.
///
/// Returns `false` when nothing was registered. A Trypod remote is only
/// created when its URL is set.
pub fn register(cfg: Config, registry: &mut Registry) -> Result<bool, Error> {
    let Config { general, trypod } = cfg;

    match trypod.filter(|t| !t.url.is_empty()) {
        Some(trypod_cfg) => {
            let remote = Trypod::with_config(trypod_cfg, &general)?;
            registry.register(remote);
            Ok(true)
        }
        None => {
            warn!("No Trypod URL configured, the remote won't be registered");
            Ok(false)
        }
    }
}
