//! Device verbosity when the configuration leaves the level unset
//!
//! Lives in its own test binary: the level is installed once per process, so
//! no other test may build a device first.

use ray_engine::foundation::logging::{self, LOG_LEVEL_ENV};
use ray_engine::prelude::*;

#[test]
fn test_default_config_takes_level_from_environment() {
    std::env::set_var(LOG_LEVEL_ENV, "2");

    let device = Device::new(DeviceConfig::new()).unwrap();
    assert_eq!(device.config().log_level, None);
    assert_eq!(device.verbosity(), 2);
    assert_eq!(logging::verbosity(), 2);
}
