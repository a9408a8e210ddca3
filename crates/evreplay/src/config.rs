//! Device-map configuration.
//!
//! The set of devices a session records from (or replays into) is
//! supplied as a TOML file, not inferred from anything. Source index
//! `i` always refers to the `i`-th `[[device]]` entry, which is what
//! makes indices stable for a recording session, and the capability
//! set each output device advertises is part of the same entry rather
//! than being hard-coded against list positions.
//!
//! ```toml
//! input_root = "/dev/input"
//!
//! [[device]]
//! name = "event1"
//! capabilities = ["abs"]
//!
//! [[device]]
//! name = "event3"
//! capabilities = ["key", "rep"]
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use evtap::Capability;

use crate::error::{Error, Result};

/// The device map for one capture or replay session.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceMap {
    /// Directory containing the device nodes.
    #[serde(default = "default_input_root")]
    pub input_root: PathBuf,

    /// Devices in source-index order.
    #[serde(rename = "device", default)]
    pub devices: Vec<DeviceEntry>,
}

/// One device entry: a node name plus the capabilities it advertises
/// when opened for replay output.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceEntry {
    /// Node name under `input_root`, e.g. `event0`.
    pub name: String,

    /// Capability names (`key`, `rel`, `abs`, `rep`).
    #[serde(default)]
    pub capabilities: Vec<String>,
}

fn default_input_root() -> PathBuf {
    PathBuf::from("/dev/input")
}

impl DeviceMap {
    /// Parse a device map from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let map: Self = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        map.validate()?;
        Ok(map)
    }

    /// Load a device map from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml(&text)
    }

    /// Full path of the `index`-th device node.
    #[must_use]
    pub fn device_path(&self, index: usize) -> PathBuf {
        self.input_root.join(&self.devices[index].name)
    }

    fn validate(&self) -> Result<()> {
        if self.devices.is_empty() {
            return Err(Error::Config("no devices configured".to_string()));
        }
        // Surface capability typos at load time, not at replay time
        for entry in &self.devices {
            entry.parsed_capabilities()?;
        }
        Ok(())
    }
}

impl DeviceEntry {
    /// The capability set this device advertises, parsed.
    pub fn parsed_capabilities(&self) -> Result<Vec<Capability>> {
        self.capabilities
            .iter()
            .map(|name| name.parse::<Capability>().map_err(Error::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        input_root = "/dev/input"

        [[device]]
        name = "event1"
        capabilities = ["abs"]

        [[device]]
        name = "event3"
        capabilities = ["key", "rep"]
    "#;

    #[test]
    fn parses_devices_in_order() {
        let map = DeviceMap::from_toml(SAMPLE).unwrap();
        assert_eq!(map.devices.len(), 2);
        assert_eq!(map.devices[0].name, "event1");
        assert_eq!(map.device_path(1), PathBuf::from("/dev/input/event3"));
    }

    #[test]
    fn capabilities_parse_per_entry() {
        let map = DeviceMap::from_toml(SAMPLE).unwrap();
        assert_eq!(
            map.devices[1].parsed_capabilities().unwrap(),
            vec![Capability::Key, Capability::Repeat]
        );
    }

    #[test]
    fn input_root_defaults() {
        let map = DeviceMap::from_toml(
            r#"
            [[device]]
            name = "event0"
            "#,
        )
        .unwrap();
        assert_eq!(map.input_root, PathBuf::from("/dev/input"));
        assert!(map.devices[0].parsed_capabilities().unwrap().is_empty());
    }

    #[test]
    fn unknown_capability_is_a_config_error() {
        let err = DeviceMap::from_toml(
            r#"
            [[device]]
            name = "event0"
            capabilities = ["touch"]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(err.exit_code(), 10);
    }

    #[test]
    fn empty_device_list_is_rejected() {
        let err = DeviceMap::from_toml("input_root = \"/dev/input\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
