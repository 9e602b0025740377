use std::io::ErrorKind;

use eyre::{eyre, Result};
use serde::Deserialize;

/// Name of the optional settings file, searched upwards from the working directory
const SETTINGS_FILE: &str = "reservation-tests.toml";

#[derive(Clone, Deserialize, Default, Debug)]
#[serde(rename_all = "kebab-case")]
pub struct TestSettings {
    #[serde(default)]
    pub engine: EngineKind,

    #[serde(default)]
    pub handler_threads: Option<u16>,
}

/// Engine the test suite runs against
#[derive(Clone, Copy, PartialEq, Eq, Deserialize, Default, Debug)]
#[serde(rename_all = "kebab-case")]
pub enum EngineKind {
    #[default]
    Serializer,
    Locked,
}

impl TestSettings {
    pub fn load() -> Result<Self> {
        let mut path = std::env::current_dir()?;
        let contents = loop {
            path.push(SETTINGS_FILE);

            match std::fs::read_to_string(&path) {
                Ok(s) => break Some(s),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }

            path.pop();
            if !path.pop() {
                break None;
            }
        };

        let mut settings: TestSettings = match contents {
            Some(contents) => toml::from_str(&contents)?,
            None => TestSettings::default(),
        };

        if let Some(v) = std::env::var_os("RESERVATION_ENGINE") {
            if v.eq_ignore_ascii_case("serializer") {
                settings.engine = EngineKind::Serializer;
            } else if v.eq_ignore_ascii_case("locked") {
                settings.engine = EngineKind::Locked;
            } else {
                return Err(eyre!("RESERVATION_ENGINE must be `serializer` or `locked`"));
            }
        }

        Ok(settings)
    }
}
