use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// A sample item as sensors might publish it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    pub sensor: String,
    pub value: i64,
}

impl Reading {
    pub fn new(sensor: &str, value: i64) -> Self {
        Self {
            sensor: sensor.to_string(),
            value,
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.sensor, self.value)
    }
}

impl FromStr for Reading {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let (sensor, value) = text
            .split_once('=')
            .ok_or_else(|| format!("missing '=' in {:?}", text))?;
        let value = value
            .parse::<i64>()
            .map_err(|error| format!("bad value in {:?}: {}", text, error))?;
        Ok(Self::new(sensor, value))
    }
}
