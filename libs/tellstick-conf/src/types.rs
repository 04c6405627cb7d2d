//! Device domain types shared between the cloud client and the conf codec.

/// Parameter names accepted from the cloud and round-tripped through the
/// conf file, in canonical emission order.
pub const PARAMETER_NAMES: [&str; 4] = ["house", "code", "unit", "fade"];

/// The closed set of per-device protocol parameters.
///
/// Absent and empty values are both represented as `None`; `set` enforces
/// this so a device carrying `fade = ""` compares equal to one without
/// `fade` at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceParameters {
    pub house: Option<String>,
    pub code: Option<String>,
    pub unit: Option<String>,
    pub fade: Option<String>,
}

impl DeviceParameters {
    /// Set a parameter by name, matched case-insensitively.
    ///
    /// Returns `false` for unrecognized names, which callers ignore
    /// (unknown cloud or conf data is dropped, not an error). An empty
    /// value clears the parameter.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        let value = value.into();
        let slot = match name.to_ascii_lowercase().as_str() {
            "house" => &mut self.house,
            "code" => &mut self.code,
            "unit" => &mut self.unit,
            "fade" => &mut self.fade,
            _ => return false,
        };
        *slot = if value.is_empty() { None } else { Some(value) };
        true
    }

    /// Present parameters in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        [
            ("house", self.house.as_deref()),
            ("code", self.code.as_deref()),
            ("unit", self.unit.as_deref()),
            ("fade", self.fade.as_deref()),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Copy with empty-string values coerced to `None`.
    ///
    /// `set` already enforces this, but struct literals (tests, future
    /// callers) can bypass it.
    fn normalized(&self) -> DeviceParameters {
        fn clean(v: &Option<String>) -> Option<String> {
            v.as_deref().filter(|s| !s.is_empty()).map(str::to_string)
        }
        DeviceParameters {
            house: clean(&self.house),
            code: clean(&self.code),
            unit: clean(&self.unit),
            fade: clean(&self.fade),
        }
    }
}

/// A device as held by the cloud account or the local conf file.
///
/// `protocol` and `model` keep the casing they were received with; casing
/// only disappears in the normalized projection used for comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub id: i64,
    pub name: String,
    pub protocol: String,
    pub model: String,
    pub parameters: DeviceParameters,
}

impl Device {
    pub fn new(id: i64, name: impl Into<String>, protocol: impl Into<String>) -> Self {
        Device {
            id,
            name: name.into(),
            protocol: protocol.into(),
            model: String::new(),
            parameters: DeviceParameters::default(),
        }
    }

    /// Canonical comparison-only projection: protocol lower-cased, empty
    /// parameters dropped. Never persisted.
    pub fn normalized(&self) -> NormalizedDevice {
        NormalizedDevice {
            id: self.id,
            name: self.name.clone(),
            protocol: self.protocol.to_lowercase(),
            model: self.model.clone(),
            parameters: self.parameters.normalized(),
        }
    }
}

/// Result of [`Device::normalized`]. Two devices are considered unchanged
/// exactly when their `NormalizedDevice` values are equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDevice {
    pub id: i64,
    pub name: String,
    pub protocol: String,
    pub model: String,
    pub parameters: DeviceParameters,
}
