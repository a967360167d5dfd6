//! Named outputs and the combined resolution result.

use gamehost_core::ParamType;
use indexmap::IndexMap;
use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::{ResourceGraph, Value};

/// One resolved output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputValue {
    /// Declared output type.
    #[serde(rename = "type")]
    pub ty: ParamType,
    /// Resolved value.
    pub value: Value,
}

/// Outputs in declaration order. Outputs whose condition was false are absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputSet {
    entries: IndexMap<String, OutputValue>,
}

impl OutputSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, output: OutputValue) {
        self.entries.insert(name.into(), output);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name).map(|o| &o.value)
    }

    /// String form of an output, for the common case of string outputs.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &OutputValue)> {
        self.entries.iter()
    }
}

impl Serialize for OutputSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, output) in &self.entries {
            map.serialize_entry(name, output)?;
        }
        map.end()
    }
}

/// The result of a successful resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    #[serde(flatten)]
    pub graph: ResourceGraph,
    pub outputs: OutputSet,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TemplateMeta;

    #[test]
    fn test_outputs_keep_declaration_order() {
        let mut outputs = OutputSet::new();
        outputs.insert(
            "fqdn",
            OutputValue {
                ty: ParamType::String,
                value: Value::from("mc.eastus.azurecontainer.io"),
            },
        );
        outputs.insert(
            "ipAddress",
            OutputValue {
                ty: ParamType::String,
                value: Value::from("[reference('mc').ipAddress.ip]"),
            },
        );

        let names: Vec<&String> = outputs.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["fqdn", "ipAddress"]);
        assert_eq!(outputs.get_str("fqdn"), Some("mc.eastus.azurecontainer.io"));
    }

    #[test]
    fn test_resolution_serialization_shape() {
        let resolution = Resolution {
            graph: ResourceGraph {
                template: TemplateMeta {
                    name: "pixelmon".into(),
                    version: "1.0.0".into(),
                    description: None,
                },
                resources: Vec::new(),
                excluded: Vec::new(),
            },
            outputs: OutputSet::new(),
        };

        let json = serde_json::to_value(&resolution).unwrap();
        assert_eq!(json["template"]["name"], "pixelmon");
        assert!(json["resources"].as_array().unwrap().is_empty());
        assert!(json["outputs"].as_object().unwrap().is_empty());
    }
}
