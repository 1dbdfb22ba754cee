/*!
This module defines the `Config` struct, which is used to configure creating an array with `dimarray new`.
*/

use anyhow::Result;
use dimarray_attrarray::{AttrKind, AttrValue, Attrs, DType, RequiredAttr, RequiredAttrs};
use std::{collections::BTreeMap, path::Path};

#[derive(Debug, Default, serde::Deserialize)]
pub struct Config {
	pub dtype: Option<DType>,
	pub attrs: Option<BTreeMap<String, AttrValue>>,
	pub required_attrs: Option<BTreeMap<String, AttrKind>>,
}

impl Config {
	pub fn from_path(path: &Path) -> Result<Self> {
		let file = std::fs::File::open(path)?;
		let reader = std::io::BufReader::new(file);
		let config = serde_json::from_reader(reader)?;
		Ok(config)
	}

	/// Build the attribute mapping described by this config. Nothing is validated yet.
	pub fn attrs(&self) -> Attrs {
		let required = self
			.required_attrs
			.iter()
			.flatten()
			.map(|(name, kind)| RequiredAttr::new(name.clone(), *kind));
		let attrs = Attrs::with_required(RequiredAttrs::new(required));
		self.attrs
			.iter()
			.flatten()
			.fold(attrs, |attrs, (name, value)| {
				attrs.with(name.clone(), value.clone())
			})
	}
}

#[test]
fn test_config() {
	let config: Config = serde_json::from_str(
		r#"{
			"dtype": "float32",
			"attrs": { "name": "eeg", "samplerate": 500.0 },
			"required_attrs": { "samplerate": "float" }
		}"#,
	)
	.unwrap();
	assert_eq!(config.dtype, Some(DType::Float32));
	let attrs = config.attrs();
	assert_eq!(attrs.get("name").and_then(AttrValue::as_str), Some("eeg"));
	assert_eq!(attrs.required().len(), 1);
	assert!(attrs.validate().is_ok());
}

#[test]
fn test_empty_config() {
	let config: Config = serde_json::from_str("{}").unwrap();
	assert_eq!(config.dtype, None);
	assert!(config.attrs().is_empty());
	assert!(config.attrs().required().is_empty());
}
