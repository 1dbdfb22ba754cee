/*!
This module defines the attribute mapping carried by every array. Attributes are arbitrary named values. Some of them may be declared required, in which case they must be present with a value of the declared kind for as long as the mapping lives.
*/

use crate::error::AttrError;
use std::collections::BTreeMap;

/// The reserved name under which the required attributes are exposed. It can never be assigned.
pub const REQUIRED_ATTRS_KEY: &str = "_required_attrs";

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
	None,
	Bool(bool),
	Int(i64),
	Float(f64),
	Str(String),
	List(Vec<AttrValue>),
	Map(BTreeMap<String, AttrValue>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttrKind {
	Any,
	None,
	Bool,
	Int,
	Float,
	Str,
	List,
	Map,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RequiredAttr {
	pub name: String,
	pub kind: AttrKind,
}

/// The attributes every instance must carry. There is no way to mutate this after it is built.
#[derive(Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "Vec<RequiredAttr>", into = "Vec<RequiredAttr>")]
pub struct RequiredAttrs {
	attrs: Vec<RequiredAttr>,
	/// The value read back under `_required_attrs`, a map from each name to its kind.
	value: AttrValue,
}

/// Attributes are kept sorted by name, so iteration and serialization do not follow insertion order.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Attrs {
	values: BTreeMap<String, AttrValue>,
	required: RequiredAttrs,
}

impl AttrValue {
	pub fn kind(&self) -> AttrKind {
		match self {
			AttrValue::None => AttrKind::None,
			AttrValue::Bool(_) => AttrKind::Bool,
			AttrValue::Int(_) => AttrKind::Int,
			AttrValue::Float(_) => AttrKind::Float,
			AttrValue::Str(_) => AttrKind::Str,
			AttrValue::List(_) => AttrKind::List,
			AttrValue::Map(_) => AttrKind::Map,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			AttrValue::Bool(value) => Some(*value),
			_ => None,
		}
	}

	pub fn as_i64(&self) -> Option<i64> {
		match self {
			AttrValue::Int(value) => Some(*value),
			_ => None,
		}
	}

	/// Integers are widened.
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			AttrValue::Int(value) => Some(*value as f64),
			AttrValue::Float(value) => Some(*value),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			AttrValue::Str(value) => Some(value),
			_ => None,
		}
	}
}

impl From<bool> for AttrValue {
	fn from(value: bool) -> Self {
		AttrValue::Bool(value)
	}
}

impl From<i32> for AttrValue {
	fn from(value: i32) -> Self {
		AttrValue::Int(value.into())
	}
}

impl From<i64> for AttrValue {
	fn from(value: i64) -> Self {
		AttrValue::Int(value)
	}
}

impl From<f32> for AttrValue {
	fn from(value: f32) -> Self {
		AttrValue::Float(value.into())
	}
}

impl From<f64> for AttrValue {
	fn from(value: f64) -> Self {
		AttrValue::Float(value)
	}
}

impl From<&str> for AttrValue {
	fn from(value: &str) -> Self {
		AttrValue::Str(value.to_owned())
	}
}

impl From<String> for AttrValue {
	fn from(value: String) -> Self {
		AttrValue::Str(value)
	}
}

impl<T> From<Vec<T>> for AttrValue
where
	T: Into<AttrValue>,
{
	fn from(value: Vec<T>) -> Self {
		AttrValue::List(value.into_iter().map(Into::into).collect())
	}
}

impl<T> From<Option<T>> for AttrValue
where
	T: Into<AttrValue>,
{
	fn from(value: Option<T>) -> Self {
		value.map(Into::into).unwrap_or(AttrValue::None)
	}
}

impl AttrKind {
	pub fn accepts(self, value: &AttrValue) -> bool {
		self == AttrKind::Any || self == value.kind()
	}
}

impl std::fmt::Display for AttrKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let kind = match self {
			AttrKind::Any => "any",
			AttrKind::None => "none",
			AttrKind::Bool => "bool",
			AttrKind::Int => "int",
			AttrKind::Float => "float",
			AttrKind::Str => "str",
			AttrKind::List => "list",
			AttrKind::Map => "map",
		};
		write!(f, "{}", kind)
	}
}

impl RequiredAttr {
	pub fn new(name: impl Into<String>, kind: AttrKind) -> Self {
		Self {
			name: name.into(),
			kind,
		}
	}
}

impl RequiredAttrs {
	pub fn new(required: impl IntoIterator<Item = RequiredAttr>) -> Self {
		let mut attrs: Vec<RequiredAttr> = Vec::new();
		for attr in required {
			match attrs.iter_mut().find(|existing| existing.name == attr.name) {
				Some(existing) => existing.kind = attr.kind,
				None => attrs.push(attr),
			}
		}
		let value = AttrValue::Map(
			attrs
				.iter()
				.map(|attr| (attr.name.clone(), AttrValue::from(attr.kind.to_string())))
				.collect(),
		);
		Self { attrs, value }
	}

	pub fn get(&self, name: &str) -> Option<&RequiredAttr> {
		self.attrs.iter().find(|attr| attr.name == name)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.get(name).is_some()
	}

	pub fn iter(&self) -> impl Iterator<Item = &RequiredAttr> {
		self.attrs.iter()
	}

	pub fn len(&self) -> usize {
		self.attrs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.attrs.is_empty()
	}

	pub fn as_value(&self) -> &AttrValue {
		&self.value
	}

	/// Requirements of `other` not already declared here are appended.
	fn union(&self, other: &RequiredAttrs) -> RequiredAttrs {
		let mut attrs = self.attrs.clone();
		for attr in other.iter() {
			if !self.contains(&attr.name) {
				attrs.push(attr.clone());
			}
		}
		RequiredAttrs::new(attrs)
	}
}

impl Default for RequiredAttrs {
	fn default() -> Self {
		RequiredAttrs::new(Vec::new())
	}
}

impl std::fmt::Debug for RequiredAttrs {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("RequiredAttrs").field(&self.attrs).finish()
	}
}

impl From<Vec<RequiredAttr>> for RequiredAttrs {
	fn from(attrs: Vec<RequiredAttr>) -> Self {
		RequiredAttrs::new(attrs)
	}
}

impl From<RequiredAttrs> for Vec<RequiredAttr> {
	fn from(required: RequiredAttrs) -> Self {
		required.attrs
	}
}

impl Attrs {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_required(required: RequiredAttrs) -> Self {
		Self {
			values: BTreeMap::new(),
			required,
		}
	}

	/// Add an attribute while building a mapping. Nothing is checked until the mapping is attached to an array, see [`Attrs::validate`].
	pub fn with(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
		self.values.insert(name.into(), value.into());
		self
	}

	/// The reserved name always resolves to the required attributes. It is never yielded by [`Attrs::iter`].
	pub fn get(&self, name: &str) -> Option<&AttrValue> {
		if name == REQUIRED_ATTRS_KEY {
			return Some(self.required.as_value());
		}
		self.values.get(name)
	}

	pub fn contains(&self, name: &str) -> bool {
		name == REQUIRED_ATTRS_KEY || self.values.contains_key(name)
	}

	pub fn set(
		&mut self,
		name: impl Into<String>,
		value: impl Into<AttrValue>,
	) -> Result<Option<AttrValue>, AttrError> {
		let name = name.into();
		let value = value.into();
		if name == REQUIRED_ATTRS_KEY {
			return Err(AttrError::ReadOnly(name));
		}
		if let Some(required) = self.required.get(&name) {
			check_kind(required, &value)?;
		}
		Ok(self.values.insert(name, value))
	}

	pub fn remove(&mut self, name: &str) -> Result<Option<AttrValue>, AttrError> {
		if name == REQUIRED_ATTRS_KEY {
			return Err(AttrError::ReadOnly(name.to_owned()));
		}
		if self.required.contains(name) {
			return Err(AttrError::RequiredRemoval(name.to_owned()));
		}
		Ok(self.values.remove(name))
	}

	pub fn required(&self) -> &RequiredAttrs {
		&self.required
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
		self.values.iter().map(|(name, value)| (name.as_str(), value))
	}

	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.values.keys().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	/// Check that the reserved name was not assigned and that every required attribute is present with a value of its declared kind.
	pub fn validate(&self) -> Result<(), AttrError> {
		if self.values.contains_key(REQUIRED_ATTRS_KEY) {
			return Err(AttrError::ReadOnly(REQUIRED_ATTRS_KEY.to_owned()));
		}
		for required in self.required.iter() {
			match self.values.get(&required.name) {
				Some(value) => check_kind(required, value)?,
				None => return Err(AttrError::MissingRequired(required.name.clone())),
			}
		}
		Ok(())
	}

	/// Copy this mapping, then apply `overrides` on top of it. The result requires everything either side requires.
	pub fn merge(&self, overrides: &Attrs) -> Result<Attrs, AttrError> {
		let mut merged = Attrs {
			values: self.values.clone(),
			required: self.required.union(&overrides.required),
		};
		for (name, value) in overrides.iter() {
			merged.set(name, value.clone())?;
		}
		merged.validate()?;
		Ok(merged)
	}
}

impl<K, V> std::iter::FromIterator<(K, V)> for Attrs
where
	K: Into<String>,
	V: Into<AttrValue>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		iter.into_iter()
			.fold(Attrs::new(), |attrs, (name, value)| attrs.with(name, value))
	}
}

fn check_kind(required: &RequiredAttr, value: &AttrValue) -> Result<(), AttrError> {
	if required.kind.accepts(value) {
		Ok(())
	} else {
		Err(AttrError::WrongKind {
			name: required.name.clone(),
			expected: required.kind,
			found: value.kind(),
		})
	}
}

#[test]
fn test_set_and_get() {
	let mut attrs = Attrs::new().with("name", "randvals");
	assert_eq!(attrs.get("name").and_then(AttrValue::as_str), Some("randvals"));
	assert_eq!(attrs.set("custom", "attribute"), Ok(None));
	assert_eq!(
		attrs.get("custom").and_then(AttrValue::as_str),
		Some("attribute")
	);
	assert_eq!(attrs.get("missing"), None);
	assert_eq!(
		attrs.set(REQUIRED_ATTRS_KEY, "test"),
		Err(AttrError::ReadOnly(REQUIRED_ATTRS_KEY.to_owned()))
	);
	assert_eq!(
		attrs.remove(REQUIRED_ATTRS_KEY),
		Err(AttrError::ReadOnly(REQUIRED_ATTRS_KEY.to_owned()))
	);
	assert!(attrs.contains(REQUIRED_ATTRS_KEY));
	assert_eq!(attrs.get(REQUIRED_ATTRS_KEY), Some(&AttrValue::Map(BTreeMap::new())));
	assert!(attrs.names().all(|name| name != REQUIRED_ATTRS_KEY));
}

#[test]
fn test_reserved_name_in_builder() {
	let attrs = Attrs::new().with(REQUIRED_ATTRS_KEY, vec!["name"]);
	assert_eq!(
		attrs.validate(),
		Err(AttrError::ReadOnly(REQUIRED_ATTRS_KEY.to_owned()))
	);
}

#[test]
fn test_required() {
	let required = RequiredAttrs::new(vec![RequiredAttr::new("samplerate", AttrKind::Float)]);
	let attrs = Attrs::with_required(required.clone());
	assert_eq!(
		attrs.validate(),
		Err(AttrError::MissingRequired("samplerate".to_owned()))
	);
	let mut attrs = Attrs::with_required(required).with("samplerate", 500.0);
	assert_eq!(attrs.validate(), Ok(()));
	assert_eq!(
		attrs.set("samplerate", "fast"),
		Err(AttrError::WrongKind {
			name: "samplerate".to_owned(),
			expected: AttrKind::Float,
			found: AttrKind::Str,
		})
	);
	assert_eq!(
		attrs.remove("samplerate"),
		Err(AttrError::RequiredRemoval("samplerate".to_owned()))
	);
	assert_eq!(attrs.get("samplerate").and_then(AttrValue::as_f64), Some(500.0));
	let mut expected = BTreeMap::new();
	expected.insert("samplerate".to_owned(), AttrValue::from("float"));
	assert_eq!(attrs.get(REQUIRED_ATTRS_KEY), Some(&AttrValue::Map(expected)));
}

#[test]
fn test_required_serde() {
	let required: RequiredAttrs = serde_json::from_str(
		r#"[{"name": "name", "kind": "str"}, {"name": "name", "kind": "any"}]"#,
	)
	.unwrap();
	assert_eq!(required.len(), 1);
	assert_eq!(required.get("name").map(|attr| attr.kind), Some(AttrKind::Any));
	let json = serde_json::to_string(&required).unwrap();
	assert_eq!(json, r#"[{"name":"name","kind":"any"}]"#);
	let restored: RequiredAttrs = serde_json::from_str(&json).unwrap();
	assert_eq!(restored, required);
	assert_eq!(restored.as_value(), required.as_value());
}

#[test]
fn test_merge() {
	let source = Attrs::new().with("name", "list").with("test1", 33);
	let overrides = Attrs::new().with("newname", "attrarray").with("test1", 44);
	let merged = source.merge(&overrides).unwrap();
	assert_eq!(merged.get("name").and_then(AttrValue::as_str), Some("list"));
	assert_eq!(
		merged.get("newname").and_then(AttrValue::as_str),
		Some("attrarray")
	);
	assert_eq!(merged.get("test1").and_then(AttrValue::as_i64), Some(44));
	// The source is untouched.
	assert_eq!(source.get("test1").and_then(AttrValue::as_i64), Some(33));
	assert!(!source.contains("newname"));
}

#[test]
fn test_debug() {
	let attrs: Attrs = vec![("name", AttrValue::from("randvals")), ("test1", 33.into())]
		.into_iter()
		.collect();
	insta::assert_debug_snapshot!(attrs, @r###"
 Attrs {
     values: {
         "name": Str(
             "randvals",
         ),
         "test1": Int(
             33,
         ),
     },
     required: RequiredAttrs(
         [],
     ),
 }
 "###);
}

#[test]
fn test_value_from_json() {
	let value: AttrValue = serde_json::from_str(r#"{"unit": "ms", "channels": [1, 2.5, null]}"#).unwrap();
	let mut expected = BTreeMap::new();
	expected.insert("unit".to_owned(), AttrValue::from("ms"));
	expected.insert(
		"channels".to_owned(),
		AttrValue::List(vec![
			AttrValue::Int(1),
			AttrValue::Float(2.5),
			AttrValue::None,
		]),
	);
	assert_eq!(value, AttrValue::Map(expected));
}
