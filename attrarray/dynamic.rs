/*!
This module defines `DynAttrArray`, an [`AttrArray`](../array/type.AttrArray.html) whose element type is only known at runtime. It is what you get when building an array from a [`Nested`](../nested/enum.Nested.html) sequence, and it is the form arrays take in files.
*/

use crate::{
	array::AttrArray,
	attrs::{AttrValue, Attrs, RequiredAttrs},
	element::{DType, Element},
	error::{AttrArrayError, AttrError},
	nested::Nested,
};
use anyhow::Result;
use std::{
	io::{Read, Write},
	path::Path,
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum DynAttrArray {
	Bool(AttrArray<bool>),
	Int32(AttrArray<i32>),
	Int64(AttrArray<i64>),
	Float32(AttrArray<f32>),
	Float64(AttrArray<f64>),
	Str(AttrArray<String>),
}

macro_rules! dispatch {
	($value:expr, $array:ident => $body:expr) => {
		match $value {
			DynAttrArray::Bool($array) => $body,
			DynAttrArray::Int32($array) => $body,
			DynAttrArray::Int64($array) => $body,
			DynAttrArray::Float32($array) => $body,
			DynAttrArray::Float64($array) => $body,
			DynAttrArray::Str($array) => $body,
		}
	};
}

impl DynAttrArray {
	/// Build an array from a nested sequence. If `dtype` is `None` it is inferred from the scalars in `data`, otherwise every scalar is cast to it.
	pub fn new(data: Nested, dtype: Option<DType>, attrs: Attrs) -> Result<Self, AttrArrayError> {
		let (shape, leaves) = data.flatten()?;
		let dtype = dtype.unwrap_or_else(|| Nested::infer_dtype(leaves.iter().cloned()));
		log::debug!("building {} array with shape {:?}", dtype, shape);
		build(dtype, &shape, &leaves, attrs)
	}

	pub fn dtype(&self) -> DType {
		dispatch!(self, array => array.dtype())
	}

	pub fn shape(&self) -> &[usize] {
		dispatch!(self, array => array.shape())
	}

	pub fn ndim(&self) -> usize {
		dispatch!(self, array => array.ndim())
	}

	pub fn len(&self) -> usize {
		dispatch!(self, array => array.len())
	}

	pub fn is_empty(&self) -> bool {
		dispatch!(self, array => array.is_empty())
	}

	pub fn attrs(&self) -> &Attrs {
		dispatch!(self, array => array.attrs())
	}

	pub fn attr(&self, name: &str) -> Option<&AttrValue> {
		dispatch!(self, array => array.attr(name))
	}

	pub fn required_attrs(&self) -> &RequiredAttrs {
		dispatch!(self, array => array.required_attrs())
	}

	pub fn set_attr(
		&mut self,
		name: impl Into<String>,
		value: impl Into<AttrValue>,
	) -> Result<Option<AttrValue>, AttrError> {
		dispatch!(self, array => array.set_attr(name, value))
	}

	pub fn remove_attr(&mut self, name: &str) -> Result<Option<AttrValue>, AttrError> {
		dispatch!(self, array => array.remove_attr(name))
	}

	pub fn downcast<A>(&self) -> Option<&AttrArray<A>>
	where
		A: Element,
	{
		A::downcast(self)
	}

	/// Cast every element to `dtype` with the same rules used when building from a nested sequence. The attributes are copied.
	pub fn cast(&self, dtype: DType) -> Result<Self, AttrArrayError> {
		// float32 values print with their own shortest representation.
		if let (DynAttrArray::Float32(array), DType::Str) = (self, dtype) {
			return Ok(DynAttrArray::Str(array.map(|value| format!("{:?}", value))));
		}
		let leaves: Vec<Nested> = dispatch!(self, array => array.iter().cloned().map(Nested::from).collect());
		let leaves: Vec<&Nested> = leaves.iter().collect();
		build(dtype, self.shape(), &leaves, self.attrs().clone())
	}

	/// Deserialize a `DynAttrArray` from a slice.
	pub fn from_slice(slice: &[u8]) -> Result<Self> {
		crate::deserialize(slice)
	}

	/// Deserialize a `DynAttrArray` by reading the file at `path`.
	pub fn from_path(path: &Path) -> Result<Self> {
		let file = std::fs::File::open(path)?;
		let mut reader = std::io::BufReader::new(file);
		let mut bytes = Vec::new();
		reader.read_to_end(&mut bytes)?;
		Self::from_slice(&bytes)
	}

	pub fn to_vec(&self) -> Result<Vec<u8>> {
		crate::serialize(self)
	}

	/// Write this array to the file at `path`.
	pub fn to_file(&self, path: &Path) -> Result<()> {
		let file = std::fs::File::create(path)?;
		let mut writer = std::io::BufWriter::new(file);
		writer.write_all(&self.to_vec()?)?;
		writer.flush()?;
		Ok(())
	}
}

impl<A> From<AttrArray<A>> for DynAttrArray
where
	A: Element,
{
	fn from(array: AttrArray<A>) -> Self {
		A::upcast(array)
	}
}

fn build(
	dtype: DType,
	shape: &[usize],
	leaves: &[&Nested],
	attrs: Attrs,
) -> Result<DynAttrArray, AttrArrayError> {
	let array = match dtype {
		DType::Bool => DynAttrArray::Bool(build_typed(shape, leaves, attrs, |leaf| {
			leaf.to_bool()
		})?),
		DType::Int32 => DynAttrArray::Int32(build_typed(shape, leaves, attrs, |leaf| {
			leaf.to_i64(dtype).map(|value| value as i32)
		})?),
		DType::Int64 => DynAttrArray::Int64(build_typed(shape, leaves, attrs, |leaf| {
			leaf.to_i64(dtype)
		})?),
		DType::Float32 => DynAttrArray::Float32(build_typed(shape, leaves, attrs, |leaf| {
			leaf.to_f64(dtype).map(|value| value as f32)
		})?),
		DType::Float64 => DynAttrArray::Float64(build_typed(shape, leaves, attrs, |leaf| {
			leaf.to_f64(dtype)
		})?),
		DType::Str => DynAttrArray::Str(build_typed(shape, leaves, attrs, |leaf| {
			leaf.to_string()
		})?),
	};
	Ok(array)
}

fn build_typed<A, F>(
	shape: &[usize],
	leaves: &[&Nested],
	attrs: Attrs,
	convert: F,
) -> Result<AttrArray<A>, AttrArrayError>
where
	A: Element,
	F: Fn(&Nested) -> Result<A, AttrArrayError>,
{
	let values = leaves
		.iter()
		.map(|leaf| convert(leaf))
		.collect::<Result<Vec<_>, _>>()?;
	AttrArray::from_shape_vec(shape, values, attrs)
}

#[test]
fn test_new_from_nested() {
	let array = DynAttrArray::new(
		Nested::from((0..10).collect::<Vec<i64>>()),
		None,
		Attrs::new().with("name", "range"),
	)
	.unwrap();
	assert_eq!(array.attr("name").and_then(AttrValue::as_str), Some("range"));
	assert_eq!(array.dtype(), DType::Int64);
	assert_eq!(array.shape(), &[10]);

	let array = DynAttrArray::new(
		Nested::from(vec![vec!["a", "b", "c"]]),
		None,
		Attrs::new().with("name", "list"),
	)
	.unwrap();
	assert_eq!(array.dtype(), DType::Str);
	assert_eq!(array.shape(), &[1, 3]);
	let strings = array.downcast::<String>().unwrap();
	assert_eq!(strings[[0, 2]], "c");

	let nested: Nested = serde_json::from_str("[[1, 2, 3], [4.5, 6, 7]]").unwrap();
	let array = DynAttrArray::new(nested, None, Attrs::new().with("name", "list")).unwrap();
	assert_eq!(array.attr("name").and_then(AttrValue::as_str), Some("list"));
	let floats = array.downcast::<f64>().unwrap();
	let expected = ndarray::arr2(&[[1.0, 2.0, 3.0], [4.5, 6.0, 7.0]]).into_dyn();
	assert!(floats.eq_elementwise(&expected).unwrap().all());
}

#[test]
fn test_new_with_dtype() {
	let nested: Nested = serde_json::from_str("[[1, 2, 3], [4.5, 6, 7]]").unwrap();
	let array = DynAttrArray::new(nested.clone(), Some(DType::Float32), Attrs::new()).unwrap();
	assert_eq!(array.dtype(), DType::Float32);
	let array = DynAttrArray::new(nested, Some(DType::Str), Attrs::new()).unwrap();
	let strings = array.downcast::<String>().unwrap();
	assert_eq!(strings[[1, 0]], "4.5");
	assert_eq!(strings[[0, 0]], "1");
	let result = DynAttrArray::new(Nested::from(vec!["a"]), Some(DType::Float64), Attrs::new());
	assert!(matches!(result, Err(AttrArrayError::Cast { .. })));
}

#[test]
fn test_cast() {
	let array = DynAttrArray::from(
		AttrArray::from_vec(vec![1.5, 2.5, -3.5], Attrs::new().with("name", "randvals")).unwrap(),
	);
	let cast = array.cast(DType::Int64).unwrap();
	assert_eq!(cast.dtype(), DType::Int64);
	assert_eq!(cast.attr("name").and_then(AttrValue::as_str), Some("randvals"));
	assert_eq!(
		cast.downcast::<i64>().unwrap().data(),
		&ndarray::arr1(&[1, 2, -3]).into_dyn()
	);
	assert_eq!(array.downcast::<i64>(), None);
}

#[test]
fn test_ragged_nested() {
	let nested: Nested = serde_json::from_str("[[1, 2], [3]]").unwrap();
	let result = DynAttrArray::new(nested, None, Attrs::new());
	assert!(matches!(result, Err(AttrArrayError::Ragged(1))));
}

#[test]
fn test_file_round_trip() {
	use crate::attrs::{AttrKind, RequiredAttr};
	let required = RequiredAttrs::new(vec![RequiredAttr::new("name", AttrKind::Str)]);
	let nested: Nested = serde_json::from_str("[[true, false], [false, true]]").unwrap();
	let mut array = DynAttrArray::new(
		nested,
		None,
		Attrs::with_required(required.clone()).with("name", "mask"),
	)
	.unwrap();
	array.set_attr("channels", vec![1, 2]).unwrap();
	let path = std::env::temp_dir().join(format!("dimarray_{}.bin", std::process::id()));
	array.to_file(&path).unwrap();
	let mut restored = DynAttrArray::from_path(&path).unwrap();
	std::fs::remove_file(&path).unwrap();
	assert_eq!(restored, array);
	assert_eq!(restored.required_attrs(), &required);
	assert_eq!(
		restored.remove_attr("name"),
		Err(AttrError::RequiredRemoval("name".to_owned()))
	);
}

#[test]
fn test_cast_float32_to_str() {
	let array = DynAttrArray::from(
		AttrArray::from_vec(vec![0.1f32, 2.0, -3.25], Attrs::new().with("name", "rates")).unwrap(),
	);
	let strings = array.cast(DType::Str).unwrap();
	let strings = strings.downcast::<String>().unwrap();
	assert_eq!(strings[[0]], "0.1");
	assert_eq!(strings[[1]], "2.0");
	assert_eq!(strings[[2]], "-3.25");
	assert_eq!(strings.attr("name").and_then(AttrValue::as_str), Some("rates"));
}
