use crate::{array::AttrArray, dynamic::DynAttrArray};
use serde::{de::DeserializeOwned, Serialize};
use std::{fmt::Debug, str::FromStr};
use thiserror::Error;

/// The element type of an array, known at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
	Bool,
	Int32,
	Int64,
	Float32,
	Float64,
	Str,
}

#[derive(Debug, Error)]
#[error("unknown dtype {0}")]
pub struct UnknownDTypeError(String);

impl DType {
	pub fn as_str(self) -> &'static str {
		match self {
			DType::Bool => "bool",
			DType::Int32 => "int32",
			DType::Int64 => "int64",
			DType::Float32 => "float32",
			DType::Float64 => "float64",
			DType::Str => "str",
		}
	}

	pub fn is_numeric(self) -> bool {
		!matches!(self, DType::Bool | DType::Str)
	}
}

impl std::fmt::Display for DType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl FromStr for DType {
	type Err = UnknownDTypeError;
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"bool" => Ok(DType::Bool),
			"int32" => Ok(DType::Int32),
			"int64" | "int" => Ok(DType::Int64),
			"float32" => Ok(DType::Float32),
			"float64" | "float" => Ok(DType::Float64),
			"str" => Ok(DType::Str),
			_ => Err(UnknownDTypeError(s.to_owned())),
		}
	}
}

/// A type that can be stored in an [`AttrArray`](../array/type.AttrArray.html).
pub trait Element: Clone + Debug + PartialEq + Serialize + DeserializeOwned + 'static {
	const DTYPE: DType;

	fn upcast(array: AttrArray<Self>) -> DynAttrArray;

	fn downcast(array: &DynAttrArray) -> Option<&AttrArray<Self>>;
}

macro_rules! impl_element {
	($ty:ty, $variant:ident) => {
		impl Element for $ty {
			const DTYPE: DType = DType::$variant;

			fn upcast(array: AttrArray<Self>) -> DynAttrArray {
				DynAttrArray::$variant(array)
			}

			fn downcast(array: &DynAttrArray) -> Option<&AttrArray<Self>> {
				match array {
					DynAttrArray::$variant(array) => Some(array),
					_ => None,
				}
			}
		}
	};
}

impl_element!(bool, Bool);
impl_element!(i32, Int32);
impl_element!(i64, Int64);
impl_element!(f32, Float32);
impl_element!(f64, Float64);
impl_element!(String, Str);

#[test]
fn test_dtype_from_str() {
	assert_eq!("float32".parse::<DType>().unwrap(), DType::Float32);
	assert_eq!("float".parse::<DType>().unwrap(), DType::Float64);
	assert_eq!(DType::Int64.to_string(), "int64");
	assert!("complex128".parse::<DType>().is_err());
	assert!(DType::Int32.is_numeric());
	assert!(!DType::Str.is_numeric());
}
