/*!
This crate provides `AttrArray`, an *n*-dimensional array that carries a mapping of named attributes, such as a name or units, alongside its values. The attributes follow the array through slicing, casting, elementwise math and serialization. Every array owns its own copy of the mapping, so changing the attributes of a derived array never changes the array it came from.

```
use dimarray_attrarray::{AttrArray, AttrValue, Attrs};

let array = AttrArray::from_vec(vec![1.0, 4.0, 9.0], Attrs::new().with("name", "squares")).unwrap();
let roots = array.sqrt();
assert_eq!(roots.attr("name").and_then(AttrValue::as_str), Some("squares"));
```

Numerical work is done by `ndarray`. This crate only adds the attribute layer.
*/

use anyhow::{format_err, Result};

mod array;
mod attrs;
mod dynamic;
mod element;
mod error;
mod nested;
mod ops;
mod stats;

pub use self::array::{AttrArray, AttrArrayBase, AttrArrayView, AttrArrayViewMut};
pub use self::attrs::{AttrKind, AttrValue, Attrs, RequiredAttr, RequiredAttrs, REQUIRED_ATTRS_KEY};
pub use self::dynamic::DynAttrArray;
pub use self::element::{DType, Element, UnknownDTypeError};
pub use self::error::{AttrArrayError, AttrError};
pub use self::nested::Nested;

/// The first byte of every serialized value.
const MAJOR_VERSION: u8 = 0;

/// Serialize `value` to bytes. The first byte is the major version of the format. The rest is MessagePack.
pub fn serialize<T>(value: &T) -> Result<Vec<u8>>
where
	T: serde::Serialize,
{
	let mut bytes = vec![MAJOR_VERSION];
	rmp_serde::encode::write_named(&mut bytes, value)?;
	Ok(bytes)
}

/// Deserialize a value written by [`serialize`](fn.serialize.html). Required attributes are checked again as the arrays are rebuilt.
pub fn deserialize<T>(slice: &[u8]) -> Result<T>
where
	T: serde::de::DeserializeOwned,
{
	let (major_version, slice) = slice
		.split_first()
		.ok_or_else(|| format_err!("unexpected end of input"))?;
	if *major_version != MAJOR_VERSION {
		return Err(format_err!("unknown major version {}", major_version));
	}
	let value = rmp_serde::from_slice(slice)?;
	log::debug!("deserialized {} bytes", slice.len() + 1);
	Ok(value)
}

#[cfg(test)]
mod test_util {
	use ndarray::prelude::*;
	use rand::{Rng, SeedableRng};
	use rand_xoshiro::Xoshiro256Plus;

	pub fn random_array(shape: &[usize], seed: u64) -> ArrayD<f64> {
		let mut rng = Xoshiro256Plus::seed_from_u64(seed);
		ArrayD::from_shape_fn(IxDyn(shape), |_| rng.gen::<f64>())
	}
}

#[test]
fn test_round_trip() {
	let array = AttrArray::new(
		test_util::random_array(&[10], 0),
		Attrs::new().with("name", "randvals"),
	)
	.unwrap();
	let bytes = serialize(&array).unwrap();
	let mut restored: AttrArray<f64> = deserialize(&bytes).unwrap();
	assert_eq!(restored.data(), array.data());
	assert_eq!(restored.attrs(), array.attrs());
	assert_eq!(restored.attr("name").and_then(AttrValue::as_str), Some("randvals"));
	assert!(restored.required_attrs().is_empty());
	assert!(restored.has_attr(REQUIRED_ATTRS_KEY));
	assert_eq!(
		restored.set_attr(REQUIRED_ATTRS_KEY, "test"),
		Err(AttrError::ReadOnly(REQUIRED_ATTRS_KEY.to_owned()))
	);
}

#[test]
fn test_round_trip_view() {
	let data = test_util::random_array(&[3, 4], 1);
	let array = AttrArray::new(data, Attrs::new().with("name", "randvals").with("rate", 2.5))
		.unwrap();
	let row = array.index_axis(ndarray::Axis(0), 1);
	let restored: AttrArray<f64> = deserialize(&serialize(&row).unwrap()).unwrap();
	assert_eq!(restored, row);
	assert_eq!(restored.attr("rate").and_then(AttrValue::as_f64), Some(2.5));
}

#[test]
fn test_round_trip_checks_required() {
	let required = RequiredAttrs::new(vec![RequiredAttr::new("name", AttrKind::Str)]);
	let array = AttrArray::new(
		test_util::random_array(&[2], 2),
		Attrs::with_required(required.clone()).with("name", "dim"),
	)
	.unwrap();
	let restored: AttrArray<f64> = deserialize(&serialize(&array).unwrap()).unwrap();
	assert_eq!(restored.required_attrs(), &required);
	assert_eq!(
		restored.attr(REQUIRED_ATTRS_KEY),
		Some(&AttrValue::Map(
			vec![("name".to_owned(), AttrValue::from("str"))]
				.into_iter()
				.collect()
		))
	);

	// A mapping that no longer satisfies its requirements is rejected.
	let (data, _) = array.into_parts();
	#[derive(serde::Serialize)]
	struct Tampered {
		data: ndarray::ArrayD<f64>,
		attrs: Attrs,
	}
	let tampered = Tampered {
		data,
		attrs: Attrs::with_required(required),
	};
	let result: Result<AttrArray<f64>> = deserialize(&serialize(&tampered).unwrap());
	assert!(result.is_err());
}

#[test]
fn test_unknown_version() {
	let mut bytes = serialize(&AttrArray::from_vec(vec![1, 2, 3], Attrs::new()).unwrap()).unwrap();
	bytes[0] = 7;
	let result: Result<AttrArray<i32>> = deserialize(&bytes);
	assert_eq!(result.unwrap_err().to_string(), "unknown major version 7");
	let result: Result<AttrArray<i32>> = deserialize(&[]);
	assert!(result.is_err());
}
