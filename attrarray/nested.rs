/*!
This module defines `Nested`, a plain nested sequence of scalars such as `[[1, 2, 3], [4.5, 6, 7]]`, and the logic to infer its shape and element type.
*/

use crate::{element::DType, error::AttrArrayError};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Nested {
	Bool(bool),
	Int(i64),
	Float(f64),
	Str(String),
	List(Vec<Nested>),
}

impl Nested {
	pub fn is_list(&self) -> bool {
		matches!(self, Nested::List(_))
	}

	/// Compute the shape and collect the scalars in row major order.
	pub fn flatten(&self) -> Result<(Vec<usize>, Vec<&Nested>), AttrArrayError> {
		// The first element at each depth determines the shape. Everything else must agree with it.
		let mut shape = Vec::new();
		let mut node = self;
		while let Nested::List(items) = node {
			shape.push(items.len());
			match items.first() {
				Some(first) => node = first,
				None => break,
			}
		}
		let mut leaves = Vec::with_capacity(shape.iter().product());
		collect_leaves(self, &shape, 0, &mut leaves)?;
		Ok((shape, leaves))
	}

	/// Infer the element type the way NumPy promotes mixed scalars: bool, then int64, then float64, then str. An empty sequence is float64.
	pub fn infer_dtype<'a>(leaves: impl IntoIterator<Item = &'a Nested>) -> DType {
		leaves
			.into_iter()
			.map(|leaf| match leaf {
				Nested::Bool(_) => DType::Bool,
				Nested::Int(_) => DType::Int64,
				Nested::Float(_) | Nested::List(_) => DType::Float64,
				Nested::Str(_) => DType::Str,
			})
			.max_by_key(|dtype| promotion_rank(*dtype))
			.unwrap_or(DType::Float64)
	}

	pub(crate) fn to_bool(&self) -> Result<bool, AttrArrayError> {
		match self {
			Nested::Bool(value) => Ok(*value),
			Nested::Int(value) => Ok(*value != 0),
			Nested::Float(value) => Ok(*value != 0.0),
			Nested::Str(value) => match value.as_str() {
				"True" | "true" => Ok(true),
				"False" | "false" => Ok(false),
				_ => Err(self.cast_error(DType::Bool)),
			},
			Nested::List(_) => Err(self.cast_error(DType::Bool)),
		}
	}

	pub(crate) fn to_i64(&self, dtype: DType) -> Result<i64, AttrArrayError> {
		match self {
			Nested::Bool(value) => Ok(*value as i64),
			Nested::Int(value) => Ok(*value),
			Nested::Float(value) => Ok(*value as i64),
			Nested::Str(value) => value.trim().parse().map_err(|_| self.cast_error(dtype)),
			Nested::List(_) => Err(self.cast_error(dtype)),
		}
	}

	pub(crate) fn to_f64(&self, dtype: DType) -> Result<f64, AttrArrayError> {
		match self {
			Nested::Bool(value) => Ok(if *value { 1.0 } else { 0.0 }),
			Nested::Int(value) => Ok(*value as f64),
			Nested::Float(value) => Ok(*value),
			Nested::Str(value) => value.trim().parse().map_err(|_| self.cast_error(dtype)),
			Nested::List(_) => Err(self.cast_error(dtype)),
		}
	}

	pub(crate) fn to_string(&self) -> Result<String, AttrArrayError> {
		match self {
			Nested::Bool(true) => Ok("True".to_owned()),
			Nested::Bool(false) => Ok("False".to_owned()),
			Nested::Int(value) => Ok(value.to_string()),
			// Debug keeps the trailing ".0" on integral floats.
			Nested::Float(value) => Ok(format!("{:?}", value)),
			Nested::Str(value) => Ok(value.clone()),
			Nested::List(_) => Err(self.cast_error(DType::Str)),
		}
	}

	fn cast_error(&self, dtype: DType) -> AttrArrayError {
		let value = match self {
			Nested::Str(value) => format!("{:?}", value),
			Nested::List(_) => "a list".to_owned(),
			_ => self.to_string().unwrap_or_default(),
		};
		AttrArrayError::Cast { value, dtype }
	}
}

fn collect_leaves<'a>(
	node: &'a Nested,
	shape: &[usize],
	depth: usize,
	leaves: &mut Vec<&'a Nested>,
) -> Result<(), AttrArrayError> {
	match (node, shape.get(depth)) {
		(Nested::List(items), Some(len)) if items.len() == *len => {
			for item in items {
				collect_leaves(item, shape, depth + 1, leaves)?;
			}
			Ok(())
		}
		(Nested::List(_), _) => Err(AttrArrayError::Ragged(depth)),
		(_, Some(_)) => Err(AttrArrayError::Ragged(depth)),
		(leaf, None) => {
			leaves.push(leaf);
			Ok(())
		}
	}
}

fn promotion_rank(dtype: DType) -> u8 {
	match dtype {
		DType::Bool => 0,
		DType::Int32 => 1,
		DType::Int64 => 2,
		DType::Float32 => 3,
		DType::Float64 => 4,
		DType::Str => 5,
	}
}

impl From<bool> for Nested {
	fn from(value: bool) -> Self {
		Nested::Bool(value)
	}
}

impl From<i32> for Nested {
	fn from(value: i32) -> Self {
		Nested::Int(value.into())
	}
}

impl From<i64> for Nested {
	fn from(value: i64) -> Self {
		Nested::Int(value)
	}
}

impl From<f32> for Nested {
	fn from(value: f32) -> Self {
		Nested::Float(value.into())
	}
}

impl From<f64> for Nested {
	fn from(value: f64) -> Self {
		Nested::Float(value)
	}
}

impl From<&str> for Nested {
	fn from(value: &str) -> Self {
		Nested::Str(value.to_owned())
	}
}

impl From<String> for Nested {
	fn from(value: String) -> Self {
		Nested::Str(value)
	}
}

impl<T> From<Vec<T>> for Nested
where
	T: Into<Nested>,
{
	fn from(value: Vec<T>) -> Self {
		Nested::List(value.into_iter().map(Into::into).collect())
	}
}

#[test]
fn test_flatten() {
	let nested = Nested::from(vec![vec![1, 2, 3], vec![4, 5, 6]]);
	let (shape, leaves) = nested.flatten().unwrap();
	assert_eq!(shape, vec![2, 3]);
	assert_eq!(leaves.len(), 6);
	assert_eq!(leaves[3], &Nested::Int(4));
	let scalar = Nested::from(7.5);
	let (shape, leaves) = scalar.flatten().unwrap();
	assert!(shape.is_empty());
	assert_eq!(leaves, vec![&Nested::Float(7.5)]);
	let empty = Nested::List(vec![Nested::List(vec![])]);
	let (shape, leaves) = empty.flatten().unwrap();
	assert_eq!(shape, vec![1, 0]);
	assert!(leaves.is_empty());
}

#[test]
fn test_ragged() {
	let nested = Nested::from(vec![vec![1, 2, 3], vec![4, 5]]);
	assert!(matches!(nested.flatten(), Err(AttrArrayError::Ragged(1))));
	let nested = Nested::List(vec![Nested::from(vec![1, 2]), Nested::from(3)]);
	assert!(matches!(nested.flatten(), Err(AttrArrayError::Ragged(1))));
	let nested = Nested::List(vec![Nested::from(3), Nested::from(vec![1, 2])]);
	assert!(matches!(nested.flatten(), Err(AttrArrayError::Ragged(1))));
}

#[test]
fn test_infer_dtype() {
	let infer = |json: &str| {
		let nested: Nested = serde_json::from_str(json).unwrap();
		let (_, leaves) = nested.flatten().unwrap();
		Nested::infer_dtype(leaves)
	};
	assert_eq!(infer("[1, 2, 3]"), DType::Int64);
	assert_eq!(infer("[[1, 2, 3], [4.5, 6, 7]]"), DType::Float64);
	assert_eq!(infer(r#"[["a", "b", "c"]]"#), DType::Str);
	assert_eq!(infer(r#"[1, "b", 2.5]"#), DType::Str);
	assert_eq!(infer("[true, false]"), DType::Bool);
	assert_eq!(infer("[true, 2]"), DType::Int64);
	assert_eq!(infer("[]"), DType::Float64);
}

#[test]
fn test_conversions() {
	assert_eq!(Nested::from(4.5).to_string().unwrap(), "4.5");
	assert_eq!(Nested::from(1.0).to_string().unwrap(), "1.0");
	assert_eq!(Nested::from(true).to_string().unwrap(), "True");
	assert_eq!(Nested::from(" 12 ").to_i64(DType::Int64).unwrap(), 12);
	assert_eq!(Nested::from(true).to_f64(DType::Float64).unwrap(), 1.0);
	assert!(matches!(
		Nested::from("a").to_f64(DType::Float32),
		Err(AttrArrayError::Cast {
			dtype: DType::Float32,
			..
		})
	));
}
