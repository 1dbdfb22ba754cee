use crate::{attrs::AttrKind, element::DType};
use thiserror::Error;

/// Errors raised when reading or writing the attribute mapping.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum AttrError {
	#[error("the attribute '{0}' is read-only")]
	ReadOnly(String),
	#[error("the required attribute '{0}' is missing")]
	MissingRequired(String),
	#[error("the attribute '{name}' must be of kind {expected}, but found {found}")]
	WrongKind {
		name: String,
		expected: AttrKind,
		found: AttrKind,
	},
	#[error("the required attribute '{0}' can not be removed")]
	RequiredRemoval(String),
}

#[derive(Debug, Error)]
pub enum AttrArrayError {
	#[error(transparent)]
	Attr(#[from] AttrError),
	#[error(transparent)]
	Shape(#[from] ndarray::ShapeError),
	#[error("shapes {left:?} and {right:?} do not match")]
	ShapeMismatch { left: Vec<usize>, right: Vec<usize> },
	#[error("nested sequence is ragged at depth {0}")]
	Ragged(usize),
	#[error("can not cast {value} to {dtype}")]
	Cast { value: String, dtype: DType },
}
