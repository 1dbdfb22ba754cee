use crate::{
	array::{AttrArray, AttrArrayBase},
	element::Element,
};
use ndarray::Data;
use num_traits::Float;
use std::ops::{Add, Div, Mul, Rem, Sub};

// Binary operations between two arrays keep the attributes of the left operand. The right operand's attributes are dropped.
macro_rules! impl_binary_op {
	($trait:ident, $method:ident) => {
		impl<'a, 'b, A, S, S2> $trait<&'b AttrArrayBase<S2>> for &'a AttrArrayBase<S>
		where
			A: Element + $trait<Output = A>,
			S: Data<Elem = A>,
			S2: Data<Elem = A>,
		{
			type Output = AttrArray<A>;
			/// **Panics** if the shapes can not be broadcast together.
			fn $method(self, rhs: &'b AttrArrayBase<S2>) -> Self::Output {
				self.wrap($trait::$method(self.data(), rhs.data()))
			}
		}

		impl<'a, A, S> $trait<A> for &'a AttrArrayBase<S>
		where
			A: Element + $trait<Output = A>,
			S: Data<Elem = A>,
		{
			type Output = AttrArray<A>;
			fn $method(self, rhs: A) -> Self::Output {
				self.mapv(|value| $trait::$method(value, rhs.clone()))
			}
		}
	};
}

impl_binary_op!(Add, add);
impl_binary_op!(Sub, sub);
impl_binary_op!(Mul, mul);
impl_binary_op!(Div, div);
impl_binary_op!(Rem, rem);

macro_rules! impl_float_fns {
	($($(#[$meta:meta])* $name:ident),*) => {
		impl<A, S> AttrArrayBase<S>
		where
			A: Element + Float,
			S: Data<Elem = A>,
		{
			$(
				$(#[$meta])*
				pub fn $name(&self) -> AttrArray<A> {
					self.mapv(|value| value.$name())
				}
			)*
		}
	};
}

impl_float_fns!(
	sqrt,
	cbrt,
	exp,
	exp2,
	/// The natural logarithm.
	ln,
	log2,
	log10,
	abs,
	signum,
	recip,
	sin,
	cos,
	tan,
	asin,
	acos,
	atan,
	sinh,
	cosh,
	tanh,
	floor,
	ceil,
	round,
	trunc
);

impl<A, S> AttrArrayBase<S>
where
	A: Element + Float,
	S: Data<Elem = A>,
{
	pub fn powi(&self, n: i32) -> AttrArray<A> {
		self.mapv(|value| value.powi(n))
	}

	pub fn powf(&self, n: A) -> AttrArray<A> {
		self.mapv(|value| value.powf(n))
	}

	pub fn is_nan(&self) -> AttrArray<bool> {
		self.mapv(|value| value.is_nan())
	}

	pub fn is_finite(&self) -> AttrArray<bool> {
		self.mapv(|value| value.is_finite())
	}
}

#[test]
fn test_sqrt() {
	use crate::{
		attrs::{AttrValue, Attrs},
		test_util::random_array,
	};
	let array = AttrArray::new(random_array(&[10], 0), Attrs::new().with("name", "randvals"))
		.unwrap();
	let sqrt = array.sqrt();
	assert_eq!(sqrt.attr("name").and_then(AttrValue::as_str), Some("randvals"));
	assert_eq!(sqrt.shape(), array.shape());
	for (a, b) in array.iter().zip(sqrt.iter()) {
		assert!((a.sqrt() - b).abs() < 1e-12);
	}
}

#[test]
fn test_math_on_views() {
	use crate::{
		attrs::{AttrValue, Attrs},
		test_util::random_array,
	};
	use ndarray::Axis;
	let array = AttrArray::new(random_array(&[3, 4], 1), Attrs::new().with("name", "randvals"))
		.unwrap();
	let row = array.index_axis(Axis(0), 1);
	let exp = row.exp();
	assert_eq!(exp.shape(), &[4]);
	assert_eq!(exp.attr("name").and_then(AttrValue::as_str), Some("randvals"));
	assert!(array.powi(2).is_finite().all());
}

#[test]
fn test_arithmetic() {
	use crate::attrs::{AttrValue, Attrs};
	use ndarray::arr1;
	let a = AttrArray::from_vec(vec![1.0, 2.0, 3.0], Attrs::new().with("name", "a")).unwrap();
	let b = AttrArray::from_vec(vec![0.5, 0.5, 0.5], Attrs::new().with("name", "b")).unwrap();
	let sum = &a + &b;
	assert_eq!(sum.data(), &arr1(&[1.5, 2.5, 3.5]).into_dyn());
	assert_eq!(sum.attr("name").and_then(AttrValue::as_str), Some("a"));
	let scaled = &a * 2.0;
	assert_eq!(scaled.data(), &arr1(&[2.0, 4.0, 6.0]).into_dyn());
	assert_eq!(scaled.attr("name").and_then(AttrValue::as_str), Some("a"));
	let difference = &b - &a;
	assert_eq!(difference.attr("name").and_then(AttrValue::as_str), Some("b"));
	let remainder = &AttrArray::from_vec(vec![7, 8, 9], Attrs::new()).unwrap() % 4;
	assert_eq!(remainder.data(), &arr1(&[3, 0, 1]).into_dyn());
}

#[test]
#[should_panic]
fn test_arithmetic_shape_mismatch() {
	use crate::attrs::Attrs;
	let a = AttrArray::from_vec(vec![1.0, 2.0, 3.0], Attrs::new()).unwrap();
	let b = AttrArray::from_vec(vec![1.0, 2.0], Attrs::new()).unwrap();
	let _ = &a + &b;
}
