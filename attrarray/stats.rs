/*!
Reductions along an axis that keep the attributes, and NaN-aware reductions. NaN values are skipped by the `nan` variants, and a reduction with nothing left to reduce yields NaN.
*/

use crate::{
	array::{AttrArray, AttrArrayBase},
	element::Element,
};
use ndarray::{Axis, Data};
use num_traits::{Float, FromPrimitive, Zero};
use std::ops::{Add, Div};

impl<A, S> AttrArrayBase<S>
where
	A: Element + Zero + Add<Output = A>,
	S: Data<Elem = A>,
{
	/// **Panics** if `axis` is out of bounds.
	pub fn sum_axis(&self, axis: Axis) -> AttrArray<A> {
		self.wrap(self.data().sum_axis(axis))
	}

	/// Returns `None` if `axis` has length zero.
	///
	/// **Panics** if `axis` is out of bounds.
	pub fn mean_axis(&self, axis: Axis) -> Option<AttrArray<A>>
	where
		A: FromPrimitive + Div<Output = A>,
	{
		self.data().mean_axis(axis).map(|data| self.wrap(data))
	}
}

impl<A, S> AttrArrayBase<S>
where
	A: Element + Float,
	S: Data<Elem = A>,
{
	pub fn nanmean(&self) -> A {
		nanmean(self.iter().cloned())
	}

	/// `ddof` is subtracted from the number of values in the divisor.
	pub fn nanvar(&self, ddof: usize) -> A {
		nanvar(self.iter().cloned(), ddof)
	}

	pub fn nanstd(&self, ddof: usize) -> A {
		self.nanvar(ddof).sqrt()
	}

	/// **Panics** if `axis` is out of bounds.
	pub fn nanmean_axis(&self, axis: Axis) -> AttrArray<A> {
		self.wrap(self.map_axis(axis, |lane| nanmean(lane.iter().cloned())))
	}

	/// **Panics** if `axis` is out of bounds.
	pub fn nanvar_axis(&self, axis: Axis, ddof: usize) -> AttrArray<A> {
		self.wrap(self.map_axis(axis, |lane| nanvar(lane.iter().cloned(), ddof)))
	}

	/// **Panics** if `axis` is out of bounds.
	pub fn nanstd_axis(&self, axis: Axis, ddof: usize) -> AttrArray<A> {
		self.nanvar_axis(axis, ddof).sqrt()
	}
}

fn nanmean<A>(values: impl Iterator<Item = A>) -> A
where
	A: Float,
{
	let (sum, count) = values
		.filter(|value| !value.is_nan())
		.fold((A::zero(), 0usize), |(sum, count), value| {
			(sum + value, count + 1)
		});
	if count == 0 {
		return A::nan();
	}
	sum / A::from(count).unwrap_or_else(A::nan)
}

fn nanvar<A>(values: impl Iterator<Item = A>, ddof: usize) -> A
where
	A: Float,
{
	let values: Vec<A> = values.filter(|value| !value.is_nan()).collect();
	if values.len() <= ddof {
		return A::nan();
	}
	let mean = nanmean(values.iter().cloned());
	let sum_of_squares = values
		.iter()
		.fold(A::zero(), |sum, value| sum + (*value - mean).powi(2));
	sum_of_squares / A::from(values.len() - ddof).unwrap_or_else(A::nan)
}

#[test]
fn test_nanmean() {
	use crate::attrs::Attrs;
	let array = AttrArray::from_vec(vec![1.0, f64::NAN, 3.0], Attrs::new()).unwrap();
	assert!((array.nanmean() - 2.0).abs() < 1e-12);
	let array = AttrArray::from_vec(vec![f64::NAN, f64::NAN], Attrs::new()).unwrap();
	assert!(array.nanmean().is_nan());
}

#[test]
fn test_nanvar() {
	use crate::attrs::Attrs;
	let array = AttrArray::from_vec(vec![2.0, 4.0, f64::NAN, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], Attrs::new())
		.unwrap();
	assert!((array.nanvar(0) - 4.0).abs() < 1e-12);
	assert!((array.nanstd(0) - 2.0).abs() < 1e-12);
	assert!((array.nanvar(1) - 32.0 / 7.0).abs() < 1e-12);
	let single = AttrArray::from_vec(vec![1.0f32], Attrs::new()).unwrap();
	assert!(single.nanvar(1).is_nan());
}

#[test]
fn test_nanmean_axis() {
	use crate::attrs::{AttrValue, Attrs};
	let array = AttrArray::from_shape_vec(
		&[2, 3],
		vec![1.0, f64::NAN, 3.0, 4.0, 5.0, 6.0],
		Attrs::new().with("name", "randvals"),
	)
	.unwrap();
	let means = array.nanmean_axis(Axis(1));
	assert_eq!(means.shape(), &[2]);
	assert_eq!(means.attr("name").and_then(AttrValue::as_str), Some("randvals"));
	assert!((means[[0]] - 2.0).abs() < 1e-12);
	assert!((means[[1]] - 5.0).abs() < 1e-12);
	let stds = array.nanstd_axis(Axis(0), 0);
	assert_eq!(stds.shape(), &[3]);
	assert!((stds[[0]] - 1.5).abs() < 1e-12);
	assert!((stds[[1]] - 0.0).abs() < 1e-12);
}

#[test]
fn test_sum_and_mean_axis() {
	use crate::attrs::{AttrValue, Attrs};
	let array = AttrArray::from_shape_vec(
		&[2, 3],
		vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
		Attrs::new().with("name", "grid"),
	)
	.unwrap();
	let sums = array.sum_axis(Axis(0));
	assert_eq!(sums.data(), &ndarray::arr1(&[5.0, 7.0, 9.0]).into_dyn());
	assert_eq!(sums.attr("name").and_then(AttrValue::as_str), Some("grid"));
	let means = array.mean_axis(Axis(1)).unwrap();
	assert_eq!(means.data(), &ndarray::arr1(&[2.0, 5.0]).into_dyn());
	assert_eq!(means.attr("name").and_then(AttrValue::as_str), Some("grid"));
	let counts = AttrArray::from_shape_vec(&[2, 2], vec![1, 2, 3, 4], Attrs::new()).unwrap();
	assert_eq!(counts.sum_axis(Axis(1)).data(), &ndarray::arr1(&[3, 7]).into_dyn());
	let empty = AttrArray::<f64>::from_shape_vec(&[0, 2], vec![], Attrs::new()).unwrap();
	assert!(empty.mean_axis(Axis(0)).is_none());
}
