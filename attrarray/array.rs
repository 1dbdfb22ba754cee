/*!
This module defines `AttrArrayBase`, an *n*-dimensional array that carries a mapping of named attributes alongside its buffer. Like `ndarray`'s own `ArrayBase`, it is generic over its storage, so the same type covers owned arrays, shared views and mutable views.

Every operation that produces a new array from an existing one computes the new buffer with `ndarray` and then attaches a copy of the source's attributes. Two arrays never share an attribute mapping.
*/

use crate::{
	attrs::{AttrValue, Attrs, RequiredAttrs},
	element::{DType, Element},
	error::{AttrArrayError, AttrError},
};
use itertools::izip;
use ndarray::{
	prelude::*, Data, DataMut, NdIndex, OwnedRepr, RawData, RawDataClone, Slice, SliceInfo,
	SliceOrIndex, ViewRepr,
};
use num_traits::AsPrimitive;

pub struct AttrArrayBase<S>
where
	S: RawData,
{
	data: ArrayBase<S, IxDyn>,
	attrs: Attrs,
}

/// An array that owns its buffer.
pub type AttrArray<A> = AttrArrayBase<OwnedRepr<A>>;

/// An array that borrows its buffer.
pub type AttrArrayView<'a, A> = AttrArrayBase<ViewRepr<&'a A>>;

/// An array that mutably borrows its buffer. Writes are visible in the buffer's owner.
pub type AttrArrayViewMut<'a, A> = AttrArrayBase<ViewRepr<&'a mut A>>;

impl<A> AttrArray<A>
where
	A: Element,
{
	/// Take ownership of `data` and attach `attrs` to it.
	pub fn new(data: ArrayD<A>, attrs: Attrs) -> Result<Self, AttrArrayError> {
		attrs.validate()?;
		log::trace!(
			"new {} attr array with shape {:?} and {} attrs",
			A::DTYPE,
			data.shape(),
			attrs.len()
		);
		Ok(Self { data, attrs })
	}

	/// Copy the buffer `data` views into a new array. Writes to the result are never visible in `data`.
	pub fn from_view(data: ArrayViewD<A>, attrs: Attrs) -> Result<Self, AttrArrayError> {
		Self::new(data.to_owned(), attrs)
	}

	pub fn from_vec(data: Vec<A>, attrs: Attrs) -> Result<Self, AttrArrayError> {
		Self::new(Array1::from(data).into_dyn(), attrs)
	}

	pub fn from_shape_vec(
		shape: &[usize],
		data: Vec<A>,
		attrs: Attrs,
	) -> Result<Self, AttrArrayError> {
		let data = ArrayD::from_shape_vec(IxDyn(shape), data)?;
		Self::new(data, attrs)
	}

	/// Copy the buffer `data` views into a new array, casting each element to `A`. The cast may lose precision.
	pub fn from_cast<B>(data: ArrayViewD<B>, attrs: Attrs) -> Result<Self, AttrArrayError>
	where
		A: Copy,
		B: AsPrimitive<A>,
	{
		Self::new(data.mapv(|value| value.as_()), attrs)
	}

	/// Copy the buffer of `source` into a new array. Attributes of `source` are inherited unless `overrides` supplies a new value for them.
	pub fn inherit<S>(source: &AttrArrayBase<S>, overrides: Attrs) -> Result<Self, AttrArrayError>
	where
		S: Data<Elem = A>,
	{
		let attrs = source.attrs.merge(&overrides)?;
		Self::new(source.data.to_owned(), attrs)
	}

	pub fn into_data(self) -> ArrayD<A> {
		self.data
	}

	pub fn into_parts(self) -> (ArrayD<A>, Attrs) {
		(self.data, self.attrs)
	}
}

impl<'a, A> AttrArrayView<'a, A>
where
	A: Element,
{
	pub fn new(data: ArrayViewD<'a, A>, attrs: Attrs) -> Result<Self, AttrArrayError> {
		attrs.validate()?;
		Ok(Self { data, attrs })
	}
}

impl<'a, A> AttrArrayViewMut<'a, A>
where
	A: Element,
{
	/// Attach `attrs` to a buffer without copying it. Writes through the result are visible in the buffer's owner once the borrow ends.
	pub fn new(data: ArrayViewMutD<'a, A>, attrs: Attrs) -> Result<Self, AttrArrayError> {
		attrs.validate()?;
		Ok(Self { data, attrs })
	}
}

impl<A, S> AttrArrayBase<S>
where
	A: Element,
	S: Data<Elem = A>,
{
	pub fn data(&self) -> &ArrayBase<S, IxDyn> {
		&self.data
	}

	pub fn attrs(&self) -> &Attrs {
		&self.attrs
	}

	/// `_required_attrs` resolves to a map from each required name to its kind.
	pub fn attr(&self, name: &str) -> Option<&AttrValue> {
		self.attrs.get(name)
	}

	pub fn has_attr(&self, name: &str) -> bool {
		self.attrs.contains(name)
	}

	pub fn set_attr(
		&mut self,
		name: impl Into<String>,
		value: impl Into<AttrValue>,
	) -> Result<Option<AttrValue>, AttrError> {
		self.attrs.set(name, value)
	}

	pub fn remove_attr(&mut self, name: &str) -> Result<Option<AttrValue>, AttrError> {
		self.attrs.remove(name)
	}

	pub fn required_attrs(&self) -> &RequiredAttrs {
		self.attrs.required()
	}

	pub fn dtype(&self) -> DType {
		A::DTYPE
	}

	pub fn shape(&self) -> &[usize] {
		self.data.shape()
	}

	pub fn ndim(&self) -> usize {
		self.data.ndim()
	}

	pub fn len(&self) -> usize {
		self.data.len()
	}

	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	pub fn get<I>(&self, index: I) -> Option<&A>
	where
		I: NdIndex<IxDyn>,
	{
		self.data.get(index)
	}

	pub fn view(&self) -> AttrArrayView<'_, A> {
		AttrArrayBase {
			data: self.data.view(),
			attrs: self.attrs.clone(),
		}
	}

	pub fn to_owned(&self) -> AttrArray<A> {
		self.wrap(self.data.to_owned())
	}

	/// Slice along `axis`. The result shares this array's buffer.
	pub fn slice_axis(&self, axis: Axis, slice: Slice) -> AttrArrayView<'_, A> {
		AttrArrayBase {
			data: self.data.slice_axis(axis, slice),
			attrs: self.attrs.clone(),
		}
	}

	/// Slice with an `s![..]` expression. The result shares this array's buffer.
	///
	/// **Panics** if the slice does not match the number of axes or is out of bounds.
	pub fn slice<Do>(&self, info: &SliceInfo<[SliceOrIndex], Do>) -> AttrArrayView<'_, A>
	where
		Do: Dimension,
	{
		AttrArrayBase {
			data: self.data.slice(info).into_dyn(),
			attrs: self.attrs.clone(),
		}
	}

	/// Select `index` along `axis`, removing that axis. The result shares this array's buffer.
	///
	/// **Panics** if `axis` or `index` is out of bounds.
	pub fn index_axis(&self, axis: Axis, index: usize) -> AttrArrayView<'_, A> {
		AttrArrayBase {
			data: self.data.index_axis(axis, index),
			attrs: self.attrs.clone(),
		}
	}

	/// The transpose, sharing this array's buffer.
	pub fn t(&self) -> AttrArrayView<'_, A> {
		AttrArrayBase {
			data: self.data.t(),
			attrs: self.attrs.clone(),
		}
	}

	/// Give the buffer a new shape with the same number of elements. The buffer must be contiguous.
	pub fn into_shape(self, shape: &[usize]) -> Result<AttrArrayBase<S>, AttrArrayError> {
		let AttrArrayBase { data, attrs } = self;
		let data = data.into_shape(IxDyn(shape))?;
		Ok(AttrArrayBase { data, attrs })
	}

	pub fn map<B, F>(&self, f: F) -> AttrArray<B>
	where
		B: Element,
		F: FnMut(&A) -> B,
	{
		self.wrap(self.data.map(f))
	}

	pub fn mapv<B, F>(&self, f: F) -> AttrArray<B>
	where
		B: Element,
		F: FnMut(A) -> B,
	{
		self.wrap(self.data.mapv(f))
	}

	/// Cast each element to `B`. The cast may lose precision.
	pub fn cast<B>(&self) -> AttrArray<B>
	where
		A: AsPrimitive<B>,
		B: Element + Copy,
	{
		log::trace!("casting {} to {}", A::DTYPE, B::DTYPE);
		self.mapv(|value| value.as_())
	}

	/// Compare elementwise with an array of the same shape.
	pub fn eq_elementwise<S2>(
		&self,
		other: &ArrayBase<S2, IxDyn>,
	) -> Result<AttrArray<bool>, AttrArrayError>
	where
		S2: Data<Elem = A>,
	{
		if self.data.shape() != other.shape() {
			return Err(AttrArrayError::ShapeMismatch {
				left: self.data.shape().to_owned(),
				right: other.shape().to_owned(),
			});
		}
		let values: Vec<bool> = izip!(self.data.iter(), other.iter())
			.map(|(a, b)| a == b)
			.collect();
		let data = ArrayD::from_shape_vec(self.data.raw_dim(), values)?;
		Ok(self.wrap(data))
	}

	/// Attach a copy of this array's attributes to `data`.
	pub(crate) fn wrap<B>(&self, data: ArrayD<B>) -> AttrArray<B>
	where
		B: Element,
	{
		AttrArrayBase {
			data,
			attrs: self.attrs.clone(),
		}
	}
}

impl<A, S> AttrArrayBase<S>
where
	A: Element,
	S: DataMut<Elem = A>,
{
	pub fn data_mut(&mut self) -> &mut ArrayBase<S, IxDyn> {
		&mut self.data
	}

	pub fn get_mut<I>(&mut self, index: I) -> Option<&mut A>
	where
		I: NdIndex<IxDyn>,
	{
		self.data.get_mut(index)
	}

	pub fn view_mut(&mut self) -> AttrArrayViewMut<'_, A> {
		AttrArrayBase {
			data: self.data.view_mut(),
			attrs: self.attrs.clone(),
		}
	}

	pub fn slice_axis_mut(&mut self, axis: Axis, slice: Slice) -> AttrArrayViewMut<'_, A> {
		AttrArrayBase {
			data: self.data.slice_axis_mut(axis, slice),
			attrs: self.attrs.clone(),
		}
	}

	/// **Panics** if the slice does not match the number of axes or is out of bounds.
	pub fn slice_mut<Do>(&mut self, info: &SliceInfo<[SliceOrIndex], Do>) -> AttrArrayViewMut<'_, A>
	where
		Do: Dimension,
	{
		AttrArrayBase {
			data: self.data.slice_mut(info).into_dyn(),
			attrs: self.attrs.clone(),
		}
	}

	/// **Panics** if `axis` or `index` is out of bounds.
	pub fn index_axis_mut(&mut self, axis: Axis, index: usize) -> AttrArrayViewMut<'_, A> {
		AttrArrayBase {
			data: self.data.index_axis_mut(axis, index),
			attrs: self.attrs.clone(),
		}
	}

	pub fn mapv_inplace<F>(&mut self, f: F)
	where
		F: FnMut(A) -> A,
	{
		self.data.mapv_inplace(f)
	}

	pub fn fill(&mut self, value: A) {
		self.data.fill(value)
	}
}

impl<S> AttrArrayBase<S>
where
	S: Data<Elem = bool>,
{
	pub fn all(&self) -> bool {
		self.data.iter().all(|value| *value)
	}

	pub fn any(&self) -> bool {
		self.data.iter().any(|value| *value)
	}
}

impl<S> Clone for AttrArrayBase<S>
where
	S: RawDataClone,
{
	fn clone(&self) -> Self {
		Self {
			data: self.data.clone(),
			attrs: self.attrs.clone(),
		}
	}
}

impl<A, S> std::fmt::Debug for AttrArrayBase<S>
where
	A: std::fmt::Debug,
	S: Data<Elem = A>,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AttrArray")
			.field("data", &self.data)
			.field("attrs", &self.attrs)
			.finish()
	}
}

impl<A, S, S2> PartialEq<AttrArrayBase<S2>> for AttrArrayBase<S>
where
	A: PartialEq,
	S: Data<Elem = A>,
	S2: Data<Elem = A>,
{
	fn eq(&self, other: &AttrArrayBase<S2>) -> bool {
		self.data == other.data && self.attrs == other.attrs
	}
}

impl<S> std::ops::Deref for AttrArrayBase<S>
where
	S: RawData,
{
	type Target = ArrayBase<S, IxDyn>;
	fn deref(&self) -> &Self::Target {
		&self.data
	}
}

impl<A, S, I> std::ops::Index<I> for AttrArrayBase<S>
where
	S: Data<Elem = A>,
	I: NdIndex<IxDyn>,
{
	type Output = A;
	fn index(&self, index: I) -> &Self::Output {
		&self.data[index]
	}
}

impl<A, S, I> std::ops::IndexMut<I> for AttrArrayBase<S>
where
	S: DataMut<Elem = A>,
	I: NdIndex<IxDyn>,
{
	fn index_mut(&mut self, index: I) -> &mut Self::Output {
		&mut self.data[index]
	}
}

#[derive(serde::Serialize)]
struct AttrArrayRef<'a, A> {
	data: ArrayViewD<'a, A>,
	attrs: &'a Attrs,
}

#[derive(serde::Deserialize)]
struct AttrArrayRepr<A> {
	data: ArrayD<A>,
	attrs: Attrs,
}

impl<A, S> serde::Serialize for AttrArrayBase<S>
where
	A: Element,
	S: Data<Elem = A>,
{
	fn serialize<Se>(&self, serializer: Se) -> Result<Se::Ok, Se::Error>
	where
		Se: serde::Serializer,
	{
		let repr = AttrArrayRef {
			data: self.data.view(),
			attrs: &self.attrs,
		};
		serde::Serialize::serialize(&repr, serializer)
	}
}

impl<'de, A> serde::Deserialize<'de> for AttrArray<A>
where
	A: Element,
{
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		// Go through the validating constructor so the required attributes are checked again.
		let repr = <AttrArrayRepr<A> as serde::Deserialize>::deserialize(deserializer)?;
		AttrArray::new(repr.data, repr.attrs).map_err(serde::de::Error::custom)
	}
}

#[test]
fn test_new_from_array() {
	use crate::test_util::random_array;
	let data = random_array(&[10], 0);
	let array = AttrArray::new(data.clone(), Attrs::new().with("name", "randvals")).unwrap();
	assert_eq!(array.attr("name").and_then(AttrValue::as_str), Some("randvals"));
	assert_eq!(array.shape(), &[10]);
	assert_eq!(array.dtype(), DType::Float64);
	assert!(array.eq_elementwise(&data).unwrap().all());
}

#[test]
fn test_new_with_dtype() {
	use crate::test_util::random_array;
	let data = random_array(&[1, 2, 3, 4], 1);
	let array =
		AttrArray::<f32>::from_cast(data.view(), Attrs::new().with("name", "randvals")).unwrap();
	assert_eq!(array.attr("name").and_then(AttrValue::as_str), Some("randvals"));
	assert_eq!(array.shape(), &[1, 2, 3, 4]);
	assert_eq!(array.dtype(), DType::Float32);
	for (a, b) in izip!(array.iter(), data.iter()) {
		assert!((f64::from(*a) - b).abs() < 1e-6);
	}
}

#[test]
fn test_copy() {
	use crate::test_util::random_array;
	let data = random_array(&[10, 9, 8, 7, 2, 1, 3, 3], 2);
	let attrs = Attrs::new()
		.with("name", "randvals")
		.with("test1", 33)
		.with("test2", "test");
	let mut copied = AttrArray::from_view(data.view(), attrs).unwrap();
	assert_eq!(copied.attr("test1").and_then(AttrValue::as_i64), Some(33));
	assert_eq!(copied.attr("test2").and_then(AttrValue::as_str), Some("test"));
	assert_eq!(copied.shape(), data.shape());
	assert_eq!(copied.data(), &data);
	copied.index_axis_mut(Axis(0), 0).mapv_inplace(|value| value + 5.0);
	for (a, b) in izip!(
		copied.index_axis(Axis(0), 0).iter(),
		data.index_axis(Axis(0), 0).iter()
	) {
		assert!((a - 5.0 - b).abs() < 1e-12);
	}
}

#[test]
fn test_borrow() {
	use crate::test_util::random_array;
	let mut data = random_array(&[10, 9, 8], 3);
	let original = data.clone();
	let attrs = Attrs::new()
		.with("name", "randvals")
		.with("test1", 33)
		.with("test2", "test");
	let mut borrowed = AttrArrayViewMut::new(data.view_mut(), attrs).unwrap();
	assert_eq!(borrowed.attr("name").and_then(AttrValue::as_str), Some("randvals"));
	assert_eq!(borrowed.shape(), &[10, 9, 8]);
	assert_eq!(borrowed.data(), &original.view());
	borrowed.index_axis_mut(Axis(0), 0).mapv_inplace(|value| value + 5.0);
	let written = borrowed.index_axis(Axis(0), 0).to_owned();
	drop(borrowed);
	assert_eq!(written.data(), &data.index_axis(Axis(0), 0));
	assert_ne!(data, original);
}

#[test]
fn test_new_from_vec() {
	let array = AttrArray::from_vec((0..10).collect::<Vec<i64>>(), Attrs::new().with("name", "range"))
		.unwrap();
	assert_eq!(array.attr("name").and_then(AttrValue::as_str), Some("range"));
	assert_eq!(array.dtype(), DType::Int64);
	let expected = Array1::from((0..10).collect::<Vec<i64>>()).into_dyn();
	assert!(array.eq_elementwise(&expected).unwrap().all());
	let array = AttrArray::from_vec(vec![1, 2, 3], Attrs::new().with("name", "range")).unwrap();
	assert_eq!(array.shape(), &[3]);
	assert_eq!(array[[1]], 2);
}

#[test]
fn test_inherit() {
	let list = AttrArray::from_shape_vec(
		&[2, 3],
		vec![1.0, 2.0, 3.0, 4.5, 6.0, 7.0],
		Attrs::new().with("name", "list"),
	)
	.unwrap();
	let renamed = AttrArray::inherit(&list, Attrs::new().with("name", "attrarray")).unwrap();
	assert_eq!(renamed.attr("name").and_then(AttrValue::as_str), Some("attrarray"));
	assert_eq!(renamed.data(), list.data());
	let extended = AttrArray::inherit(
		&list,
		Attrs::new().with("newname", "attrarray").with("test", 44),
	)
	.unwrap();
	assert_eq!(extended.attr("newname").and_then(AttrValue::as_str), Some("attrarray"));
	assert_eq!(extended.attr("test").and_then(AttrValue::as_i64), Some(44));
	assert_eq!(extended.attr("name").and_then(AttrValue::as_str), Some("list"));
	assert!(!list.has_attr("newname"));
}

#[test]
fn test_set_attr() {
	use crate::{attrs::REQUIRED_ATTRS_KEY, test_util::random_array};
	let mut array = AttrArray::new(random_array(&[10], 4), Attrs::new().with("name", "randvals"))
		.unwrap();
	array.set_attr("custom", "attribute").unwrap();
	assert_eq!(array.attr("custom").and_then(AttrValue::as_str), Some("attribute"));
	assert_eq!(
		array.set_attr(REQUIRED_ATTRS_KEY, "test"),
		Err(AttrError::ReadOnly(REQUIRED_ATTRS_KEY.to_owned()))
	);
	assert!(array.has_attr(REQUIRED_ATTRS_KEY));
	assert_eq!(
		array.remove_attr(REQUIRED_ATTRS_KEY),
		Err(AttrError::ReadOnly(REQUIRED_ATTRS_KEY.to_owned()))
	);
	assert_eq!(array.remove_attr("custom").unwrap(), Some(AttrValue::from("attribute")));
	assert!(!array.has_attr("custom"));
}

#[test]
fn test_get_attr() {
	use crate::test_util::random_array;
	let array = AttrArray::new(random_array(&[10], 5), Attrs::new().with("name", "randvals"))
		.unwrap();
	assert_eq!(array.attr("name").and_then(AttrValue::as_str), Some("randvals"));
	assert_eq!(array.attr("unset"), None);
}

#[test]
fn test_required_attrs() {
	use crate::{
		attrs::{AttrKind, RequiredAttr},
		test_util::random_array,
	};
	let required = RequiredAttrs::new(vec![RequiredAttr::new("name", AttrKind::Str)]);
	let result = AttrArray::new(random_array(&[3], 6), Attrs::with_required(required.clone()));
	assert!(matches!(
		result,
		Err(AttrArrayError::Attr(AttrError::MissingRequired(_)))
	));
	let array = AttrArray::new(
		random_array(&[3], 6),
		Attrs::with_required(required.clone()).with("name", "dim"),
	)
	.unwrap();
	assert_eq!(array.required_attrs(), &required);
	// Derived arrays require the same attributes.
	assert_eq!(array.index_axis(Axis(0), 1).required_attrs(), &required);
}

#[test]
fn test_derived_attrs_are_copied() {
	use crate::test_util::random_array;
	let array = AttrArray::new(random_array(&[4, 5], 7), Attrs::new().with("name", "randvals"))
		.unwrap();
	let mut row = array.index_axis(Axis(0), 2);
	row.set_attr("name", "row").unwrap();
	assert_eq!(row.attr("name").and_then(AttrValue::as_str), Some("row"));
	assert_eq!(array.attr("name").and_then(AttrValue::as_str), Some("randvals"));
	let mut sliced = array.slice_axis(Axis(1), Slice::from(1..3)).to_owned();
	assert_eq!(sliced.shape(), &[4, 2]);
	sliced.set_attr("custom", 1).unwrap();
	assert!(!array.has_attr("custom"));
}

#[test]
fn test_eq_elementwise_shape_mismatch() {
	use crate::test_util::random_array;
	let array = AttrArray::new(random_array(&[4], 8), Attrs::new()).unwrap();
	let other = random_array(&[5], 8);
	assert!(matches!(
		array.eq_elementwise(&other),
		Err(AttrArrayError::ShapeMismatch { .. })
	));
}

#[test]
fn test_shape_error() {
	let result = AttrArray::from_shape_vec(&[2, 2], vec![1, 2, 3], Attrs::new());
	assert!(matches!(result, Err(AttrArrayError::Shape(_))));
}

#[test]
fn test_views() {
	let mut data = ArrayD::<i64>::zeros(IxDyn(&[3, 4]));
	{
		let view = AttrArrayView::new(data.view(), Attrs::new().with("name", "zeros")).unwrap();
		assert_eq!(view.attr("name").and_then(AttrValue::as_str), Some("zeros"));
		assert!(view.mapv(|value| value == 0).all());
	}
	let mut array = AttrArray::new(data.clone(), Attrs::new().with("name", "zeros")).unwrap();
	array.slice_axis_mut(Axis(1), Slice::from(2..)).fill(7);
	assert_eq!(array[[0, 3]], 7);
	assert_eq!(array[[0, 1]], 0);
	array[[2, 0]] = -1;
	assert_eq!(array.get(&[2, 0][..]), Some(&-1));
	assert_eq!(array.get(&[3, 0][..]), None);
	{
		let mut borrowed = AttrArrayViewMut::new(data.view_mut(), Attrs::new()).unwrap();
		*borrowed.get_mut(&[1, 1][..]).unwrap() = 5;
	}
	assert_eq!(data[[1, 1]], 5);
	let (data, attrs) = array.into_parts();
	assert_eq!(data.shape(), &[3, 4]);
	assert_eq!(attrs.get("name").and_then(AttrValue::as_str), Some("zeros"));
}

#[test]
fn test_required_attrs_stay_read_only() {
	use crate::attrs::{AttrKind, RequiredAttr, REQUIRED_ATTRS_KEY};
	let required = RequiredAttrs::new(vec![RequiredAttr::new("name", AttrKind::Str)]);
	let mut array = AttrArray::from_vec(
		vec![1.0, 2.0],
		Attrs::with_required(required.clone()).with("name", "dim"),
	)
	.unwrap();
	let expected = required.as_value().clone();
	assert_eq!(array.attr(REQUIRED_ATTRS_KEY), Some(&expected));
	assert!(array.set_attr(REQUIRED_ATTRS_KEY, "test").is_err());
	assert!(array.remove_attr(REQUIRED_ATTRS_KEY).is_err());
	assert!(array.remove_attr("name").is_err());
	assert!(array.set_attr("name", 3).is_err());
	assert!(AttrArray::inherit(&array, Attrs::new().with(REQUIRED_ATTRS_KEY, "test")).is_err());
	assert!(AttrArray::new(
		array.data().clone(),
		array.attrs().clone().with(REQUIRED_ATTRS_KEY, "test")
	)
	.is_err());
	// After every rejected write the array still satisfies its requirements.
	assert_eq!(array.attr(REQUIRED_ATTRS_KEY), Some(&expected));
	assert_eq!(array.attr("name").and_then(AttrValue::as_str), Some("dim"));
	assert_eq!(array.attrs().validate(), Ok(()));
	let restored: AttrArray<f64> = crate::deserialize(&crate::serialize(&array).unwrap()).unwrap();
	assert_eq!(restored, array);
}

#[test]
fn test_slice() {
	let array = AttrArray::from_shape_vec(
		&[3, 4],
		(0..12).collect::<Vec<i64>>(),
		Attrs::new().with("name", "grid"),
	)
	.unwrap();
	let mut sliced = array.slice(s![1.., ..;2]);
	assert_eq!(sliced.shape(), &[2, 2]);
	assert_eq!(sliced.data(), &arr2(&[[4, 6], [8, 10]]).into_dyn().view());
	assert_eq!(sliced.attr("name").and_then(AttrValue::as_str), Some("grid"));
	sliced.set_attr("name", "sliced").unwrap();
	assert_eq!(array.attr("name").and_then(AttrValue::as_str), Some("grid"));
	let column = array.slice(s![.., 3]);
	assert_eq!(column.shape(), &[3]);
	assert_eq!(column.attr("name").and_then(AttrValue::as_str), Some("grid"));
}

#[test]
fn test_slice_mut() {
	let mut array = AttrArray::from_shape_vec(&[2, 3], vec![0; 6], Attrs::new().with("name", "grid"))
		.unwrap();
	let mut corner = array.slice_mut(s![..1, 1..]);
	assert_eq!(corner.attr("name").and_then(AttrValue::as_str), Some("grid"));
	corner.fill(9);
	assert_eq!(array.data(), &arr2(&[[0, 9, 9], [0, 0, 0]]).into_dyn());
}

#[test]
fn test_transpose_and_reshape() {
	let array = AttrArray::from_shape_vec(
		&[2, 3],
		vec![1, 2, 3, 4, 5, 6],
		Attrs::new().with("name", "grid"),
	)
	.unwrap();
	let transposed = array.t();
	assert_eq!(transposed.shape(), &[3, 2]);
	assert_eq!(transposed[[2, 0]], 3);
	assert_eq!(transposed.attr("name").and_then(AttrValue::as_str), Some("grid"));
	let reshaped = array.clone().into_shape(&[3, 2]).unwrap();
	assert_eq!(reshaped.shape(), &[3, 2]);
	assert_eq!(reshaped[[2, 0]], 5);
	assert_eq!(reshaped.attrs(), array.attrs());
	assert!(matches!(
		array.into_shape(&[4, 2]),
		Err(AttrArrayError::Shape(_))
	));
}
