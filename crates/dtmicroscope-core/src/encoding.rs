//! Transport-safe encoding of scan arrays.
//!
//! An N-dimensional array becomes `{data, shape, dtype}`: `data` is a nested
//! JSON list with one nesting level per dimension. Finite values are carried
//! exactly; NaN and infinities become `null`, which is how JSON represents a
//! number it cannot hold.

use ndarray::{ArrayBase, ArrayViewD, Data, Dimension};
use serde::Serialize;
use serde_json::Value;

/// Numeric element types the encoder knows how to tag.
pub trait Element: Copy {
    /// Element-type tag reported as `dtype`.
    const DTYPE: &'static str;

    fn to_f64(self) -> f64;
}

impl Element for f32 {
    const DTYPE: &'static str = "float32";

    fn to_f64(self) -> f64 {
        f64::from(self)
    }
}

impl Element for f64 {
    const DTYPE: &'static str = "float64";

    fn to_f64(self) -> f64 {
        self
    }
}

/// Encoded array payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodedArray {
    pub data: Value,
    pub shape: Vec<usize>,
    pub dtype: String,
}

/// Encode an array of any dimensionality.
pub fn encode<T, S, D>(array: &ArrayBase<S, D>) -> EncodedArray
where
    T: Element,
    S: Data<Elem = T>,
    D: Dimension,
{
    let view = array.view().into_dyn();
    EncodedArray {
        shape: view.shape().to_vec(),
        data: encode_view(view),
        dtype: T::DTYPE.to_string(),
    }
}

fn encode_view<T: Element>(view: ArrayViewD<'_, T>) -> Value {
    if view.ndim() == 0 {
        return view.iter().next().map_or(Value::Null, |v| scalar(*v));
    }
    Value::Array(view.outer_iter().map(encode_view).collect())
}

fn scalar<T: Element>(value: T) -> Value {
    serde_json::Number::from_f64(value.to_f64())
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
