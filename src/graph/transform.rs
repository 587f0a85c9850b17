use crate::error::TransformError;
use crate::graph::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Converts a Gaussian kernel width from full-width-half-maximum to the sigma
/// convention `fslmaths` expects.
pub fn fwhm_to_sigma(fwhm: f64) -> f64 {
    fwhm / (8.0 * std::f64::consts::LN_2).sqrt()
}

/// A pure transform applied to a value as it travels along an edge.
///
/// The set is closed so every transform in a wired graph is auditable and
/// serializable; there are no opaque callbacks. Applied to a list, a transform
/// maps elementwise (the mapped-invocation case).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EdgeTransform {
    /// Select one channel of a multi-channel output (e.g. one tissue
    /// probability map out of the segmentation's per-class list).
    SelectVolume(usize),
    /// Turn a threshold into the `fslmaths` operator string `-thr <t> -bin`.
    ThresholdBinarize,
    /// Turn a FWHM into the Gaussian smoothing operator string
    /// `-kernel gauss <sigma> -fmean -mas %s`.
    GaussianSmoothOp,
}

impl EdgeTransform {
    /// Short discriminant used in graph signatures and DOT labels.
    pub fn kind(&self) -> &'static str {
        match self {
            EdgeTransform::SelectVolume(_) => "select_volume",
            EdgeTransform::ThresholdBinarize => "threshold_binarize",
            EdgeTransform::GaussianSmoothOp => "gaussian_smooth_op",
        }
    }

    /// Applies the transform to a concrete value.
    pub fn apply(&self, value: &Value) -> Result<Value, TransformError> {
        match self {
            EdgeTransform::SelectVolume(index) => match value {
                Value::List(items) => items.get(*index).cloned().ok_or(
                    TransformError::VolumeIndexOutOfRange {
                        index: *index,
                        len: items.len(),
                    },
                ),
                other => Err(TransformError::TypeMismatch {
                    transform: self.kind(),
                    expected: "a multi-channel list",
                    found: other.clone(),
                }),
            },
            EdgeTransform::ThresholdBinarize => {
                self.map_scalar(value, |t| format!("-thr {:.6} -bin", t))
            }
            EdgeTransform::GaussianSmoothOp => self.map_scalar(value, |fwhm| {
                format!("-kernel gauss {:.6} -fmean -mas %s", fwhm_to_sigma(fwhm))
            }),
        }
    }

    /// Applies a float-to-opstring conversion, mapping elementwise over lists.
    fn map_scalar(
        &self,
        value: &Value,
        render: impl Fn(f64) -> String + Copy,
    ) -> Result<Value, TransformError> {
        match value {
            Value::Float(t) => Ok(Value::Str(render(*t))),
            Value::Int(t) => Ok(Value::Str(render(*t as f64))),
            Value::List(items) => items
                .iter()
                .map(|item| self.map_scalar(item, render))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            other => Err(TransformError::TypeMismatch {
                transform: self.kind(),
                expected: "a number or list of numbers",
                found: other.clone(),
            }),
        }
    }
}

impl fmt::Display for EdgeTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeTransform::SelectVolume(index) => write!(f, "select_volume({})", index),
            other => write!(f, "{}", other.kind()),
        }
    }
}
