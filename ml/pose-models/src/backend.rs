//! Backend type definitions and device management.

use burn::backend::{Autodiff, NdArray};
use burn::prelude::Backend;

/// CPU backend used for validation and inference.
pub type InferenceBackend = NdArray<f32>;

/// Differentiable backend used for training.
///
/// Calling `valid()` on a model built for this backend yields the same
/// model on [`InferenceBackend`].
pub type TrainingBackend = Autodiff<InferenceBackend>;

/// Returns the default device for a backend.
///
/// # Example
///
/// ```
/// use pose_models::{default_device, InferenceBackend};
///
/// let device = default_device::<InferenceBackend>();
/// assert_eq!(device, Default::default());
/// ```
#[must_use]
pub fn default_device<B: Backend>() -> B::Device {
    B::Device::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::tensor::Tensor;

    #[test]
    fn training_and_inference_share_devices() {
        let device = default_device::<TrainingBackend>();
        let tensor = Tensor::<TrainingBackend, 1>::ones([3], &device);
        let inner = tensor.inner();
        assert_eq!(inner.dims(), [3]);
    }
}
