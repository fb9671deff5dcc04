//! Loss functions for the presence and pose heads.

use burn::prelude::Backend;
use burn::tensor::activation::log_softmax;
use burn::tensor::{Int, Tensor};

/// Clamp applied to probabilities before taking logs.
const EPS: f32 = 1e-7;

/// Binary cross-entropy on presence probabilities.
///
/// # Arguments
///
/// - `probs`: Sigmoid outputs `[batch, 1]`
/// - `targets`: Presence labels (0 or 1) `[batch, 1]`
///
/// # Returns
///
/// Scalar loss value.
pub fn presence_loss<B: Backend>(probs: Tensor<B, 2>, targets: Tensor<B, 2>) -> Tensor<B, 1> {
    let probs = probs.clamp(EPS, 1.0 - EPS);

    // -[t * log(p) + (1-t) * log(1-p)]
    let log_prob = probs.clone().log();
    let log_one_minus_prob = (Tensor::ones_like(&probs) - probs).log();

    let bce = targets.clone().neg() * log_prob
        - (Tensor::ones_like(&targets) - targets) * log_one_minus_prob;

    bce.mean()
}

/// Categorical cross-entropy on raw pose logits.
///
/// # Arguments
///
/// - `logits`: Pose head outputs `[batch, num_classes]`
/// - `targets`: Class indices `[batch]`
///
/// # Returns
///
/// Scalar loss value.
pub fn pose_loss<B: Backend>(logits: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> Tensor<B, 1> {
    let [batch, _] = logits.dims();
    let log_probs = log_softmax(logits, 1);
    log_probs
        .gather(1, targets.reshape([batch, 1]))
        .neg()
        .mean()
}

/// Joint objective: `presence_loss + pose_loss`.
pub fn joint_loss<B: Backend>(
    presence: Tensor<B, 2>,
    presence_targets: Tensor<B, 2>,
    pose_logits: Tensor<B, 2>,
    pose_targets: Tensor<B, 1, Int>,
) -> Tensor<B, 1> {
    presence_loss(presence, presence_targets) + pose_loss(pose_logits, pose_targets)
}
