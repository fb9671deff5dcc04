//! LSTM sequence classifier with presence and pose heads.

use burn::module::Module;
use burn::nn;
use burn::prelude::Backend;
use burn::tensor::Tensor;
use burn::tensor::activation::{relu, sigmoid};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Configuration for the sequence classifier.
///
/// # Example
///
/// ```
/// use pose_models::SequenceClassifierConfig;
///
/// let config = SequenceClassifierConfig::default();
/// assert_eq!(config.input_size, 256);
/// assert_eq!(config.hidden_size, 128);
/// assert!(config.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceClassifierConfig {
    /// Feature vector length (one value per CSI subcarrier).
    pub input_size: usize,

    /// Hidden width of every LSTM layer.
    pub hidden_size: usize,

    /// Number of stacked LSTM layers.
    pub num_layers: usize,

    /// Number of pose classes (width of the pose head).
    pub num_classes: usize,

    /// Width of the shared dense projection.
    pub dense_size: usize,

    /// Dropout probability applied in training mode.
    pub dropout: f64,
}

impl Default for SequenceClassifierConfig {
    fn default() -> Self {
        Self {
            input_size: 256,
            hidden_size: 128,
            num_layers: 2,
            num_classes: 5,
            dense_size: 128,
            dropout: 0.3,
        }
    }
}

impl SequenceClassifierConfig {
    /// Creates a default configuration with a custom input size.
    #[must_use]
    pub fn new(input_size: usize) -> Self {
        Self {
            input_size,
            ..Self::default()
        }
    }

    /// Sets the LSTM hidden width.
    #[must_use]
    pub const fn with_hidden_size(mut self, hidden_size: usize) -> Self {
        self.hidden_size = hidden_size;
        self
    }

    /// Sets the number of LSTM layers.
    #[must_use]
    pub const fn with_num_layers(mut self, num_layers: usize) -> Self {
        self.num_layers = num_layers;
        self
    }

    /// Sets the number of pose classes.
    #[must_use]
    pub const fn with_num_classes(mut self, num_classes: usize) -> Self {
        self.num_classes = num_classes;
        self
    }

    /// Sets the dense projection width.
    #[must_use]
    pub const fn with_dense_size(mut self, dense_size: usize) -> Self {
        self.dense_size = dense_size;
        self
    }

    /// Sets the dropout probability.
    #[must_use]
    pub const fn with_dropout(mut self, dropout: f64) -> Self {
        self.dropout = dropout;
        self
    }

    /// Returns `true` if all dimensions are positive and dropout is in `[0, 1)`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        let dims = [
            ("input_size", self.input_size),
            ("hidden_size", self.hidden_size),
            ("num_layers", self.num_layers),
            ("num_classes", self.num_classes),
            ("dense_size", self.dense_size),
        ];
        if let Some((name, _)) = dims.iter().find(|(_, v)| *v == 0) {
            return Err(ModelError::invalid_config(format!("{name} must be > 0")));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(ModelError::invalid_config(format!(
                "dropout must be in [0, 1), got {}",
                self.dropout
            )));
        }
        Ok(())
    }

    /// Validates the configuration and builds a classifier.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConfig`] if the configuration is invalid.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<SequenceClassifier<B>> {
        self.validate()?;
        Ok(SequenceClassifier::new(self, device))
    }
}

/// Whether a forward pass is part of training or evaluation.
///
/// Dropout is only applied in [`ForwardMode::Train`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForwardMode {
    /// Training pass: dropout active.
    Train,
    /// Evaluation pass: deterministic.
    #[default]
    Eval,
}

impl ForwardMode {
    /// Returns `true` for [`ForwardMode::Train`].
    #[must_use]
    pub const fn is_train(self) -> bool {
        matches!(self, Self::Train)
    }
}

/// Outputs of one forward pass.
#[derive(Debug, Clone)]
pub struct ClassifierOutput<B: Backend> {
    /// Presence probabilities, shape `[batch, 1]`, each in `[0, 1]`.
    pub presence: Tensor<B, 2>,
    /// Raw pose logits, shape `[batch, num_classes]`.
    pub pose_logits: Tensor<B, 2>,
}

/// Multi-layer LSTM encoder with a shared dense layer and two heads.
///
/// Architecture: Input `[batch, input_size]` -> single-step sequence ->
/// LSTM x `num_layers` -> last hidden state -> Linear(`dense_size`) ->
/// Dropout (training only) -> `ReLU` -> { presence: Linear(1) -> sigmoid,
/// pose: Linear(`num_classes`) }.
///
/// # Type Parameters
///
/// - `B`: The Burn backend (e.g., `NdArray`, `Autodiff<NdArray>`)
#[derive(Debug, Module)]
pub struct SequenceClassifier<B: Backend> {
    lstm: Vec<nn::Lstm<B>>,
    dense: nn::Linear<B>,
    dropout: nn::Dropout,
    presence_head: nn::Linear<B>,
    pose_head: nn::Linear<B>,
    /// Input width (a constant, not a parameter).
    input_size: usize,
    num_classes: usize,
}

impl<B: Backend> SequenceClassifier<B> {
    /// Creates a new classifier with freshly initialized weights.
    ///
    /// The configuration is assumed valid; use
    /// [`SequenceClassifierConfig::init`] to validate first.
    #[must_use]
    pub fn new(config: &SequenceClassifierConfig, device: &B::Device) -> Self {
        let lstm = (0..config.num_layers)
            .map(|layer| {
                let d_input = if layer == 0 {
                    config.input_size
                } else {
                    config.hidden_size
                };
                nn::LstmConfig::new(d_input, config.hidden_size, true).init(device)
            })
            .collect();
        let dense = nn::LinearConfig::new(config.hidden_size, config.dense_size).init(device);
        let dropout = nn::DropoutConfig::new(config.dropout).init();
        let presence_head = nn::LinearConfig::new(config.dense_size, 1).init(device);
        let pose_head = nn::LinearConfig::new(config.dense_size, config.num_classes).init(device);

        Self {
            lstm,
            dense,
            dropout,
            presence_head,
            pose_head,
            input_size: config.input_size,
            num_classes: config.num_classes,
        }
    }

    /// Returns the expected feature vector length.
    #[must_use]
    pub const fn input_size(&self) -> usize {
        self.input_size
    }

    /// Returns the width of the pose head.
    #[must_use]
    pub const fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Checks a `[batch, width]` shape against the input contract.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Shape`] for an empty batch or a width other
    /// than `input_size`.
    pub fn check_input(&self, dims: [usize; 2]) -> Result<()> {
        let [batch, width] = dims;
        if batch == 0 || width != self.input_size {
            return Err(ModelError::shape(
                format!("[n > 0, {}]", self.input_size),
                format!("[{batch}, {width}]"),
            ));
        }
        Ok(())
    }

    /// Runs the forward pass.
    ///
    /// # Arguments
    ///
    /// - `input`: Features of shape `[batch_size, input_size]`
    /// - `mode`: Training or evaluation
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Shape`] if `input` violates the input contract.
    pub fn forward(&self, input: Tensor<B, 2>, mode: ForwardMode) -> Result<ClassifierOutput<B>> {
        self.check_input(input.dims())?;

        // Each feature vector is a sequence of length one.
        let mut x: Tensor<B, 3> = input.unsqueeze_dim(1);
        for layer in &self.lstm {
            let (output, _state) = layer.forward(x, None);
            x = output;
        }
        let [batch, steps, hidden] = x.dims();
        let last = x
            .slice([0..batch, steps - 1..steps, 0..hidden])
            .reshape([batch, hidden]);

        let mut h = self.dense.forward(last);
        if mode.is_train() {
            h = self.dropout.forward(h);
        }
        let h = relu(h);

        Ok(ClassifierOutput {
            presence: sigmoid(self.presence_head.forward(h.clone())),
            pose_logits: self.pose_head.forward(h),
        })
    }
}
