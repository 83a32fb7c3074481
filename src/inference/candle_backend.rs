//! Candle-based classifier backend.
//!
//! Pure-Rust execution of the two IMDB network shapes produced by the
//! training scripts, loaded from a safetensors artifact:
//!
//! - **dense**: Embedding → Flatten → Dense(relu) → Dense(relu) → Dense(sigmoid)
//! - **conv**: Embedding → Conv1D(relu) → GlobalMaxPool → Dense(relu) → Dense(sigmoid)
//!
//! Dropout layers are identity at inference time and carry no weights.

use std::path::Path;

use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor, D};
use candle_nn::{Conv1d, Conv1dConfig, Embedding, Linear, Module, VarBuilder};
use serde::{Deserialize, Serialize};

use crate::inference::encoder::EncodedSequence;
use crate::inference::ClassifierBackend;

fn default_embedding_dim() -> usize {
    64
}

fn default_dense_units() -> usize {
    64
}

fn default_conv_filters() -> usize {
    256
}

fn default_conv_kernel_size() -> usize {
    3
}

fn default_conv_dense_units() -> usize {
    256
}

/// Network architecture of the trained artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArchitecture {
    /// Flattened embeddings followed by two hidden dense layers.
    Dense {
        #[serde(default = "default_embedding_dim")]
        embedding_dim: usize,
        #[serde(default = "default_dense_units")]
        dense_units: usize,
    },
    /// 1D convolution with global max pooling and one hidden dense layer.
    Conv {
        #[serde(default = "default_embedding_dim")]
        embedding_dim: usize,
        #[serde(default = "default_conv_filters")]
        conv_filters: usize,
        #[serde(default = "default_conv_kernel_size")]
        conv_kernel_size: usize,
        #[serde(default = "default_conv_dense_units")]
        dense_units: usize,
    },
}

impl Default for ModelArchitecture {
    fn default() -> Self {
        Self::Dense {
            embedding_dim: default_embedding_dim(),
            dense_units: default_dense_units(),
        }
    }
}

impl ModelArchitecture {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Dense { .. } => "dense",
            Self::Conv { .. } => "conv",
        }
    }
}

/// Shape parameters needed to materialize a network from its weights.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub vocab_size: usize,
    pub max_length: usize,
    pub architecture: ModelArchitecture,
}

/// Select the best available compute device.
///
/// Tries Metal (macOS) or CUDA (with the `cuda` feature), falling back to CPU.
pub fn select_device() -> Device {
    #[cfg(target_os = "macos")]
    {
        if let Ok(device) = Device::new_metal(0) {
            tracing::info!("Using Metal GPU for inference");
            return device;
        }
    }
    #[cfg(feature = "cuda")]
    {
        if let Ok(device) = Device::new_cuda(0) {
            tracing::info!("Using CUDA GPU for inference");
            return device;
        }
    }
    tracing::info!("Using CPU for inference");
    Device::Cpu
}

enum Network {
    Dense {
        embedding: Embedding,
        hidden: [Linear; 2],
        output: Linear,
    },
    Conv {
        embedding: Embedding,
        conv: Conv1d,
        hidden: Linear,
        output: Linear,
    },
}

impl Network {
    /// Forward pass: `[1, max_length]` ids → `[1, 1]` logits.
    fn forward(&self, input_ids: &Tensor) -> candle_core::Result<Tensor> {
        match self {
            Network::Dense {
                embedding,
                hidden,
                output,
            } => {
                // [1, L, E] -> [1, L*E]
                let x = embedding.forward(input_ids)?.flatten_from(1)?;
                let x = hidden[0].forward(&x)?.relu()?;
                let x = hidden[1].forward(&x)?.relu()?;
                output.forward(&x)
            }
            Network::Conv {
                embedding,
                conv,
                hidden,
                output,
            } => {
                // Conv1d expects [batch, channels, length]
                let x = embedding.forward(input_ids)?.transpose(1, 2)?.contiguous()?;
                let x = conv.forward(&x)?.relu()?;
                let x = x.max(D::Minus1)?;
                let x = hidden.forward(&x)?.relu()?;
                output.forward(&x)
            }
        }
    }
}

/// Binary text classifier executed with candle.
pub struct CandleClassifier {
    network: Network,
    device: Device,
    spec: ModelSpec,
}

impl CandleClassifier {
    /// Load a classifier from a safetensors artifact.
    ///
    /// Tensor names: `embedding.weight`, `dense_0.*`, `dense_1.*` (dense only),
    /// `conv.*` (conv only) and `output.*`. Shapes are checked against `spec`.
    pub fn load(weights_path: &Path, spec: ModelSpec, device: Device) -> Result<Self> {
        if spec.vocab_size == 0 || spec.max_length == 0 {
            anyhow::bail!("vocab_size and max_length must be positive");
        }

        // SAFETY: mmap'd safetensors file; sound as long as the file is not modified
        // while the model is in use.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)
                .context("Failed to load classifier weights")?
        };

        let network = match spec.architecture {
            ModelArchitecture::Dense {
                embedding_dim,
                dense_units,
            } => {
                let embedding =
                    candle_nn::embedding(spec.vocab_size, embedding_dim, vb.pp("embedding"))
                        .context("Failed to load embedding layer")?;
                let dense_0 = candle_nn::linear(
                    spec.max_length * embedding_dim,
                    dense_units,
                    vb.pp("dense_0"),
                )
                .context("Failed to load dense_0")?;
                let dense_1 = candle_nn::linear(dense_units, dense_units, vb.pp("dense_1"))
                    .context("Failed to load dense_1")?;
                let output = candle_nn::linear(dense_units, 1, vb.pp("output"))
                    .context("Failed to load output layer")?;
                Network::Dense {
                    embedding,
                    hidden: [dense_0, dense_1],
                    output,
                }
            }
            ModelArchitecture::Conv {
                embedding_dim,
                conv_filters,
                conv_kernel_size,
                dense_units,
            } => {
                if conv_kernel_size == 0 || conv_kernel_size > spec.max_length {
                    anyhow::bail!(
                        "conv_kernel_size {} must be in 1..={}",
                        conv_kernel_size,
                        spec.max_length
                    );
                }
                let embedding =
                    candle_nn::embedding(spec.vocab_size, embedding_dim, vb.pp("embedding"))
                        .context("Failed to load embedding layer")?;
                let conv = candle_nn::conv1d(
                    embedding_dim,
                    conv_filters,
                    conv_kernel_size,
                    Conv1dConfig::default(),
                    vb.pp("conv"),
                )
                .context("Failed to load conv layer")?;
                let hidden = candle_nn::linear(conv_filters, dense_units, vb.pp("dense_0"))
                    .context("Failed to load dense_0")?;
                let output = candle_nn::linear(dense_units, 1, vb.pp("output"))
                    .context("Failed to load output layer")?;
                Network::Conv {
                    embedding,
                    conv,
                    hidden,
                    output,
                }
            }
        };

        tracing::info!(
            "Loaded {} classifier from {} (vocab {}, max length {})",
            spec.architecture.name(),
            weights_path.display(),
            spec.vocab_size,
            spec.max_length
        );

        Ok(Self {
            network,
            device,
            spec,
        })
    }
}

impl ClassifierBackend for CandleClassifier {
    fn infer(&self, sequence: &EncodedSequence) -> Result<f32> {
        if sequence.len() != self.spec.max_length {
            anyhow::bail!(
                "Expected a sequence of length {}, got {}",
                self.spec.max_length,
                sequence.len()
            );
        }

        let input_ids = Tensor::new(sequence.as_slice(), &self.device)?.unsqueeze(0)?;
        let logits = self.network.forward(&input_ids)?;

        // sigmoid(x) = 1 / (1 + e^-x)
        let probability = (logits.neg()?.exp()? + 1.0)?.recip()?;
        let probability = probability.flatten_all()?.to_vec1::<f32>()?;

        probability
            .first()
            .copied()
            .context("Classifier produced no output")
    }

    fn vocab_size(&self) -> usize {
        self.spec.vocab_size
    }

    fn max_length(&self) -> usize {
        self.spec.max_length
    }
}
