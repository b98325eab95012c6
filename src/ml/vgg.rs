// ============================================================
// Layer 5 — VGG16 Feature Extractor
// ============================================================
// Frozen perceptual network for the style loss. Only the
// convolutional stack up to block5_conv2 is built; the deeper
// layers never feed the loss.
//
//   block1  conv 3→64,   64→64             → pool
//   block2  conv 64→128, 128→128  ★        → pool
//   block3  conv ×3 at 256        ★ conv2  → pool
//   block4  conv ×3 at 512        ★ conv2  → pool
//   block5  conv ×2 at 512        ★ conv2
//
// ★ = activation handed to the loss (after ReLU).
//
// Input policy: images arrive as RGB in [0, 255]. The channel
// means are subtracted and the channels reversed to BGR before
// the first conv, the layout the pretrained weights expect.
//
// Reference: Simonyan & Zisserman (2014) Very Deep Convolutional
//            Networks for Large-Scale Image Recognition

use anyhow::{Context, Result};
use std::path::Path;
use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{MaxPool2d, MaxPool2dConfig},
        PaddingConfig2d,
    },
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
    tensor::activation::relu,
};

/// Per-channel means in RGB order
pub const CHANNEL_MEANS: [f32; 3] = [123.68, 116.779, 103.939];

/// Activations exposed to the loss, shallowest first
pub const LAYER_NAMES: [&str; 4] = ["block2_conv2", "block3_conv2", "block4_conv2", "block5_conv2"];

/// A named intermediate activation
pub struct Activation<B: Backend> {
    pub name:   &'static str,
    pub tensor: Tensor<B, 4>,
}

/// Any network that maps an image batch to the activations the
/// composite loss compares.
pub trait FeatureExtractor<B: Backend> {
    /// images: [batch, 3, H, W], RGB in [0, 255]
    fn extract(&self, images: Tensor<B, 4>) -> Vec<Activation<B>>;
}

#[derive(Module, Debug)]
pub struct Vgg16Features<B: Backend> {
    conv1_1: Conv2d<B>,
    conv1_2: Conv2d<B>,

    conv2_1: Conv2d<B>,
    conv2_2: Conv2d<B>,

    conv3_1: Conv2d<B>,
    conv3_2: Conv2d<B>,
    conv3_3: Conv2d<B>,

    conv4_1: Conv2d<B>,
    conv4_2: Conv2d<B>,
    conv4_3: Conv2d<B>,

    conv5_1: Conv2d<B>,
    conv5_2: Conv2d<B>,

    pool: MaxPool2d,
}

fn conv3x3<B: Backend>(channels_in: usize, channels_out: usize, device: &B::Device) -> Conv2d<B> {
    Conv2dConfig::new([channels_in, channels_out], [3, 3])
        .with_padding(PaddingConfig2d::Same)
        .init(device)
}

impl<B: Backend> Vgg16Features<B> {
    /// Randomly initialised extractor with parameters frozen.
    pub fn new(device: &B::Device) -> Self {
        Self {
            conv1_1: conv3x3(3, 64, device),
            conv1_2: conv3x3(64, 64, device),
            conv2_1: conv3x3(64, 128, device),
            conv2_2: conv3x3(128, 128, device),
            conv3_1: conv3x3(128, 256, device),
            conv3_2: conv3x3(256, 256, device),
            conv3_3: conv3x3(256, 256, device),
            conv4_1: conv3x3(256, 512, device),
            conv4_2: conv3x3(512, 512, device),
            conv4_3: conv3x3(512, 512, device),
            conv5_1: conv3x3(512, 512, device),
            conv5_2: conv3x3(512, 512, device),
            pool: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
        }
        .no_grad()
    }

    /// Load pretrained weights from a NamedMpk record file.
    /// The record must use this module's field names.
    pub fn from_file(path: &Path, device: &B::Device) -> Result<Self> {
        let record = NamedMpkFileRecorder::<FullPrecisionSettings>::new()
            .load(path.to_path_buf(), device)
            .with_context(|| format!("Cannot load VGG16 weights from '{}'", path.display()))?;
        tracing::info!("Loaded VGG16 weights from '{}'", path.display());
        // load_record replaces the params, so freeze again afterwards
        Ok(Self::new(device).load_record(record).no_grad())
    }

    /// Weights from `path` when given, random otherwise.
    pub fn load_or_random(path: Option<&Path>, device: &B::Device) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p, device),
            None => {
                tracing::warn!(
                    "No VGG16 weights given; the perceptual loss uses random features"
                );
                Ok(Self::new(device))
            }
        }
    }
}

impl<B: Backend> FeatureExtractor<B> for Vgg16Features<B> {
    fn extract(&self, images: Tensor<B, 4>) -> Vec<Activation<B>> {
        let mut out = Vec::with_capacity(LAYER_NAMES.len());
        let x = preprocess(images);

        let x = relu(self.conv1_1.forward(x));
        let x = relu(self.conv1_2.forward(x));
        let x = self.pool.forward(x);

        let x = relu(self.conv2_1.forward(x));
        let x = relu(self.conv2_2.forward(x));
        out.push(Activation { name: LAYER_NAMES[0], tensor: x.clone() });
        let x = self.pool.forward(x);

        let x = relu(self.conv3_1.forward(x));
        let x = relu(self.conv3_2.forward(x));
        out.push(Activation { name: LAYER_NAMES[1], tensor: x.clone() });
        let x = relu(self.conv3_3.forward(x));
        let x = self.pool.forward(x);

        let x = relu(self.conv4_1.forward(x));
        let x = relu(self.conv4_2.forward(x));
        out.push(Activation { name: LAYER_NAMES[2], tensor: x.clone() });
        let x = relu(self.conv4_3.forward(x));
        let x = self.pool.forward(x);

        let x = relu(self.conv5_1.forward(x));
        let x = relu(self.conv5_2.forward(x));
        out.push(Activation { name: LAYER_NAMES[3], tensor: x });

        out
    }
}

fn channel_means<B: Backend>(device: &B::Device) -> Tensor<B, 4> {
    Tensor::<B, 1>::from_floats(CHANNEL_MEANS, device).reshape([1, 3, 1, 1])
}

/// RGB [0, 255] → mean-centred BGR.
pub fn preprocess<B: Backend>(images: Tensor<B, 4>) -> Tensor<B, 4> {
    let means = channel_means::<B>(&images.device());
    (images - means).flip([1])
}

/// Inverse of `preprocess`, clipped to [0, 255].
pub fn deprocess<B: Backend>(features: Tensor<B, 4>) -> Tensor<B, 4> {
    let means = channel_means::<B>(&features.device());
    (features.flip([1]) + means).clamp(0.0, 255.0)
}
