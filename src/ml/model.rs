// ============================================================
// Layer 5 — Style Transformer Network
// ============================================================
// Feed-forward network that repaints an image in one fixed
// style. Shapes for the default 320×320 input (NCHW, 64 filters):
//
//   input                       [N,  3, 320, 320]
//   zero pad 40                 [N,  3, 400, 400]
//   conv 9×9 /1  + BN + ReLU    [N, 64, 400, 400]
//   conv 3×3 /2  + BN + ReLU    [N, 64, 200, 200]
//   conv 3×3 /2  + BN + ReLU    [N, 64, 100, 100]
//   5 × residual crop block     [N, 64,  80,  80]   (−4 each)
//   up ×2, conv 3×3 + BN + ReLU [N, 64, 160, 160]
//   up ×2, conv 3×3 + BN + ReLU [N, 64, 320, 320]
//   conv 9×9, tanh              [N,  3, 320, 320]
//   (x + 1) · 127.5             values in [0, 255]
//
// The residual blocks use unpadded ("valid") convolutions, so
// each block shrinks the map by 4; the skip path is cropped by
// 2 pixels per side to match before the addition. The initial
// 40 pixel zero border pays for all five crops.

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        interpolate::{Interpolate2d, Interpolate2dConfig, InterpolateMode},
        BatchNorm, BatchNormConfig, PaddingConfig2d,
    },
    prelude::*,
    tensor::activation::{relu, tanh},
};

/// Side length of the images the network is built for
pub const INPUT_SIDE: usize = 320;

const CROP: usize = 2;

// Batch norm settings of the reference Keras layers. Burn's
// momentum weighs the new batch, Keras's weighs the running
// value, so Keras 0.99 becomes 0.01 here.
const NORM_EPSILON:  f64 = 1e-3;
const NORM_MOMENTUM: f64 = 0.01;

#[derive(Config, Debug)]
pub struct TransformerNetConfig {
    /// Channels of every hidden feature map
    #[config(default = 64)]
    pub filters: usize,

    #[config(default = 5)]
    pub residual_blocks: usize,

    /// Zero border added around the input on each side
    #[config(default = 40)]
    pub input_padding: usize,
}

impl TransformerNetConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> TransformerNet<B> {
        let f = self.filters;
        let head  = conv_block(3, f, 9, 1, PaddingConfig2d::Same, true, device);
        let down1 = conv_block(f, f, 3, 2, PaddingConfig2d::Explicit(1, 1), true, device);
        let down2 = conv_block(f, f, 3, 2, PaddingConfig2d::Explicit(1, 1), true, device);
        let residuals = (0..self.residual_blocks)
            .map(|_| ResCropBlock {
                first:  conv_block(f, f, 3, 1, PaddingConfig2d::Valid, true, device),
                second: conv_block(f, f, 3, 1, PaddingConfig2d::Valid, false, device),
            })
            .collect();
        let up1 = up_block(f, device);
        let up2 = up_block(f, device);
        let output = Conv2dConfig::new([f, 3], [9, 9])
            .with_padding(PaddingConfig2d::Same)
            .init(device);

        TransformerNet {
            head, down1, down2, residuals, up1, up2, output,
            input_padding: self.input_padding,
        }
    }

    /// Output side for a square input of `side` pixels.
    ///
    /// Equals `side` whenever the padded input divides by 4 and
    /// the residual stack does not eat the whole map.
    pub fn output_side(&self, side: usize) -> usize {
        let padded = side + 2 * self.input_padding;
        let down = |s: usize| (s + 2 - 3) / 2 + 1;
        let bottleneck = down(down(padded));
        let cropped = bottleneck.saturating_sub(4 * self.residual_blocks);
        cropped * 4
    }
}

fn conv_block<B: Backend>(
    channels_in:  usize,
    channels_out: usize,
    kernel:       usize,
    stride:       usize,
    padding:      PaddingConfig2d,
    activate:     bool,
    device:       &B::Device,
) -> ConvBlock<B> {
    let conv = Conv2dConfig::new([channels_in, channels_out], [kernel, kernel])
        .with_stride([stride, stride])
        .with_padding(padding)
        .init(device);
    let norm = norm_config(channels_out).init(device);
    ConvBlock { conv, norm, activate }
}

fn norm_config(channels: usize) -> BatchNormConfig {
    BatchNormConfig::new(channels)
        .with_epsilon(NORM_EPSILON)
        .with_momentum(NORM_MOMENTUM)
}

fn up_block<B: Backend>(filters: usize, device: &B::Device) -> UpBlock<B> {
    let upsample = Interpolate2dConfig::new()
        .with_scale_factor(Some([2.0, 2.0]))
        .with_mode(InterpolateMode::Nearest)
        .init();
    let conv = conv_block(filters, filters, 3, 1, PaddingConfig2d::Same, true, device);
    UpBlock { upsample, conv }
}

/// conv → batch norm → optional ReLU
#[derive(Module, Debug)]
pub struct ConvBlock<B: Backend> {
    pub conv:     Conv2d<B>,
    pub norm:     BatchNorm<B, 2>,
    pub activate: bool,
}

impl<B: Backend> ConvBlock<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.norm.forward(self.conv.forward(x));
        if self.activate { relu(x) } else { x }
    }
}

#[derive(Module, Debug)]
pub struct ResCropBlock<B: Backend> {
    pub first:  ConvBlock<B>,
    pub second: ConvBlock<B>,
}

impl<B: Backend> ResCropBlock<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let residual = self.second.forward(self.first.forward(x.clone()));
        residual + res_crop(x)
    }
}

#[derive(Module, Debug)]
pub struct UpBlock<B: Backend> {
    pub upsample: Interpolate2d,
    pub conv:     ConvBlock<B>,
}

impl<B: Backend> UpBlock<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        self.conv.forward(self.upsample.forward(x))
    }
}

#[derive(Module, Debug)]
pub struct TransformerNet<B: Backend> {
    pub head:          ConvBlock<B>,
    pub down1:         ConvBlock<B>,
    pub down2:         ConvBlock<B>,
    pub residuals:     Vec<ResCropBlock<B>>,
    pub up1:           UpBlock<B>,
    pub up2:           UpBlock<B>,
    pub output:        Conv2d<B>,
    pub input_padding: usize,
}

impl<B: Backend> TransformerNet<B> {
    /// images: [batch, 3, H, W] in 0–255 → stylised [batch, 3, H, W] in 0–255
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 4> {
        let mut x = zero_pad(images, self.input_padding);
        x = self.head.forward(x);
        x = self.down1.forward(x);
        x = self.down2.forward(x);
        for block in &self.residuals {
            x = block.forward(x);
        }
        x = self.up1.forward(x);
        x = self.up2.forward(x);
        rescale_output(tanh(self.output.forward(x)))
    }
}

/// Drop `CROP` pixels from every spatial edge.
pub fn res_crop<B: Backend>(x: Tensor<B, 4>) -> Tensor<B, 4> {
    let [n, c, h, w] = x.dims();
    x.slice([0..n, 0..c, CROP..h - CROP, CROP..w - CROP])
}

/// Map tanh output from [−1, 1] to pixel intensities [0, 255].
pub fn rescale_output<B: Backend>(x: Tensor<B, 4>) -> Tensor<B, 4> {
    x.add_scalar(1.0).mul_scalar(127.5)
}

fn zero_pad<B: Backend>(x: Tensor<B, 4>, pad: usize) -> Tensor<B, 4> {
    if pad == 0 {
        return x;
    }
    let [n, c, h, w] = x.dims();
    Tensor::zeros([n, c, h + 2 * pad, w + 2 * pad], &x.device())
        .slice_assign([0..n, 0..c, pad..pad + h, pad..pad + w], x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_output_side_for_default_config() {
        let cfg = TransformerNetConfig::new();
        assert_eq!(cfg.output_side(INPUT_SIDE), INPUT_SIDE);
        assert_eq!(cfg.output_side(32), 32);
    }

    #[test]
    fn test_forward_keeps_320_shape() {
        let device = Default::default();
        let model = TransformerNetConfig::new()
            .with_filters(4)
            .init::<TestBackend>(&device);
        let input = Tensor::<TestBackend, 4>::zeros([1, 3, INPUT_SIDE, INPUT_SIDE], &device);
        let output = model.forward(input);
        assert_eq!(output.dims(), [1, 3, INPUT_SIDE, INPUT_SIDE]);
    }

    #[test]
    fn test_output_in_pixel_range() {
        let device = Default::default();
        let model = TransformerNetConfig::new()
            .with_filters(4)
            .init::<TestBackend>(&device);
        let input = Tensor::<TestBackend, 4>::random(
            [2, 3, 32, 32],
            burn::tensor::Distribution::Uniform(0.0, 255.0),
            &device,
        );
        let output = model.forward(input);
        assert_eq!(output.dims(), [2, 3, 32, 32]);
        let values = output.into_data().to_vec::<f32>().unwrap();
        assert!(values.iter().all(|v| (0.0..=255.0).contains(v)));
    }

    #[test]
    fn test_norm_config_matches_keras_defaults() {
        let cfg = norm_config(8);
        assert_eq!(cfg.num_features, 8);
        assert_eq!(cfg.epsilon, 1e-3);
        assert_eq!(cfg.momentum, 0.01);
    }

    #[test]
    fn test_res_crop_trims_two_pixels() {
        let device = Default::default();
        let x = Tensor::<TestBackend, 4>::ones([1, 2, 10, 12], &device);
        assert_eq!(res_crop(x).dims(), [1, 2, 6, 8]);
    }

    #[test]
    fn test_rescale_output_bounds() {
        let device = Default::default();
        let x = Tensor::<TestBackend, 1>::from_floats([-1.0, 0.0, 1.0], &device).reshape([1, 1, 1, 3]);
        let v = rescale_output(x).into_data().to_vec::<f32>().unwrap();
        assert_eq!(v, vec![0.0, 127.5, 255.0]);
    }

    #[test]
    fn test_zero_pad_border() {
        let device = Default::default();
        let x = Tensor::<TestBackend, 4>::ones([1, 1, 2, 2], &device);
        let padded = zero_pad(x, 1);
        assert_eq!(padded.dims(), [1, 1, 4, 4]);
        let sum = padded.sum().into_scalar();
        assert_eq!(sum, 4.0);
    }
}
