// ============================================================
// Layer 5 — Composite Style Loss
// ============================================================
// For a generated image g and its content source c, summed over
// the extractor's activations i:
//
//   loss = Σ_i  rms(G(g_i) − G(s_i)) / 2  +  rms(c_i − g_i) · w_i
//
//   G(x)    Gram matrix F·Fᵀ / (C·H·W), F = x as [N, C, H·W]
//   rms(d)  sqrt(mean(d²)) over every non-batch dimension
//   s_i     style image activation, captured once at build time
//   w       [0.1, 0.2, 0.6, 0.1]
//
// The style Grams are computed from a single image and broadcast
// across the batch. Content activations are detached so the
// gradient only reaches the transformer through g.

use burn::{prelude::*, tensor::backend::AutodiffBackend, module::AutodiffModule};

use crate::ml::vgg::FeatureExtractor;

/// Content weights, one per extractor activation
pub const CONTENT_WEIGHTS: [f32; 4] = [0.1, 0.2, 0.6, 0.1];

/// x: [N, C, H, W] → [N, C, C]
pub fn gram_matrix<B: Backend>(x: Tensor<B, 4>) -> Tensor<B, 3> {
    let [n, c, h, w] = x.dims();
    let features = x.reshape([n, c, h * w]);
    features
        .clone()
        .matmul(features.swap_dims(1, 2))
        .div_scalar((c * h * w) as f32)
}

/// Root mean square per sample: [N, ...] → [N]
pub fn rms<B: Backend, const D: usize>(diff: Tensor<B, D>) -> Tensor<B, 1> {
    let n = diff.dims()[0];
    let per_sample = diff.shape().num_elements() / n;
    diff.reshape([n, per_sample])
        .powf_scalar(2.0)
        .mean_dim(1)
        .sqrt()
        .reshape([n])
}

/// Frozen extractor plus the constant style targets.
pub struct StyleLoss<B: Backend, E> {
    extractor:   E,
    /// [1, C, C] per activation
    style_grams: Vec<Tensor<B, 3>>,
    weights:     Vec<f32>,
}

impl<B: Backend, E: FeatureExtractor<B>> StyleLoss<B, E> {
    /// Capture the style targets from `style_image` ([1, 3, H, W]).
    ///
    /// Panics if the extractor exposes a different number of
    /// activations than there are content weights.
    pub fn new(extractor: E, style_image: Tensor<B, 4>) -> Self {
        Self::with_weights(extractor, style_image, CONTENT_WEIGHTS.to_vec())
    }

    pub fn with_weights(extractor: E, style_image: Tensor<B, 4>, weights: Vec<f32>) -> Self {
        let style_grams: Vec<Tensor<B, 3>> = extractor
            .extract(style_image)
            .into_iter()
            .map(|a| gram_matrix(a.tensor).detach())
            .collect();
        assert_eq!(
            style_grams.len(),
            weights.len(),
            "one content weight per extracted activation"
        );
        Self { extractor, style_grams, weights }
    }

    pub fn style_grams(&self) -> &[Tensor<B, 3>] {
        &self.style_grams
    }

    /// Per-sample loss, shape [N].
    pub fn forward(&self, content: Tensor<B, 4>, generated: Tensor<B, 4>) -> Tensor<B, 1> {
        let content_acts = self.extractor.extract(content);
        let generated_acts = self.extractor.extract(generated);
        let n = generated_acts
            .first()
            .map_or(0, |a| a.tensor.dims()[0]);

        let mut total: Option<Tensor<B, 1>> = None;
        for (((c, g), style), &w) in content_acts
            .into_iter()
            .zip(generated_acts)
            .zip(&self.style_grams)
            .zip(&self.weights)
        {
            let [_, channels, _] = style.dims();
            let style_gram = style.clone().expand([n, channels, channels]);
            let style_term = rms(gram_matrix(g.tensor.clone()) - style_gram).div_scalar(2.0);
            let content_term = rms(c.tensor.detach() - g.tensor).mul_scalar(w);
            let term = style_term + content_term;
            total = Some(match total {
                Some(t) => t + term,
                None => term,
            });
        }

        total.unwrap_or_else(|| Tensor::zeros([n], &self.device()))
    }

    fn device(&self) -> B::Device {
        self.style_grams
            .first()
            .map(|t| t.device())
            .unwrap_or_default()
    }
}

impl<B, E> StyleLoss<B, E>
where
    B: AutodiffBackend,
    E: FeatureExtractor<B> + AutodiffModule<B>,
    E::InnerModule: FeatureExtractor<B::InnerBackend>,
{
    /// The same loss on the inner backend, for validation.
    pub fn valid(&self) -> StyleLoss<B::InnerBackend, E::InnerModule> {
        StyleLoss {
            extractor:   self.extractor.valid(),
            style_grams: self.style_grams.iter().map(|t| t.clone().inner()).collect(),
            weights:     self.weights.clone(),
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use burn::tensor::{Distribution, TensorData};
    use crate::ml::vgg::{Activation, Vgg16Features};

    type TestBackend = NdArray<f32>;

    /// Returns the raw image as the only activation.
    struct Identity;

    impl<B: Backend> FeatureExtractor<B> for Identity {
        fn extract(&self, images: Tensor<B, 4>) -> Vec<Activation<B>> {
            vec![Activation { name: "identity", tensor: images }]
        }
    }

    #[test]
    fn test_gram_matrix_known_value() {
        let device = Default::default();
        // C = 2, H·W = 2: F = [[1, 2], [3, 4]]
        let x = Tensor::<TestBackend, 4>::from_data(
            TensorData::new(vec![1.0f32, 2.0, 3.0, 4.0], [1, 2, 1, 2]),
            &device,
        );
        let g = gram_matrix(x).into_data().to_vec::<f32>().unwrap();
        // F·Fᵀ = [[5, 11], [11, 25]], divided by C·H·W = 4
        assert_eq!(g, vec![1.25, 2.75, 2.75, 6.25]);
    }

    #[test]
    fn test_gram_matrix_is_symmetric() {
        let device = Default::default();
        let x = Tensor::<TestBackend, 4>::random([2, 3, 4, 4], Distribution::Default, &device);
        let g = gram_matrix(x);
        assert_eq!(g.dims(), [2, 3, 3]);
        let diff = (g.clone() - g.swap_dims(1, 2)).abs().max().into_scalar();
        assert!(diff < 1e-5);
    }

    #[test]
    fn test_rms_per_sample() {
        let device = Default::default();
        let d = Tensor::<TestBackend, 2>::from_data(
            TensorData::new(vec![3.0f32, 4.0, 0.0, 0.0], [2, 2]),
            &device,
        );
        let r = rms(d).into_data().to_vec::<f32>().unwrap();
        assert!((r[0] - 12.5f32.sqrt()).abs() < 1e-5);
        assert_eq!(r[1], 0.0);
    }

    #[test]
    fn test_loss_zero_when_everything_matches() {
        let device = Default::default();
        let image = Tensor::<TestBackend, 4>::random([1, 3, 4, 4], Distribution::Default, &device);
        let loss = StyleLoss::with_weights(Identity, image.clone(), vec![1.0]);
        let v = loss.forward(image.clone(), image).into_scalar();
        assert!(v.abs() < 1e-5);
    }

    #[test]
    fn test_loss_has_one_value_per_sample() {
        let device = Default::default();
        let style = Tensor::<TestBackend, 4>::random([1, 3, 4, 4], Distribution::Default, &device);
        let batch = Tensor::<TestBackend, 4>::random([3, 3, 4, 4], Distribution::Default, &device);
        let loss = StyleLoss::with_weights(Identity, style, vec![0.5]);
        let out = loss.forward(batch.clone(), batch.mul_scalar(2.0));
        assert_eq!(out.dims(), [3]);
        let v = out.into_data().to_vec::<f32>().unwrap();
        assert!(v.iter().all(|x| x.is_finite() && *x > 0.0));
    }

    #[test]
    fn test_content_term_weighted() {
        let device = Default::default();
        // style gram equals gram of generated → only the content term remains
        let generated = Tensor::<TestBackend, 4>::ones([1, 1, 2, 2], &device);
        let content = Tensor::<TestBackend, 4>::zeros([1, 1, 2, 2], &device);
        let loss = StyleLoss::with_weights(Identity, generated.clone(), vec![0.6]);
        let v = loss.forward(content, generated).into_scalar();
        assert!((v - 0.6).abs() < 1e-5);
    }

    #[test]
    #[should_panic(expected = "one content weight per extracted activation")]
    fn test_weight_count_must_match() {
        let device = Default::default();
        let style = Tensor::<TestBackend, 4>::zeros([1, 3, 4, 4], &device);
        StyleLoss::with_weights(Identity, style, vec![0.1, 0.2]);
    }

    #[test]
    fn test_vgg_loss_gradient_reaches_generated_image() {
        type AdBackend = Autodiff<TestBackend>;
        let device = Default::default();
        let vgg = Vgg16Features::<AdBackend>::new(&device);
        let style = Tensor::<AdBackend, 4>::random([1, 3, 32, 32], Distribution::Uniform(0.0, 255.0), &device);
        let loss = StyleLoss::new(vgg, style);

        let content = Tensor::<AdBackend, 4>::random([1, 3, 32, 32], Distribution::Uniform(0.0, 255.0), &device);
        let generated = Tensor::<AdBackend, 4>::random([1, 3, 32, 32], Distribution::Uniform(0.0, 255.0), &device)
            .require_grad();
        let value = loss.forward(content, generated.clone()).mean();
        let grads = value.backward();

        assert!(generated.grad(&grads).is_some());

        let inner = loss.valid();
        assert_eq!(inner.style_grams().len(), 4);
    }
}
