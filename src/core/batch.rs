//! Tensor type aliases shared by the inference seams.

/// Recognizer logits, laid out `[batch, seq_len, vocab]`.
pub type Tensor3D = ndarray::Array3<f32>;

/// Image inputs, laid out `[batch, channels, height, width]`.
pub type Tensor4D = ndarray::Array4<f32>;
