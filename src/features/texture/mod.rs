//! Texture feature modules
//!
//! Block statistics over the grayscale plane:
//! - Noise statistics (6×6 standard deviation)
//! - Texture homogeneity (16×16 variance)
//! - Gradient artificiality (smoothness of local intensity ramps)

pub mod gradient;
pub mod homogeneity;
pub mod noise;

pub use gradient::{analyze_gradient_artificiality, GradientStats};
pub use homogeneity::{analyze_texture_homogeneity, HomogeneityStats};
pub use noise::{analyze_noise, NoiseStats};
