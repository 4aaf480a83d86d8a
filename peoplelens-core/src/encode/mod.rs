//! Categorical encoding fitted at training time and replayed at inference.
//!
//! Codes assigned when an encoder is fitted are frozen; inference must
//! produce byte-identical codes or fail. [`UnseenPolicy`] decides what
//! happens when a value was never seen during training.

pub mod label;
pub mod set;

pub use label::{LabelEncoder, UnseenPolicy};
pub use set::EncoderSet;
