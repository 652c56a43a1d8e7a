//! Prior/value evaluator contract.
//!
//! The PUCT agent treats position evaluation as a black box: it hands over
//! the encoded planes plus the legality mask and receives policy logits
//! over the shared 1800-entry action space and a scalar value for the side
//! to move. A neural network lives behind this trait in production; the
//! [`UniformEvaluator`] satisfies the same contract for tests and lets the
//! search run without any model.

use thiserror::Error;

use fanorona_core::ACTION_SPACE;

#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("evaluator returned {got} logits, expected {expected}")]
    BadPolicyShape { got: usize, expected: usize },
}

/// Output of one evaluation: unnormalised policy logits over the flat
/// action space (illegal entries are ignored by the search) and a value in
/// `[-1, 1]` from the perspective of the side to move.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub policy_logits: Vec<f32>,
    pub value: f32,
}

/// A `(policy, value)` oracle over encoded positions.
///
/// Implementations must be freely callable with independent inputs for the
/// lifetime of the agent holding them.
pub trait Evaluator {
    fn evaluate(&self, planes: &[f32], legal_mask: &[f32]) -> Result<Evaluation, EvaluatorError>;
}

/// The trivial evaluator: indifferent priors and a neutral value. After
/// the masked softmax every legal move receives the same probability, so
/// the PUCT agent degenerates to prior-free exploration but still plays
/// legally.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformEvaluator;

impl UniformEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for UniformEvaluator {
    fn evaluate(&self, _planes: &[f32], _legal_mask: &[f32]) -> Result<Evaluation, EvaluatorError> {
        Ok(Evaluation {
            policy_logits: vec![0.0; ACTION_SPACE],
            value: 0.0,
        })
    }
}

/// Softmax of `logits` restricted to the indices flagged in `legal_mask`.
/// Entries outside the mask come back as zero.
pub(crate) fn masked_softmax(logits: &[f32], legal_mask: &[f32]) -> Vec<f32> {
    let mut out = vec![0.0f32; logits.len()];

    let max = logits
        .iter()
        .zip(legal_mask)
        .filter(|(_, &m)| m > 0.0)
        .map(|(&l, _)| l)
        .fold(f32::NEG_INFINITY, f32::max);
    if max == f32::NEG_INFINITY {
        return out;
    }

    let mut total = 0.0f32;
    for (i, (&l, &m)) in logits.iter().zip(legal_mask).enumerate() {
        if m > 0.0 {
            let e = (l - max).exp();
            out[i] = e;
            total += e;
        }
    }
    if total > 0.0 {
        for v in &mut out {
            *v /= total;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_evaluator_shape() {
        let eval = UniformEvaluator::new();
        let result = eval.evaluate(&[], &[]).unwrap();
        assert_eq!(result.policy_logits.len(), ACTION_SPACE);
        assert_eq!(result.value, 0.0);
    }

    #[test]
    fn masked_softmax_is_uniform_over_equal_logits() {
        let logits = vec![0.0; 8];
        let mut mask = vec![0.0; 8];
        mask[1] = 1.0;
        mask[4] = 1.0;
        mask[6] = 1.0;

        let probs = masked_softmax(&logits, &mask);
        for (i, &p) in probs.iter().enumerate() {
            if mask[i] > 0.0 {
                assert!((p - 1.0 / 3.0).abs() < 1e-6);
            } else {
                assert_eq!(p, 0.0);
            }
        }
    }

    #[test]
    fn masked_softmax_prefers_larger_logits() {
        let mut logits = vec![0.0; 4];
        logits[0] = 2.0;
        logits[2] = 1.0;
        let mask = vec![1.0, 0.0, 1.0, 0.0];

        let probs = masked_softmax(&logits, &mask);
        assert!(probs[0] > probs[2]);
        assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-6);
        assert_eq!(probs[1], 0.0);
    }

    #[test]
    fn masked_softmax_with_empty_mask_is_all_zero() {
        let probs = masked_softmax(&[1.0, 2.0], &[0.0, 0.0]);
        assert!(probs.iter().all(|&p| p == 0.0));
    }
}
