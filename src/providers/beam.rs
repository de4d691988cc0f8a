/*!
 * Beam search decoding.
 *
 * The search is independent of the numeric backend: a `StepDecoder` turns
 * the current decoder sequences into next-token log-probabilities and the
 * search keeps the best `num_beams` hypotheses at every step.
 */

use std::cmp::Ordering;

use crate::errors::ProviderError;
use crate::summarization::GenerationParameters;

/// One step of an autoregressive decoder
pub trait StepDecoder {
    /// Next-token log-probabilities for each sequence.
    ///
    /// All sequences have the same length and start with the decoder start
    /// token. The result has one row per sequence, each row covering the
    /// whole vocabulary.
    fn step(&mut self, sequences: &[Vec<u32>]) -> Result<Vec<Vec<f32>>, ProviderError>;
}

/// A partial or finished decoder sequence
#[derive(Debug, Clone, PartialEq)]
pub struct Hypothesis {
    /// Decoder tokens, starting with the decoder start token
    pub tokens: Vec<u32>,
    /// Sum of the token log-probabilities
    pub log_prob: f64,
}

impl Hypothesis {
    fn start(token: u32) -> Self {
        Self {
            tokens: vec![token],
            log_prob: 0.0,
        }
    }

    /// Number of generated tokens, excluding the start token
    pub fn generated_len(&self) -> usize {
        self.tokens.len().saturating_sub(1)
    }

    /// Length-normalized score used to rank hypotheses
    pub fn score(&self, length_penalty: f64) -> f64 {
        let len = self.generated_len().max(1) as f64;
        self.log_prob / len.powf(length_penalty)
    }
}

/// Best finished hypotheses, capped at `capacity`
#[derive(Debug)]
struct FinishedPool {
    capacity: usize,
    length_penalty: f64,
    entries: Vec<(f64, Hypothesis)>,
}

impl FinishedPool {
    fn new(capacity: usize, length_penalty: f64) -> Self {
        Self {
            capacity,
            length_penalty,
            entries: Vec::with_capacity(capacity + 1),
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn worst_score(&self) -> Option<f64> {
        self.entries.last().map(|(score, _)| *score)
    }

    fn add(&mut self, hypothesis: Hypothesis) {
        let score = hypothesis.score(self.length_penalty);
        if self.entries.len() >= self.capacity && self.worst_score().is_some_and(|worst| score <= worst) {
            return;
        }
        self.entries.push((score, hypothesis));
        self.entries.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        self.entries.truncate(self.capacity);
    }

    /// Whether no live hypothesis can still improve the pool
    fn is_done(&self, early_stopping: bool, best_live_log_prob: f64, generated_len: usize) -> bool {
        if self.entries.len() < self.capacity {
            return false;
        }
        if early_stopping {
            return true;
        }
        let best_possible = best_live_log_prob / (generated_len.max(1) as f64).powf(self.length_penalty);
        self.worst_score().is_some_and(|worst| worst >= best_possible)
    }

    fn into_best(self) -> Option<Hypothesis> {
        self.entries.into_iter().next().map(|(_, hypothesis)| hypothesis)
    }
}

/// Beam search configured for one generation call
#[derive(Debug, Clone)]
pub struct BeamSearch {
    params: GenerationParameters,
    decoder_start_token: u32,
    eos_token: u32,
}

impl BeamSearch {
    /// Create a search for the given parameters and special tokens
    pub fn new(params: GenerationParameters, decoder_start_token: u32, eos_token: u32) -> Self {
        Self {
            params,
            decoder_start_token,
            eos_token,
        }
    }

    /// Run the search and return the generated tokens of the best hypothesis.
    ///
    /// The returned tokens exclude the decoder start token and the
    /// end-of-sequence token.
    pub fn run<D: StepDecoder>(&self, decoder: &mut D) -> Result<Vec<u32>, ProviderError> {
        let num_beams = self.params.num_beams.max(1);
        let max_length = self.params.max_length.max(2);
        let mut finished = FinishedPool::new(num_beams, self.params.length_penalty);
        let mut live = vec![Hypothesis::start(self.decoder_start_token)];

        while live[0].tokens.len() < max_length {
            let sequences: Vec<Vec<u32>> = live.iter().map(|h| h.tokens.clone()).collect();
            let rows = decoder.step(&sequences)?;
            if rows.len() != live.len() {
                return Err(ProviderError::Generation(format!(
                    "Decoder returned {} rows for {} hypotheses",
                    rows.len(),
                    live.len()
                )));
            }

            // min_length counts the decoder start token, like max_length
            let blocked = (live[0].tokens.len() < self.params.min_length).then_some(self.eos_token);

            let mut candidates: Vec<(f64, usize, u32)> = Vec::with_capacity(live.len() * 2 * num_beams);
            for (beam, (hypothesis, row)) in live.iter().zip(rows.iter()).enumerate() {
                for (token, log_prob) in top_k(row, 2 * num_beams, blocked) {
                    candidates.push((hypothesis.log_prob + f64::from(log_prob), beam, token));
                }
            }
            candidates.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

            let mut next = Vec::with_capacity(num_beams);
            for (rank, (log_prob, beam, token)) in candidates.into_iter().enumerate() {
                let mut tokens = live[beam].tokens.clone();
                tokens.push(token);
                let hypothesis = Hypothesis { tokens, log_prob };

                if token == self.eos_token {
                    // only end-of-sequence among the top `num_beams` counts
                    if rank < num_beams {
                        finished.add(hypothesis);
                    }
                } else {
                    next.push(hypothesis);
                }

                if next.len() == num_beams {
                    break;
                }
            }

            if next.is_empty() {
                live.clear();
                break;
            }
            live = next;

            if finished.is_done(self.params.early_stopping, live[0].log_prob, live[0].generated_len()) {
                break;
            }
        }

        if finished.len() < num_beams {
            for hypothesis in live {
                finished.add(hypothesis);
            }
        }

        let best = finished
            .into_best()
            .ok_or_else(|| ProviderError::Generation("Beam search produced no hypothesis".to_string()))?;

        Ok(best
            .tokens
            .into_iter()
            .skip(1)
            .filter(|&token| token != self.eos_token)
            .collect())
    }
}

/// The `k` highest finite entries of `row`, best first, skipping `blocked`
fn top_k(row: &[f32], k: usize, blocked: Option<u32>) -> Vec<(u32, f32)> {
    let mut indexed: Vec<(u32, f32)> = row
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as u32, v))
        .filter(|&(i, v)| v.is_finite() && Some(i) != blocked)
        .collect();

    let k = k.min(indexed.len());
    if k == 0 {
        return Vec::new();
    }

    let by_score_desc = |a: &(u32, f32), b: &(u32, f32)| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal);
    if k < indexed.len() {
        indexed.select_nth_unstable_by(k - 1, by_score_desc);
        indexed.truncate(k);
    }
    indexed.sort_by(by_score_desc);
    indexed
}
