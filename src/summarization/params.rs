/*!
 * Generation parameter policy.
 *
 * Two fixed parameter sets drive the pipeline: a tight one for each segment
 * and a looser one for the final reduction over the joined partial summaries.
 */

/// Instruction marker prepended to every prompt
pub const SUMMARIZE_PREFIX: &str = "summarize: ";

/// Decoding controls for one generation call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParameters {
    /// Maximum decoder sequence length in tokens, including the start token
    pub max_length: usize,

    /// Decoder sequence length, including the start token, below which
    /// end-of-sequence is not allowed
    pub min_length: usize,

    /// Beam width
    pub num_beams: usize,

    /// Exponent applied to the hypothesis length when scoring finished beams.
    /// Larger values favour longer outputs.
    pub length_penalty: f64,

    /// Stop as soon as `num_beams` hypotheses have finished
    pub early_stopping: bool,
}

/// Length penalty used when a parameter set does not override it
pub const DEFAULT_LENGTH_PENALTY: f64 = 1.0;

/// Parameters for summarizing a single segment
pub const SEGMENT_PARAMS: GenerationParameters = GenerationParameters {
    max_length: 150,
    min_length: 40,
    num_beams: 4,
    length_penalty: 2.0,
    early_stopping: true,
};

/// Parameters for the final reduction pass
pub const REDUCE_PARAMS: GenerationParameters = GenerationParameters {
    max_length: 200,
    min_length: 50,
    num_beams: 4,
    length_penalty: DEFAULT_LENGTH_PENALTY,
    early_stopping: true,
};

impl Default for GenerationParameters {
    fn default() -> Self {
        SEGMENT_PARAMS
    }
}

/// Prefix `body` with the summarization instruction marker
pub fn build_prompt(body: &str) -> String {
    let mut prompt = String::with_capacity(SUMMARIZE_PREFIX.len() + body.len());
    prompt.push_str(SUMMARIZE_PREFIX);
    prompt.push_str(body);
    prompt
}
