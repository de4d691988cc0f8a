/*!
 * Chunk-and-reduce summarization.
 *
 * This module contains the summarization pipeline. It is split into
 * several submodules:
 *
 * - `core`: the summarizer and its options
 * - `segments`: lazy word-window segmentation of a document
 * - `params`: the fixed generation parameter policy and prompt marker
 */

// Re-export main types for easier usage
pub use self::core::{Summarizer, SummarizerOptions};
pub use self::params::{build_prompt, GenerationParameters, REDUCE_PARAMS, SEGMENT_PARAMS, SUMMARIZE_PREFIX};
pub use self::segments::{count_segments, segments, word_count, Segment, Segments};

// Submodules
pub mod core;
pub mod params;
pub mod segments;
