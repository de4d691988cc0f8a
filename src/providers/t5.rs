/*!
 * T5 sequence-to-sequence provider.
 *
 * Runs a pretrained T5 checkpoint locally with candle. The model, its
 * tokenizer and the device binding are loaded once; every `generate` call
 * encodes the prompt, runs beam search over the decoder and decodes the best
 * hypothesis back to text.
 */

use async_trait::async_trait;
use candle_core::{DType, Device, Tensor, D};
use candle_nn::VarBuilder;
use candle_transformers::models::t5;
use log::{debug, info};
use parking_lot::Mutex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokenizers::{Tokenizer, TruncationParams};

use crate::app_config::ModelConfig;
use crate::errors::ProviderError;
use crate::providers::beam::{BeamSearch, StepDecoder};
use crate::providers::hub::ModelRepo;
use crate::providers::{ComputeDevice, ModelProvider};
use crate::summarization::GenerationParameters;

const CONFIG_FILE: &str = "config.json";
const TOKENIZER_FILE: &str = "tokenizer.json";
const WEIGHTS_FILE: &str = "model.safetensors";

/// Local files making up one T5 checkpoint
#[derive(Debug, Clone)]
pub struct T5Files {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: PathBuf,
}

impl T5Files {
    /// Fetch (or reuse cached) checkpoint files for `repo`
    pub async fn fetch(repo: &ModelRepo) -> Result<Self, ProviderError> {
        let mut paths = repo
            .fetch_all(&[CONFIG_FILE, TOKENIZER_FILE, WEIGHTS_FILE])
            .await?
            .into_iter();

        match (paths.next(), paths.next(), paths.next()) {
            (Some(config), Some(tokenizer), Some(weights)) => Ok(Self {
                config,
                tokenizer,
                weights,
            }),
            _ => Err(ProviderError::ModelUnavailable(format!(
                "Incomplete checkpoint for {}",
                repo.repo()
            ))),
        }
    }

    /// Checkpoint files already present in `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            config: dir.join(CONFIG_FILE),
            tokenizer: dir.join(TOKENIZER_FILE),
            weights: dir.join(WEIGHTS_FILE),
        }
    }
}

/// Loaded model state; decoding needs exclusive access
struct T5Runtime {
    model: t5::T5ForConditionalGeneration,
    tokenizer: Tokenizer,
    device: Device,
    decoder_start_token: u32,
    eos_token: u32,
}

/// T5 provider bound to one device for the lifetime of the process
pub struct T5Provider {
    model_id: String,
    compute_device: ComputeDevice,
    runtime: Arc<Mutex<T5Runtime>>,
}

impl fmt::Debug for T5Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("T5Provider")
            .field("model_id", &self.model_id)
            .field("device", &self.compute_device)
            .finish_non_exhaustive()
    }
}

impl T5Provider {
    /// Fetch the checkpoint described by `config` and load it
    pub async fn load(config: &ModelConfig) -> Result<Self, ProviderError> {
        let repo = ModelRepo::from_config(config);
        let files = T5Files::fetch(&repo).await?;
        let model_id = config.repo.clone();
        let max_input_tokens = config.max_input_tokens;
        let force_cpu = config.force_cpu;

        tokio::task::spawn_blocking(move || Self::from_files(model_id, &files, max_input_tokens, force_cpu))
            .await
            .map_err(|e| ProviderError::ModelUnavailable(format!("Model loading task failed: {}", e)))?
    }

    /// Load a checkpoint from local files
    pub fn from_files(
        model_id: String,
        files: &T5Files,
        max_input_tokens: usize,
        force_cpu: bool,
    ) -> Result<Self, ProviderError> {
        let start = Instant::now();
        let device = select_device(force_cpu)?;
        let compute_device = if device.is_cuda() {
            ComputeDevice::Cuda(0)
        } else {
            ComputeDevice::Cpu
        };

        let config_text = std::fs::read_to_string(&files.config)
            .map_err(|e| unavailable("Failed to read model config", e))?;
        let mut model_config: t5::Config = serde_json::from_str(&config_text)
            .map_err(|e| unavailable("Failed to parse model config", e))?;
        // every beam step re-feeds the whole decoder sequence
        model_config.use_cache = false;

        let mut tokenizer = Tokenizer::from_file(&files.tokenizer)
            .map_err(|e| unavailable("Failed to load tokenizer", e))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: max_input_tokens,
                ..TruncationParams::default()
            }))
            .map_err(|e| unavailable("Failed to configure tokenizer truncation", e))?;

        // SAFETY: the weights file is owned by the model cache and not modified while mapped.
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[files.weights.clone()], DType::F32, &device) }
            .map_err(|e| unavailable("Failed to map model weights", e))?;
        let model = t5::T5ForConditionalGeneration::load(vb, &model_config)
            .map_err(|e| unavailable("Failed to build model", e))?;

        let decoder_start_token = model_config
            .decoder_start_token_id
            .unwrap_or(model_config.pad_token_id) as u32;
        let eos_token = model_config.eos_token_id as u32;

        info!(
            "Loaded {} on {} in {:.1}s",
            model_id,
            compute_device,
            start.elapsed().as_secs_f64()
        );

        Ok(Self {
            model_id,
            compute_device,
            runtime: Arc::new(Mutex::new(T5Runtime {
                model,
                tokenizer,
                device,
                decoder_start_token,
                eos_token,
            })),
        })
    }
}

#[async_trait]
impl ModelProvider for T5Provider {
    async fn generate(&self, prompt: &str, params: &GenerationParameters) -> Result<String, ProviderError> {
        let runtime = Arc::clone(&self.runtime);
        let prompt = prompt.to_string();
        let params = *params;

        tokio::task::spawn_blocking(move || runtime.lock().generate(&prompt, &params))
            .await
            .map_err(|e| ProviderError::Generation(format!("Generation task failed: {}", e)))?
    }

    fn device(&self) -> ComputeDevice {
        self.compute_device
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

impl T5Runtime {
    fn generate(&mut self, prompt: &str, params: &GenerationParameters) -> Result<String, ProviderError> {
        let start = Instant::now();
        let encoding = self
            .tokenizer
            .encode(prompt, true)
            .map_err(|e| generation("Failed to tokenize prompt", e))?;
        let input_ids = encoding.get_ids();
        if input_ids.is_empty() {
            return Err(ProviderError::Generation("Prompt produced no tokens".to_string()));
        }

        let input = Tensor::new(input_ids, &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(|e| generation("Failed to build input tensor", e))?;

        self.model.clear_kv_cache();
        let encoder_output = self
            .model
            .encode(&input)
            .map_err(|e| generation("Encoder failed", e))?;

        let search = BeamSearch::new(*params, self.decoder_start_token, self.eos_token);
        let mut decoder = T5StepDecoder {
            model: &mut self.model,
            encoder_output: &encoder_output,
            device: &self.device,
        };
        let tokens = search.run(&mut decoder)?;

        let text = self
            .tokenizer
            .decode(&tokens, true)
            .map_err(|e| generation("Failed to decode output", e))?;
        let text = text.trim();
        if text.is_empty() {
            return Err(ProviderError::Generation("Model produced no output".to_string()));
        }

        debug!(
            "Generated {} tokens from {} prompt tokens in {:.2}s",
            tokens.len(),
            input_ids.len(),
            start.elapsed().as_secs_f64()
        );
        Ok(text.to_string())
    }
}

/// Decoder step over a fixed encoder output
struct T5StepDecoder<'a> {
    model: &'a mut t5::T5ForConditionalGeneration,
    encoder_output: &'a Tensor,
    device: &'a Device,
}

impl T5StepDecoder<'_> {
    fn log_probs(&mut self, sequences: &[Vec<u32>]) -> candle_core::Result<Vec<Vec<f32>>> {
        let beams = sequences.len();
        let len = sequences.first().map(Vec::len).unwrap_or(0);
        let flat: Vec<u32> = sequences.iter().flatten().copied().collect();
        let decoder_ids = Tensor::from_vec(flat, (beams, len), self.device)?;

        let encoder_output = if beams == 1 {
            self.encoder_output.clone()
        } else {
            self.encoder_output.repeat((beams, 1, 1))?
        };

        let logits = self.model.decode(&decoder_ids, &encoder_output)?;
        let log_probs = candle_nn::ops::log_softmax(&logits.to_dtype(DType::F32)?, D::Minus1)?;
        log_probs.to_vec2::<f32>()
    }
}

impl StepDecoder for T5StepDecoder<'_> {
    fn step(&mut self, sequences: &[Vec<u32>]) -> Result<Vec<Vec<f32>>, ProviderError> {
        self.log_probs(sequences)
            .map_err(|e| generation("Decoder step failed", e))
    }
}

fn select_device(force_cpu: bool) -> Result<Device, ProviderError> {
    if force_cpu {
        return Ok(Device::Cpu);
    }
    Device::cuda_if_available(0).map_err(|e| unavailable("Failed to initialize compute device", e))
}

fn unavailable(what: &str, error: impl fmt::Display) -> ProviderError {
    ProviderError::ModelUnavailable(format!("{}: {}", what, error))
}

fn generation(what: &str, error: impl fmt::Display) -> ProviderError {
    ProviderError::Generation(format!("{}: {}", what, error))
}
