use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::{Config as XLMRobertaConfig, XLMRobertaModel};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use skillmentor_core::traits::Embedder;

use crate::pool::masked_mean_l2;
use crate::tokenize::tokenize_on_device;

/// Sentence encoder backed by a local XLM-RoBERTa checkpoint.
///
/// The model directory must hold `tokenizer.json`, `config.json` and either
/// `model.safetensors` or `pytorch_model.bin`.
pub struct TransformerEmbedder {
    model: XLMRobertaModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
    max_len: usize,
    pad_id: u32,
}

impl TransformerEmbedder {
    pub fn load(model_dir: &Path, max_len: usize) -> Result<Self> {
        let device = select_device();
        info!(dir = %model_dir.display(), "loading sentence encoder");

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;
        let pad_id = tokenizer.token_to_id("<pad>").unwrap_or(1);

        let config_raw = std::fs::read_to_string(model_dir.join("config.json"))?;
        let config: XLMRobertaConfig = serde_json::from_str(&config_raw)?;
        let dim = serde_json::from_str::<serde_json::Value>(&config_raw)?
            .get("hidden_size")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| anyhow!("config.json has no hidden_size"))? as usize;

        let weights = load_weights(model_dir, &device)?;
        let vb = VarBuilder::from_tensors(weights, DType::F32, &device);
        let model = XLMRobertaModel::new(&config, vb)?;
        info!(dim, max_len, "sentence encoder ready");
        Ok(Self { model, tokenizer, device, dim, max_len, pad_id })
    }

    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let start = Instant::now();
        let (input_ids, attention_mask) = tokenize_on_device(&self.tokenizer, text, self.max_len, self.pad_id, &self.device)?;
        let token_type_ids = Tensor::zeros((1, self.max_len), DType::I64, &self.device)?;
        let hidden = self.model.forward(&input_ids, &attention_mask, &token_type_ids, None, None, None)?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        let emb: Vec<f32> = pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1()?;
        if emb.len() != self.dim { return Err(anyhow!("encoder returned {} dims, expected {}", emb.len(), self.dim)); }
        let elapsed = start.elapsed();
        if elapsed.as_millis() > 100 { warn!(ms = elapsed.as_millis() as u64, "slow embedding"); } else { debug!(ms = elapsed.as_millis() as u64, "embedded text"); }
        Ok(emb)
    }
}

impl Embedder for TransformerEmbedder {
    fn dim(&self) -> usize { self.dim }
    fn max_len(&self) -> usize { self.max_len }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed_one(t)).collect()
    }
}

fn load_weights(model_dir: &Path, device: &Device) -> Result<HashMap<String, Tensor>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        return Ok(candle_core::safetensors::load(&safetensors, device)?);
    }
    let pickle = model_dir.join("pytorch_model.bin");
    let weights = candle_core::pickle::read_all(&pickle)?;
    weights
        .into_iter()
        .map(|(name, t)| Ok((name, t.to_device(device)?)))
        .collect()
}

/// Metal when built with the `metal` feature and a GPU is present, CPU
/// otherwise. `APP_EMBED_DEVICE=cpu` forces the CPU.
fn select_device() -> Device {
    let force_cpu = std::env::var("APP_EMBED_DEVICE").is_ok_and(|v| v.eq_ignore_ascii_case("cpu"));
    #[cfg(feature = "metal")]
    {
        if !force_cpu {
            match Device::new_metal(0) {
                Ok(dev) => { info!("embedding device: Metal"); return dev; }
                Err(e) => warn!(error = %e, "Metal unavailable; using CPU"),
            }
        }
    }
    info!(forced = force_cpu, "embedding device: CPU");
    Device::Cpu
}
