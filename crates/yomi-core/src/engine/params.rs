//! Model loading parameters.

use serde::{Deserialize, Serialize};

/// Parameters for loading model weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelParams {
    /// Layers to offload to an accelerator. 0 keeps everything on the CPU.
    pub n_gpu_layers: usize,
    /// Memory-map the weight file instead of reading it eagerly.
    pub use_mmap: bool,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            n_gpu_layers: 0,
            use_mmap: true,
        }
    }
}

impl ModelParams {
    /// Load from a JSON file.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_cpu_mmap() {
        let params = ModelParams::default();
        assert_eq!(params.n_gpu_layers, 0);
        assert!(params.use_mmap);
    }

    #[test]
    fn from_file_round_trip() {
        let path = std::env::temp_dir().join("yomi_model_params.json");
        std::fs::write(&path, r#"{"n_gpu_layers": 8, "use_mmap": false}"#).unwrap();

        let params = ModelParams::from_file(&path).unwrap();
        assert_eq!(params.n_gpu_layers, 8);
        assert!(!params.use_mmap);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn from_file_missing() {
        let result = ModelParams::from_file(std::path::Path::new("/nonexistent/params.json"));
        assert!(result.is_err());
    }
}
