use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;
use std::path::PathBuf;

const DEFAULT_INPUT_FILE: &str = "Relatorio_Analise_CVEs_LLM.xlsx";
const DEFAULT_OUT_DIR: &str = "charts";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub input_path: PathBuf,
    pub out_dir: PathBuf,
}

impl Config {
    pub fn new() -> Result<Self> {
        // Load .env file first
        dotenv().ok();

        let input_path = std::env::var("CVE_REPORT_XLSX")
            .unwrap_or_else(|_| DEFAULT_INPUT_FILE.to_string());
        let out_dir = std::env::var("CHARTS_OUT_DIR")
            .unwrap_or_else(|_| DEFAULT_OUT_DIR.to_string());

        Ok(Config {
            input_path: PathBuf::from(input_path),
            out_dir: PathBuf::from(out_dir),
        })
    }
}
