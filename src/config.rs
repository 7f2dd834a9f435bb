use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub recording: RecordingConfig,
    #[serde(default)]
    pub encoder: EncoderConfig,
    #[serde(default)]
    pub pose: PoseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordingConfig {
    /// 出力ディレクトリ
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// 出力ファイル名のベース
    #[serde(default = "default_base_name")]
    pub base_name: String,
    /// DB保存の最小間隔（秒）。0 = 全フレーム保存
    #[serde(default)]
    pub sampling_interval_secs: f64,
    /// 録画開始に必要な空きディスク容量（MB）
    #[serde(default = "default_min_free_mb")]
    pub min_free_mb: u64,
    /// FPSが不明な場合のフォールバック値
    #[serde(default = "default_fps")]
    pub default_fps: u32,
    /// 臨床オーバーレイの腕角度しきい値（度）
    #[serde(default = "default_arm_angle_alert")]
    pub arm_angle_alert: f64,
}

fn default_output_dir() -> String { "data/exports".to_string() }
fn default_base_name() -> String { "session".to_string() }
fn default_min_free_mb() -> u64 { 500 }
fn default_fps() -> u32 { 30 }
fn default_arm_angle_alert() -> f64 { 60.0 }

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            base_name: default_base_name(),
            sampling_interval_secs: 0.0,
            min_free_mb: default_min_free_mb(),
            default_fps: default_fps(),
            arm_angle_alert: default_arm_angle_alert(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EncoderConfig {
    /// 外部エンコーダのバイナリ名
    #[serde(default = "default_ffmpeg_bin")]
    pub ffmpeg_bin: String,
    /// false の場合はパイプ方式を試さず VideoWriter を直接使う
    #[serde(default = "default_prefer_pipe")]
    pub prefer_pipe: bool,
    /// libx264 の品質係数
    #[serde(default = "default_crf")]
    pub crf: u32,
    /// 目標ビットレート（kbps）
    #[serde(default = "default_bitrate_kbps")]
    pub bitrate_kbps: u32,
    /// libx264 のプリセット
    #[serde(default = "default_preset")]
    pub preset: String,
    /// close 時にプロセス終了を待つ上限（秒）
    #[serde(default = "default_close_timeout_secs")]
    pub close_timeout_secs: u64,
}

fn default_ffmpeg_bin() -> String { "ffmpeg".to_string() }
fn default_prefer_pipe() -> bool { true }
fn default_crf() -> u32 { 23 }
fn default_bitrate_kbps() -> u32 { 4000 }
fn default_preset() -> String { "veryfast".to_string() }
fn default_close_timeout_secs() -> u64 { 10 }

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_bin: default_ffmpeg_bin(),
            prefer_pipe: default_prefer_pipe(),
            crf: default_crf(),
            bitrate_kbps: default_bitrate_kbps(),
            preset: default_preset(),
            close_timeout_secs: default_close_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoseConfig {
    /// ONNXモデルのパス
    #[serde(default = "default_model_path")]
    pub model_path: String,
    /// モデル入力の一辺（正方形）
    #[serde(default = "default_input_size")]
    pub input_size: i32,
    /// ランドマークを有効とみなす最小 visibility
    #[serde(default = "default_min_visibility")]
    pub min_visibility: f32,
    /// 姿勢検出ありとみなす最小 presence スコア
    #[serde(default = "default_min_presence")]
    pub min_presence: f32,
}

fn default_model_path() -> String { "models/pose_landmark_full.onnx".to_string() }
fn default_input_size() -> i32 { 256 }
fn default_min_visibility() -> f32 { 0.5 }
fn default_min_presence() -> f32 { 0.5 }

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            input_size: default_input_size(),
            min_visibility: default_min_visibility(),
            min_presence: default_min_presence(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// 設定ファイルが無い・壊れている場合はデフォルトにフォールバック
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path.as_ref()) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(
                    "config {} not loaded ({e}), using defaults",
                    path.as_ref().display()
                );
                Config::default()
            }
        }
    }
}
