use anyhow::{Context, Result};
use ndarray::Array4;
use opencv::core::{Mat, Size, Vec3b};
use opencv::imgproc;
use opencv::prelude::*;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;

use crate::config::PoseConfig;

use super::landmark::{Landmark, LandmarkIndex, LandmarkSet};

/// BlazePose系 ONNX モデルを使用した姿勢検出器
///
/// 入力: [1, S, S, 3] の f32 テンソル（RGB, 0..1）
/// 出力: [1, 165] のランドマークテンソル (x, y, z, visibility, presence) × 33
///       および [1, 1] の presence スコア
pub struct PoseDetector {
    session: Session,
    input_size: i32,
    min_presence: f32,
}

impl PoseDetector {
    /// ONNXモデルを読み込んで初期化
    pub fn new<P: AsRef<Path>>(model_path: P, input_size: i32, min_presence: f32) -> Result<Self> {
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(model_path.as_ref())
            .context("Failed to load ONNX model")?;

        Ok(Self {
            session,
            input_size,
            min_presence,
        })
    }

    pub fn from_config(config: &PoseConfig) -> Result<Self> {
        Self::new(&config.model_path, config.input_size, config.min_presence)
    }

    /// BGRフレームから姿勢を検出
    ///
    /// presence スコアがしきい値未満の場合は Ok(None)（検出なし）
    pub fn detect(&mut self, frame: &Mat) -> Result<Option<LandmarkSet>> {
        let input = preprocess(frame, self.input_size)?;
        let input_tensor = Tensor::from_array(input)?;
        let outputs = self
            .session
            .run(ort::inputs!["input" => input_tensor])
            .context("Inference failed")?;

        // presence: 姿勢が映っているかのスコア
        if let Some(flag) = outputs.get("Identity_1") {
            let score: ndarray::ArrayViewD<f32> = flag
                .try_extract_array()
                .context("Failed to extract presence score")?;
            let presence = sigmoid(score[[0, 0]]);
            if presence < self.min_presence {
                return Ok(None);
            }
        }

        // ランドマーク: [1, 165] = 33 × (x, y, z, visibility, presence)
        let output: ndarray::ArrayViewD<f32> = outputs["Identity"]
            .try_extract_array()
            .context("Failed to extract landmark tensor")?;

        let size = self.input_size as f32;
        let mut landmarks = [Landmark::default(); LandmarkIndex::COUNT];
        for i in 0..LandmarkIndex::COUNT {
            let x = output[[0, i * 5]] / size;
            let y = output[[0, i * 5 + 1]] / size;
            let z = output[[0, i * 5 + 2]] / size;
            let visibility = sigmoid(output[[0, i * 5 + 3]]);
            landmarks[i] = Landmark::new(x, y, z, visibility);
        }

        Ok(Some(LandmarkSet::new(landmarks)))
    }
}

fn sigmoid(v: f32) -> f32 {
    1.0 / (1.0 + (-v).exp())
}

/// BGR Mat をモデル入力テンソルに変換（リサイズ + RGB + 0..1）
fn preprocess(frame: &Mat, size: i32) -> Result<Array4<f32>> {
    let mut rgb = Mat::default();
    imgproc::cvt_color_def(frame, &mut rgb, imgproc::COLOR_BGR2RGB)?;

    let mut resized = Mat::default();
    imgproc::resize(
        &rgb,
        &mut resized,
        Size::new(size, size),
        0.0,
        0.0,
        imgproc::INTER_LINEAR,
    )?;

    let mut input = Array4::<f32>::zeros((1, size as usize, size as usize, 3));
    for y in 0..size {
        for x in 0..size {
            let px = resized.at_2d::<Vec3b>(y, x)?;
            for c in 0..3 {
                input[[0, y as usize, x as usize, c]] = px[c] as f32 / 255.0;
            }
        }
    }

    Ok(input)
}
