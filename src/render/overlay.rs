use anyhow::Result;
use opencv::core::{Mat, Point, Rect, Scalar, Size, CV_8UC3};
use opencv::imgproc;
use opencv::prelude::*;

use crate::metrics::{FrameMetrics, JointFrame, Pt};
use crate::pose::LandmarkSet;
use crate::render::skeleton::{
    Bgr, C_FOOT, C_GUIDE, C_INFO, C_LINE, C_MIDLINE, C_PAUSED, C_POINT, C_REC, C_TEXT_OK,
    C_TEXT_WARN, C_TORSO, SKELETON_CONNECTIONS,
};

fn scalar(c: Bgr) -> Scalar {
    Scalar::new(c.0, c.1, c.2, 0.0)
}

fn point(p: Pt) -> Point {
    Point::new(p.x as i32, p.y as i32)
}

fn seg(img: &mut Mat, a: Pt, b: Pt, color: Bgr, thickness: i32) -> Result<()> {
    imgproc::line(img, point(a), point(b), scalar(color), thickness, imgproc::LINE_8, 0)?;
    Ok(())
}

fn joint_dot(img: &mut Mat, p: Pt) -> Result<()> {
    imgproc::circle(img, point(p), 5, scalar(C_POINT), -1, imgproc::LINE_8, 0)?;
    Ok(())
}

/// シーケンス番号タグ（左上、白地に青文字）
pub fn draw_sequence_tag(img: &mut Mat, sequence: u64) -> Result<()> {
    imgproc::rectangle(
        img,
        Rect::new(15, 5, 235, 35),
        scalar((250.0, 250.0, 250.0)),
        -1,
        imgproc::LINE_8,
        0,
    )?;
    imgproc::put_text(
        img,
        &format!("Seq: {sequence}"),
        Point::new(20, 30),
        imgproc::FONT_HERSHEY_SIMPLEX,
        1.0,
        scalar(C_INFO),
        1,
        imgproc::LINE_AA,
        false,
    )?;
    Ok(())
}

/// フレーム番号と解像度/FPSの情報ボックス
pub fn draw_info_box(img: &mut Mat, frame_index: u64, width: u32, height: u32, fps: u32) -> Result<()> {
    imgproc::rectangle(
        img,
        Rect::new(15, 45, 265, 50),
        scalar((250.0, 250.0, 250.0)),
        -1,
        imgproc::LINE_8,
        0,
    )?;
    imgproc::put_text(
        img,
        &format!("Frame: {frame_index}"),
        Point::new(20, 70),
        imgproc::FONT_HERSHEY_SIMPLEX,
        0.6,
        scalar(C_INFO),
        1,
        imgproc::LINE_AA,
        false,
    )?;
    imgproc::put_text(
        img,
        &format!("{width}x{height} @ {fps}fps"),
        Point::new(20, 90),
        imgproc::FONT_HERSHEY_SIMPLEX,
        0.5,
        scalar(C_INFO),
        1,
        imgproc::LINE_AA,
        false,
    )?;
    Ok(())
}

/// REC / PAUSED インジケータ（右上）
pub fn draw_status_dot(img: &mut Mat, paused: bool) -> Result<()> {
    let w = img.cols();
    let color = if paused { C_PAUSED } else { C_REC };
    let label = if paused { "PAUSED" } else { "REC" };

    imgproc::circle(img, Point::new(w - 130, 25), 8, scalar(color), -1, imgproc::LINE_AA, 0)?;
    imgproc::put_text(
        img,
        label,
        Point::new(w - 115, 33),
        imgproc::FONT_HERSHEY_SIMPLEX,
        0.7,
        scalar(color),
        2,
        imgproc::LINE_AA,
        false,
    )?;
    Ok(())
}

/// Raw 出力: 入力フレームのコピーにシーケンスタグのみ
pub fn raw_frame(base: &Mat, sequence: u64) -> Result<Mat> {
    let mut img = base.clone();
    draw_sequence_tag(&mut img, sequence)?;
    Ok(img)
}

/// 白背景に骨格のみを描画した出力
///
/// 検出なしの場合は白フレーム + シーケンスタグ
pub fn skeleton_frame(
    width: u32,
    height: u32,
    landmarks: Option<&LandmarkSet>,
    min_visibility: f32,
    sequence: u64,
) -> Result<Mat> {
    let mut img = Mat::new_size_with_default(
        Size::new(width as i32, height as i32),
        CV_8UC3,
        Scalar::all(255.0),
    )?;

    if let Some(set) = landmarks {
        for (start_idx, end_idx) in SKELETON_CONNECTIONS {
            let (Some(start), Some(end)) = (
                set.get_visible(start_idx, min_visibility),
                set.get_visible(end_idx, min_visibility),
            ) else {
                continue;
            };
            let (x1, y1) = start.to_pixel(width, height);
            let (x2, y2) = end.to_pixel(width, height);
            seg(&mut img, Pt::new(x1, y1), Pt::new(x2, y2), C_LINE, 2)?;
        }

        for lm in set.landmarks.iter() {
            if !lm.is_visible(min_visibility) {
                continue;
            }
            let (x, y) = lm.to_pixel(width, height);
            imgproc::circle(
                &mut img,
                Point::new(x as i32, y as i32),
                3,
                scalar(C_POINT),
                -1,
                imgproc::LINE_8,
                0,
            )?;
        }
    }

    draw_sequence_tag(&mut img, sequence)?;
    Ok(img)
}

/// 臨床オーバーレイ出力
///
/// 四肢・足部・体幹の骨格、水平ガイド、体幹中心線、角度ラベル、
/// シーケンスタグ、フレーム情報ボックスを重畳する。
/// 関節が欠けているフレームはタグのみ。
pub fn clinical_frame(
    base: &Mat,
    joints: Option<&JointFrame>,
    metrics: Option<&FrameMetrics>,
    arm_angle_alert: f64,
    sequence: u64,
    frame_index: u64,
    fps: u32,
) -> Result<Mat> {
    let mut img = base.clone();
    let width = img.cols() as u32;
    let height = img.rows() as u32;

    let Some(j) = joints else {
        draw_sequence_tag(&mut img, sequence)?;
        return Ok(img);
    };

    // 脚
    for side in [&j.left, &j.right] {
        seg(&mut img, side.hip, side.knee, C_LINE, 2)?;
        seg(&mut img, side.knee, side.ankle, C_LINE, 2)?;
        joint_dot(&mut img, side.hip)?;
        joint_dot(&mut img, side.knee)?;
        joint_dot(&mut img, side.ankle)?;
    }

    // 足部（三角形）
    for side in [&j.left, &j.right] {
        seg(&mut img, side.ankle, side.heel, C_FOOT, 2)?;
        seg(&mut img, side.heel, side.foot_index, C_FOOT, 2)?;
        seg(&mut img, side.foot_index, side.ankle, C_FOOT, 2)?;
        joint_dot(&mut img, side.heel)?;
        joint_dot(&mut img, side.foot_index)?;
    }

    // 腕
    for side in [&j.left, &j.right] {
        seg(&mut img, side.shoulder, side.elbow, C_LINE, 2)?;
        seg(&mut img, side.elbow, side.wrist, C_LINE, 2)?;
        joint_dot(&mut img, side.shoulder)?;
        joint_dot(&mut img, side.elbow)?;
        joint_dot(&mut img, side.wrist)?;
    }

    // 体幹
    seg(&mut img, j.right.shoulder, j.left.shoulder, C_TORSO, 2)?;
    seg(&mut img, j.left.shoulder, j.left.hip, C_TORSO, 2)?;
    seg(&mut img, j.left.hip, j.right.hip, C_TORSO, 2)?;
    seg(&mut img, j.right.hip, j.right.shoulder, C_TORSO, 2)?;

    // 左右比較用の水平ガイド
    for p in [j.right.shoulder, j.left.shoulder, j.right.hip, j.left.hip] {
        let half = 200.0;
        seg(
            &mut img,
            Pt::new(p.x - half, p.y),
            Pt::new(p.x + half, p.y),
            C_GUIDE,
            1,
        )?;
    }

    // 体幹中心線
    let mid_shoulder = Pt::new(
        (j.right.shoulder.x + j.left.shoulder.x) / 2.0,
        (j.right.shoulder.y + j.left.shoulder.y) / 2.0,
    );
    let mid_hip = Pt::new(
        (j.right.hip.x + j.left.hip.x) / 2.0,
        (j.right.hip.y + j.left.hip.y) / 2.0,
    );
    joint_dot(&mut img, mid_shoulder)?;
    joint_dot(&mut img, mid_hip)?;
    seg(&mut img, mid_shoulder, mid_hip, C_MIDLINE, 2)?;

    // 角度ラベル
    if let Some(m) = metrics {
        let mut label = |angle: Option<f64>, at: Pt, dx: f64, dy: f64, ok: bool| -> Result<()> {
            if let Some(a) = angle {
                let color = if ok { C_TEXT_OK } else { C_TEXT_WARN };
                imgproc::put_text(
                    &mut img,
                    &format!("{}", a.round() as i64),
                    Point::new((at.x + dx) as i32, (at.y + dy) as i32),
                    imgproc::FONT_HERSHEY_SIMPLEX,
                    1.0,
                    scalar(color),
                    2,
                    imgproc::LINE_AA,
                    false,
                )?;
            }
            Ok(())
        };

        label(
            m.angle_arm_r,
            j.right.elbow,
            20.0,
            20.0,
            m.angle_arm_r.is_some_and(|a| a >= arm_angle_alert),
        )?;
        label(m.angle_arm_l, j.left.elbow, 20.0, 20.0, true)?;
        label(m.angle_leg_r, j.right.knee, 0.0, 0.0, false)?;
        label(m.angle_leg_l, j.left.knee, 0.0, 0.0, false)?;
    }

    draw_sequence_tag(&mut img, sequence)?;
    draw_info_box(&mut img, frame_index, width, height, fps)?;

    Ok(img)
}
