use crate::pose::LandmarkIndex;

/// 骨格の接続定義 (開始ランドマーク, 終了ランドマーク)
pub const SKELETON_CONNECTIONS: [(LandmarkIndex, LandmarkIndex); 23] = [
    // 顔
    (LandmarkIndex::LeftEar, LandmarkIndex::LeftEye),
    (LandmarkIndex::LeftEye, LandmarkIndex::Nose),
    (LandmarkIndex::Nose, LandmarkIndex::RightEye),
    (LandmarkIndex::RightEye, LandmarkIndex::RightEar),
    (LandmarkIndex::MouthLeft, LandmarkIndex::MouthRight),
    // 上半身
    (LandmarkIndex::LeftShoulder, LandmarkIndex::RightShoulder),
    (LandmarkIndex::LeftShoulder, LandmarkIndex::LeftElbow),
    (LandmarkIndex::LeftElbow, LandmarkIndex::LeftWrist),
    (LandmarkIndex::RightShoulder, LandmarkIndex::RightElbow),
    (LandmarkIndex::RightElbow, LandmarkIndex::RightWrist),
    // 胴体
    (LandmarkIndex::LeftShoulder, LandmarkIndex::LeftHip),
    (LandmarkIndex::RightShoulder, LandmarkIndex::RightHip),
    (LandmarkIndex::LeftHip, LandmarkIndex::RightHip),
    // 下半身
    (LandmarkIndex::LeftHip, LandmarkIndex::LeftKnee),
    (LandmarkIndex::LeftKnee, LandmarkIndex::LeftAnkle),
    (LandmarkIndex::RightHip, LandmarkIndex::RightKnee),
    (LandmarkIndex::RightKnee, LandmarkIndex::RightAnkle),
    // 足
    (LandmarkIndex::LeftAnkle, LandmarkIndex::LeftHeel),
    (LandmarkIndex::LeftHeel, LandmarkIndex::LeftFootIndex),
    (LandmarkIndex::LeftFootIndex, LandmarkIndex::LeftAnkle),
    (LandmarkIndex::RightAnkle, LandmarkIndex::RightHeel),
    (LandmarkIndex::RightHeel, LandmarkIndex::RightFootIndex),
    (LandmarkIndex::RightFootIndex, LandmarkIndex::RightAnkle),
];

/// BGRカラー定義
pub type Bgr = (f64, f64, f64);

/// 骨格線（緑）
pub const C_LINE: Bgr = (0.0, 255.0, 0.0);
/// 胴体（黄）
pub const C_TORSO: Bgr = (0.0, 255.0, 255.0);
/// 関節点（赤）
pub const C_POINT: Bgr = (0.0, 0.0, 255.0);
/// 足部（赤）
pub const C_FOOT: Bgr = (0.0, 0.0, 255.0);
/// 角度ラベル正常（緑）
pub const C_TEXT_OK: Bgr = (0.0, 255.0, 0.0);
/// 角度ラベル警告（赤）
pub const C_TEXT_WARN: Bgr = (0.0, 0.0, 255.0);
/// 情報テキスト（青）
pub const C_INFO: Bgr = (255.0, 0.0, 0.0);
/// 水平ガイド線
pub const C_GUIDE: Bgr = (100.0, 0.0, 255.0);
/// 体幹中心線（シアン）
pub const C_MIDLINE: Bgr = (255.0, 255.0, 0.0);
/// 録画中インジケータ（赤）
pub const C_REC: Bgr = (0.0, 0.0, 255.0);
/// 一時停止インジケータ（オレンジ）
pub const C_PAUSED: Bgr = (0.0, 165.0, 255.0);
