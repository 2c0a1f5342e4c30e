//! Attention Context - Value Objects

use serde::{Deserialize, Serialize};

/// 像素坐标
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// 检测框（左上 / 右下）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub top_left: Point,
    pub bottom_right: Point,
}

impl BoundingBox {
    pub fn width(&self) -> f32 {
        (self.bottom_right.x - self.top_left.x).abs()
    }

    pub fn height(&self) -> f32 {
        (self.bottom_right.y - self.top_left.y).abs()
    }
}

/// 人脸关键点（右眼 / 左眼 / 鼻尖）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceLandmarks {
    pub right_eye: Point,
    pub left_eye: Point,
    pub nose: Point,
}

impl FaceLandmarks {
    /// 两眼高度差
    pub fn eye_level_difference(&self) -> f32 {
        (self.right_eye.y - self.left_eye.y).abs()
    }

    /// 鼻尖相对两眼中点的水平偏移
    pub fn nose_offset(&self) -> f32 {
        let eye_midpoint = (self.right_eye.x + self.left_eye.x) / 2.0;
        (self.nose.x - eye_midpoint).abs()
    }
}

/// 单个检测对象
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectedSubject {
    pub bounds: BoundingBox,
    pub landmarks: FaceLandmarks,
    /// 检测置信度 [0, 1]
    pub confidence: f32,
}

/// 一帧视频
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// 帧序号（从 0 开始）
    pub sequence: u64,
    /// RGBA 像素
    pub pixels: Vec<u8>,
}

impl Frame {
    pub fn blank(width: u32, height: u32, sequence: u64) -> Self {
        Self {
            width,
            height,
            sequence,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }
}
