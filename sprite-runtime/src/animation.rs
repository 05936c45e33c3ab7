//! # Animation 模块
//!
//! 与来源格式无关的帧序列表示。
//!
//! ## 设计说明
//!
//! - [`Animation`] 由解码器一次性构造，之后不可变
//! - 帧与延迟一一对应，至少一帧
//! - `total_duration` 在构造时计算并缓存
//! - 多个场景元素通过 `Rc<Animation>` 共享同一份解码结果

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::AnimationError;
use crate::geometry::Rgba;

/// 默认帧延迟（毫秒）
pub const DEFAULT_FRAME_DELAY_MS: u32 = 40;

static NEXT_FRAME_ID: AtomicU64 = AtomicU64::new(1);

/// 帧 ID
///
/// 进程内唯一，渲染层以此为键缓存纹理。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(u64);

impl FrameId {
    fn next() -> Self {
        Self(NEXT_FRAME_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// 原始数值
    pub fn get(self) -> u64 {
        self.0
    }
}

/// RGBA8 像素缓冲区（行优先，无行填充）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl FrameImage {
    /// 从像素数据创建
    ///
    /// `pixels.len()` 必须等于 `width * height * 4`。
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, AnimationError> {
        if pixels.len() != (width as usize) * (height as usize) * 4 {
            return Err(AnimationError::InvalidFrame {
                width,
                height,
                len: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// 创建纯色图像
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        let count = (width as usize) * (height as usize);
        let mut pixels = Vec::with_capacity(count * 4);
        for _ in 0..count {
            pixels.extend_from_slice(&color.0);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// 原始 RGBA 字节
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// 读取单个像素，越界返回 `None`
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + x as usize) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }
}

/// 单帧：像素 + 唯一 ID
#[derive(Debug, Clone)]
pub struct Frame {
    id: FrameId,
    image: FrameImage,
}

impl Frame {
    pub fn new(image: FrameImage) -> Self {
        Self {
            id: FrameId::next(),
            image,
        }
    }

    pub fn id(&self) -> FrameId {
        self.id
    }

    pub fn image(&self) -> &FrameImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width
    }

    pub fn height(&self) -> u32 {
        self.image.height
    }
}

/// 动画
///
/// 有序帧序列 + 每帧显示时长（毫秒）。
#[derive(Debug, Clone)]
pub struct Animation {
    frames: Vec<Frame>,
    delays: Vec<u32>,
    width: u32,
    height: u32,
    total_duration: u64,
}

impl Animation {
    /// 从帧与延迟构造
    ///
    /// 帧数为 0 或与延迟数不一致时返回 [`AnimationError::InvalidAnimation`]。
    pub fn new(frames: Vec<Frame>, delays: Vec<u32>) -> Result<Self, AnimationError> {
        if frames.is_empty() || frames.len() != delays.len() {
            return Err(AnimationError::InvalidAnimation {
                frames: frames.len(),
                delays: delays.len(),
            });
        }

        let width = frames.iter().map(Frame::width).max().unwrap_or(0);
        let height = frames.iter().map(Frame::height).max().unwrap_or(0);
        let total_duration = delays.iter().map(|&d| u64::from(d)).sum();

        Ok(Self {
            frames,
            delays,
            width,
            height,
            total_duration,
        })
    }

    /// 单帧静态图（延迟 0）
    pub fn still(image: FrameImage) -> Self {
        let width = image.width;
        let height = image.height;
        Self {
            frames: vec![Frame::new(image)],
            delays: vec![0],
            width,
            height,
            total_duration: 0,
        }
    }

    /// 纯色单帧动画（不涉及文件 IO，用于文字背景）
    pub fn solid_color(width: u32, height: u32, color: Rgba) -> Self {
        Self::still(FrameImage::filled(width, height, color))
    }

    /// 1x1 透明占位动画
    pub fn placeholder() -> Self {
        Self::solid_color(1, 1, Rgba::TRANSPARENT)
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// 获取指定帧；索引越界时钳制到最后一帧
    pub fn frame(&self, index: usize) -> &Frame {
        let last = self.frames.len() - 1;
        &self.frames[index.min(last)]
    }

    pub fn delays(&self) -> &[u32] {
        &self.delays
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// 所有延迟之和（毫秒）
    pub fn total_duration(&self) -> u64 {
        self.total_duration
    }

    /// 是否为静态图（总时长为 0）
    pub fn is_still(&self) -> bool {
        self.total_duration == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(w: u32, h: u32) -> Frame {
        Frame::new(FrameImage::filled(w, h, Rgba::WHITE))
    }

    #[test]
    fn test_animation_invariants() {
        let anim = Animation::new(vec![frame(2, 3), frame(4, 1)], vec![100, 250]).unwrap();
        assert_eq!(anim.frame_count(), anim.delays().len());
        assert_eq!(anim.total_duration(), 350);
        assert_eq!(anim.width(), 4);
        assert_eq!(anim.height(), 3);
        assert!(!anim.is_still());
    }

    #[test]
    fn test_empty_animation_rejected() {
        let err = Animation::new(Vec::new(), Vec::new()).unwrap_err();
        assert_eq!(
            err,
            AnimationError::InvalidAnimation {
                frames: 0,
                delays: 0
            }
        );
    }

    #[test]
    fn test_mismatched_delays_rejected() {
        assert!(Animation::new(vec![frame(1, 1)], vec![10, 20]).is_err());
    }

    #[test]
    fn test_solid_color() {
        let color = Rgba([1, 2, 3, 4]);
        let anim = Animation::solid_color(3, 2, color);
        assert_eq!(anim.frame_count(), 1);
        assert_eq!(anim.delays(), &[0]);
        assert_eq!(anim.total_duration(), 0);
        assert_eq!((anim.width(), anim.height()), (3, 2));
        let image = anim.frame(0).image();
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(image.pixel(x, y), Some(color.0));
            }
        }
        assert_eq!(image.pixel(3, 0), None);
    }

    #[test]
    fn test_placeholder() {
        let anim = Animation::placeholder();
        assert_eq!((anim.width(), anim.height()), (1, 1));
        assert!(anim.is_still());
    }

    #[test]
    fn test_frame_ids_unique() {
        let a = frame(1, 1);
        let b = frame(1, 1);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_frame_image_size_checked() {
        assert!(FrameImage::new(2, 2, vec![0; 16]).is_ok());
        assert!(FrameImage::new(2, 2, vec![0; 15]).is_err());
    }

    #[test]
    fn test_frame_index_clamped() {
        let anim = Animation::new(vec![frame(1, 1), frame(1, 1)], vec![10, 10]).unwrap();
        assert_eq!(anim.frame(5).id(), anim.frames()[1].id());
    }
}
