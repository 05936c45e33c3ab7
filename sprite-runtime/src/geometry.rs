//! # Geometry 模块
//!
//! 矩形与颜色等基础几何类型。
//!
//! - [`Rect`]：世界坐标（或 overlay 时的屏幕坐标）下的整数矩形
//! - [`ScreenRect`]：经过相机变换后的屏幕矩形，渲染器直接使用

use serde::{Deserialize, Serialize};

/// 毫秒时间戳（全局 tick）
pub type Tick = u64;

/// 整数矩形
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    /// 创建矩形
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// 点是否在矩形内（左上闭、右下开）
    pub fn contains(&self, px: f64, py: f64) -> bool {
        let x = f64::from(self.x);
        let y = f64::from(self.y);
        x <= px && px < x + f64::from(self.w) && y <= py && py < y + f64::from(self.h)
    }
}

/// 屏幕矩形（相机变换后的输出）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl ScreenRect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }
}

/// RGBA 颜色（每通道 8 位）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba([0, 0, 0, 0]);
    pub const WHITE: Rgba = Rgba([0xff, 0xff, 0xff, 0xff]);

    /// 从 `0xRRGGBBAA` 形式的整数构造
    pub const fn from_u32(rgba: u32) -> Self {
        Self(rgba.to_be_bytes())
    }

    /// 是否完全透明
    pub fn is_transparent(&self) -> bool {
        self.0[3] == 0
    }
}

/// 镜像方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flip {
    #[default]
    None,
    Horizontal,
    Vertical,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_is_half_open() {
        let rect = Rect::new(10, 20, 5, 5);
        assert!(rect.contains(10.0, 20.0));
        assert!(rect.contains(14.9, 24.9));
        assert!(!rect.contains(15.0, 22.0));
        assert!(!rect.contains(12.0, 25.0));
        assert!(!rect.contains(9.9, 22.0));
    }

    #[test]
    fn test_rgba_from_u32() {
        let c = Rgba::from_u32(0x11223344);
        assert_eq!(c.0, [0x11, 0x22, 0x33, 0x44]);
        assert!(!c.is_transparent());
        assert!(Rgba::TRANSPARENT.is_transparent());
    }
}
