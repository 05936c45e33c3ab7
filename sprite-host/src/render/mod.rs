//! # Render 模块
//!
//! 绘制通道与渲染后端抽象。
//!
//! ## 设计说明
//!
//! - 具体后端（SDL、wgpu 等）只需实现 [`RenderSurface`] 与 [`TextService`]
//! - 纹理按 [`FrameId`](sprite_runtime::FrameId) 缓存在 [`TextureCache`] 中
//! - [`Compositor`] 每帧按场景顺序绘制，必须在输入分发与 `refresh_hover` 之后调用

mod compositor;
mod texture_cache;

pub use compositor::{Compositor, DrawStats};
pub use texture_cache::{CacheStats, DEFAULT_TEXTURE_BUDGET_MB, TextureCache};

use sprite_runtime::{Flip, FontId, FrameImage, Rgba, ScreenRect};
use thiserror::Error;

/// 渲染错误
#[derive(Error, Debug)]
pub enum RenderError {
    /// 创建纹理失败
    #[error("创建纹理失败 ({width}x{height}): {message}")]
    TextureCreation {
        width: u32,
        height: u32,
        message: String,
    },
}

/// 渲染输出面
pub trait RenderSurface {
    /// 后端纹理句柄
    type Texture: Clone;

    /// 输出尺寸（像素）
    fn output_size(&self) -> (u32, u32);

    /// 由 RGBA8 图像创建纹理
    fn create_texture(&mut self, image: &FrameImage) -> Result<Self::Texture, RenderError>;

    /// 纹理创建失败时使用的占位纹理
    fn placeholder_texture(&mut self) -> Self::Texture;

    /// 绘制纹理，`angle` 为绕矩形中心的顺时针角度（度）
    fn draw_texture(&mut self, texture: &Self::Texture, dest: ScreenRect, angle: f64, flip: Flip);

    /// 清屏
    fn clear(&mut self, color: Rgba);
}

/// 文字服务
pub trait TextService {
    /// 测量文字尺寸
    fn measure(&mut self, font: FontId, text: &str) -> (u32, u32);

    /// 把文字光栅化为白色 RGBA 图像，空文字返回 `None`
    fn rasterize(&mut self, font: FontId, text: &str) -> Option<FrameImage>;
}
