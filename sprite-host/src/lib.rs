//! # Sprite Host
//!
//! 精灵引擎的宿主层：负责一切 IO，把结果交给 `sprite-runtime`。
//!
//! ## 架构说明
//!
//! Host 层负责：
//! - 动画解码（GIF、静态图、ZIP 归档、视频）
//! - 资源来源（目录 / ZIP 包）与共享动画缓存
//! - winit 事件到运行时输入事件的转换
//! - 每帧绘制通道与纹理缓存
//!
//! 一帧的顺序：
//!
//! ```text
//! WinitInputAdapter::convert → Dispatcher::dispatch（每个事件）
//! Camera::tick(now) → Dispatcher::refresh_hover
//! Compositor::draw
//! ```

pub mod config;
pub mod decode;
pub mod input;
pub mod render;
pub mod resources;

pub use config::{AssetSourceType, ConfigError, HostConfig};
pub use decode::{DecodeError, Decoder, Format, decode};
pub use input::{ClickCounter, WinitInputAdapter};
pub use render::{
    CacheStats, Compositor, DrawStats, RenderError, RenderSurface, TextService, TextureCache,
};
pub use resources::{AnimationCache, AssetSource, FsSource, ResourceError, ZipSource};
