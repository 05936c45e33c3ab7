//! # Sprite Runtime
//!
//! 精灵 2D 场景的核心运行时库。
//!
//! ## 架构概述
//!
//! `sprite-runtime` 是纯逻辑核心，不依赖任何 IO、窗口系统或渲染后端。
//! 宿主层（`sprite-host`）负责解码资源、采集输入并把它们交给这里：
//!
//! ```text
//! Host                              Runtime
//!   │                                  │
//!   │── decode() → Rc<Animation> ────►│ SceneItem / Scene
//!   │── InputEvent ──────────────────►│ Dispatcher::dispatch()
//!   │── now ─────────────────────────►│ Camera::tick()
//!   │                                  │ Dispatcher::refresh_hover()
//!   │◄── current_frame / world_to_screen ──│
//!   │                                  │
//! ```
//!
//! 一切都在单线程的更新/绘制循环中运行，不需要加锁。
//!
//! ## 模块结构
//!
//! - [`animation`]：与格式无关的帧序列
//! - [`schedule`]：按 tick 选帧
//! - [`camera`]：虚拟相机（平移/缩放过渡、坐标变换）
//! - [`easing`]：相机过渡的缓动曲线
//! - [`item`]：场景元素
//! - [`scene`]：场景元素容器
//! - [`input`]：输入事件
//! - [`dispatcher`]：命中测试与回调分发
//! - [`geometry`]：矩形、颜色
//! - [`error`]：错误类型定义

pub mod animation;
pub mod camera;
pub mod dispatcher;
pub mod easing;
pub mod error;
pub mod geometry;
pub mod input;
pub mod item;
pub mod scene;
pub mod schedule;

// 重导出核心类型
pub use animation::{Animation, DEFAULT_FRAME_DELAY_MS, Frame, FrameId, FrameImage};
pub use camera::{Camera, DEFAULT_TRANSITION_MS, Interpolate, Transition};
pub use dispatcher::{Dispatcher, EditOutcome, KeyBindings, MouseCallback, MouseSubscribers};
pub use easing::EasingFunction;
pub use error::AnimationError;
pub use geometry::{Flip, Rect, Rgba, ScreenRect, Tick};
pub use input::{InputEvent, Key, MouseButton, MouseEventKind, Scancode};
pub use item::{
    AnimSets, AnimSlot, Callback, DEFAULT_EDIT_CAPACITY, EditCallback, FontId, HoverCallback,
    ItemCallbacks, Layout, SceneItem,
};
pub use scene::{ItemId, Scene};
pub use schedule::current_frame;
