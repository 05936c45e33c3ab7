//! # Camera 模块
//!
//! 虚拟相机：平移 + 缩放，带平滑过渡，负责世界坐标与屏幕坐标之间的转换。
//!
//! ## 设计说明
//!
//! - 平移和缩放各自是一个 [`Transition`]，记录起点、目标和过渡开始时刻
//! - `set_*` 开始一段过渡；目标未变化时不做任何事（不会重启过渡）
//! - `force_*` 立即跳到目标
//! - `tick(now)` 每帧调用一次，推进插值
//! - overlay 矩形已经是屏幕坐标，不参与变换

use crate::easing::EasingFunction;
use crate::geometry::{Rect, ScreenRect, Tick};

/// 默认过渡时长（毫秒）
pub const DEFAULT_TRANSITION_MS: Tick = 150;

/// 缩放下限，避免除零
const MIN_ZOOM: f64 = 1e-3;

/// 可插值的值
pub trait Interpolate: Copy + PartialEq {
    /// 在 `from` 和 `to` 之间按 `t`（0.0 - 1.0）插值
    fn interpolate(from: Self, to: Self, t: f64) -> Self;
}

impl Interpolate for f64 {
    fn interpolate(from: Self, to: Self, t: f64) -> Self {
        from + (to - from) * t
    }
}

impl Interpolate for (i32, i32) {
    fn interpolate(from: Self, to: Self, t: f64) -> Self {
        let lerp = |a: i32, b: i32| {
            let (a, b) = (f64::from(a), f64::from(b));
            (a + (b - a) * t) as i32
        };
        (lerp(from.0, to.0), lerp(from.1, to.1))
    }
}

/// 单个值的过渡状态
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition<T> {
    previous: T,
    target: T,
    current: T,
    start: Tick,
}

impl<T: Interpolate> Transition<T> {
    pub fn new(value: T) -> Self {
        Self {
            previous: value,
            target: value,
            current: value,
            start: 0,
        }
    }

    /// 设置新目标，返回是否真正开始了过渡
    pub fn set(&mut self, value: T, now: Tick) -> bool {
        if value == self.target {
            return false;
        }
        self.previous = self.current;
        self.target = value;
        self.start = now;
        true
    }

    /// 立即跳到目标
    pub fn force(&mut self, value: T) {
        self.previous = value;
        self.target = value;
        self.current = value;
    }

    /// 推进插值
    pub fn update(&mut self, now: Tick, duration: Tick, easing: EasingFunction) {
        let elapsed = now.saturating_sub(self.start);
        if duration > 0 && elapsed < duration {
            let t = easing.apply(elapsed as f64 / duration as f64);
            self.current = T::interpolate(self.previous, self.target, t);
        } else {
            self.previous = self.target;
            self.current = self.target;
        }
    }

    pub fn previous(&self) -> T {
        self.previous
    }

    pub fn target(&self) -> T {
        self.target
    }

    pub fn current(&self) -> T {
        self.current
    }

    /// 过渡开始时刻
    pub fn start(&self) -> Tick {
        self.start
    }
}

/// 虚拟相机
#[derive(Debug, Clone)]
pub struct Camera {
    pan: Transition<(i32, i32)>,
    zoom: Transition<f64>,
    now: Tick,
    transition_ms: Tick,
    easing: EasingFunction,
    viewport: (u32, u32),
}

impl Camera {
    /// 创建相机
    ///
    /// # 参数
    /// - `viewport_width` / `viewport_height`: 渲染输出尺寸（像素）
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            pan: Transition::new((0, 0)),
            zoom: Transition::new(1.0),
            now: 0,
            transition_ms: DEFAULT_TRANSITION_MS,
            easing: EasingFunction::Linear,
            viewport: (viewport_width, viewport_height),
        }
    }

    /// 设置过渡时长（毫秒）
    pub fn with_transition_ms(mut self, ms: Tick) -> Self {
        self.transition_ms = ms;
        self
    }

    /// 设置缓动函数
    pub fn with_easing(mut self, easing: EasingFunction) -> Self {
        self.easing = easing;
        self
    }

    /// 更新渲染输出尺寸（窗口大小变化时调用）
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// 平移到 `(x, y)`（世界坐标中心点），带过渡
    pub fn set_pan(&mut self, x: i32, y: i32) {
        self.pan.set((x, y), self.now);
    }

    /// 缩放到 `z`，带过渡
    pub fn set_zoom(&mut self, z: f64) {
        self.zoom.set(z.max(MIN_ZOOM), self.now);
    }

    /// 立即平移（瞬移）
    pub fn force_pan(&mut self, x: i32, y: i32) {
        self.pan.force((x, y));
    }

    /// 立即缩放
    pub fn force_zoom(&mut self, z: f64) {
        self.zoom.force(z.max(MIN_ZOOM));
    }

    /// 推进到时刻 `now`
    pub fn tick(&mut self, now: Tick) {
        self.now = now;
        self.pan.update(now, self.transition_ms, self.easing);
        self.zoom.update(now, self.transition_ms, self.easing);
    }

    /// 最近一次 `tick` 的时刻
    pub fn now(&self) -> Tick {
        self.now
    }

    pub fn target_pan(&self) -> (i32, i32) {
        self.pan.target()
    }

    pub fn current_pan(&self) -> (i32, i32) {
        self.pan.current()
    }

    pub fn target_zoom(&self) -> f64 {
        self.zoom.target()
    }

    pub fn current_zoom(&self) -> f64 {
        self.zoom.current()
    }

    pub fn pan_transition(&self) -> &Transition<(i32, i32)> {
        &self.pan
    }

    pub fn zoom_transition(&self) -> &Transition<f64> {
        &self.zoom
    }

    /// 世界原点相对屏幕的偏移（未缩放）
    fn offset(&self) -> (f64, f64) {
        let z = self.zoom.current();
        let (px, py) = self.pan.current();
        (
            f64::from(self.viewport.0) / z / 2.0 - f64::from(px),
            f64::from(self.viewport.1) / z / 2.0 - f64::from(py),
        )
    }

    /// 世界矩形 → 屏幕矩形，返回 `None` 表示完全在视口外
    pub fn world_to_screen(&self, rect: Rect, overlay: bool) -> Option<ScreenRect> {
        self.world_to_screen_scaled(rect, overlay, 1.0, 1.0)
    }

    /// 带元素自身缩放的变换
    ///
    /// 元素缩放先作用于宽高，再叠加相机缩放；结果向上取整，避免相邻精灵间出现 1px 缝隙。
    pub fn world_to_screen_scaled(
        &self,
        rect: Rect,
        overlay: bool,
        zoom_x: f64,
        zoom_y: f64,
    ) -> Option<ScreenRect> {
        let w = (f64::from(rect.w) * zoom_x) as i32;
        let h = (f64::from(rect.h) * zoom_y) as i32;

        let out = if overlay {
            ScreenRect::new(rect.x, rect.y, w, h)
        } else {
            let z = self.zoom.current();
            let (ox, oy) = self.offset();
            ScreenRect {
                x: ((f64::from(rect.x) + ox) * z).ceil() as i32,
                y: ((f64::from(rect.y) + oy) * z).ceil() as i32,
                w: (f64::from(w) * z).ceil() as i32,
                h: (f64::from(h) * z).ceil() as i32,
            }
        };

        if self.is_outside(&out) { None } else { Some(out) }
    }

    /// 屏幕坐标 → 世界坐标
    pub fn screen_to_world(&self, x: f64, y: f64) -> (f64, f64) {
        let z = self.zoom.current();
        let (ox, oy) = self.offset();
        (x / z - ox, y / z - oy)
    }

    fn is_outside(&self, r: &ScreenRect) -> bool {
        let vw = i64::from(self.viewport.0);
        let vh = i64::from(self.viewport.1);
        let (x, y, w, h) = (
            i64::from(r.x),
            i64::from(r.y),
            i64::from(r.w),
            i64::from(r.h),
        );
        x > vw || x + w < 0 || y > vh || y + h < 0
    }
}
