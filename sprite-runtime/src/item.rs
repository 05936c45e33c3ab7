//! # Item 模块
//!
//! 场景元素：矩形 + 动画集 + 变换 + 文字标签 + 输入回调。
//!
//! ## 设计说明
//!
//! - 动画集按 [`AnimSlot`] 固定分为 normal / hover / pressed 三个槽位
//! - 当前生效的槽位由分发器写入的 `hovered` / `pressed` 标志推导，不单独存储
//! - 动画通过 `Rc<Animation>` 共享，最后一个引用释放时帧数据随之释放
//! - 回调是普通闭包，元素被移除时随 Drop 一起清理

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::animation::Animation;
use crate::geometry::{Flip, Rect, Rgba, Tick};

/// 无参回调（点击、双击、滚轮）
pub type Callback = Box<dyn FnMut()>;

/// 悬停回调，参数为相对元素左上角的坐标
pub type HoverCallback = Box<dyn FnMut(i32, i32)>;

/// 编辑提交回调，参数为当前文本
pub type EditCallback = Box<dyn FnMut(&str)>;

/// 默认文本编辑缓冲区大小（含结尾占位，可容纳 `capacity - 1` 个字符）
pub const DEFAULT_EDIT_CAPACITY: usize = 256;

/// 动画集槽位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimSlot {
    Normal,
    Hover,
    Pressed,
}

impl AnimSlot {
    pub const ALL: [AnimSlot; 3] = [AnimSlot::Normal, AnimSlot::Hover, AnimSlot::Pressed];

    fn index(self) -> usize {
        match self {
            AnimSlot::Normal => 0,
            AnimSlot::Hover => 1,
            AnimSlot::Pressed => 2,
        }
    }
}

/// 同一槽位内多个动画的相对摆放方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// 全部对齐到元素左上角
    #[default]
    TopLeft,
    /// 以槽位内最大宽高为基准居中
    Center,
}

/// 三个槽位的动画集
#[derive(Debug, Clone, Default)]
pub struct AnimSets {
    slots: [Vec<Rc<Animation>>; 3],
}

impl AnimSets {
    pub fn get(&self, slot: AnimSlot) -> &[Rc<Animation>] {
        &self.slots[slot.index()]
    }

    pub fn set(&mut self, slot: AnimSlot, anims: Vec<Rc<Animation>>) {
        self.slots[slot.index()] = anims;
    }

    pub fn push(&mut self, slot: AnimSlot, anim: Rc<Animation>) {
        self.slots[slot.index()].push(anim);
    }

    pub fn clear(&mut self, slot: AnimSlot) {
        self.slots[slot.index()].clear();
    }

    pub fn is_empty(&self, slot: AnimSlot) -> bool {
        self.slots[slot.index()].is_empty()
    }

    /// 槽位内动画的最大宽高
    pub fn max_size(&self, slot: AnimSlot) -> (u32, u32) {
        self.get(slot).iter().fold((0, 0), |(w, h), anim| {
            (w.max(anim.width()), h.max(anim.height()))
        })
    }
}

/// 元素的全部输入回调
#[derive(Default)]
pub struct ItemCallbacks {
    pub click_left: Option<Callback>,
    pub click_right: Option<Callback>,
    pub double_click_left: Option<Callback>,
    pub double_click_right: Option<Callback>,
    pub wheel_up: Option<Callback>,
    pub wheel_down: Option<Callback>,
    pub hover: Option<HoverCallback>,
    pub edit: Option<EditCallback>,
}

impl fmt::Debug for ItemCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemCallbacks")
            .field("click_left", &self.click_left.is_some())
            .field("click_right", &self.click_right.is_some())
            .field("double_click_left", &self.double_click_left.is_some())
            .field("double_click_right", &self.double_click_right.is_some())
            .field("wheel_up", &self.wheel_up.is_some())
            .field("wheel_down", &self.wheel_down.is_some())
            .field("hover", &self.hover.is_some())
            .field("edit", &self.edit.is_some())
            .finish()
    }
}

/// 字体句柄
///
/// 具体字体由宿主层的文字服务管理，这里只保存不透明的 ID。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontId(pub u32);

/// 场景元素
#[derive(Debug)]
pub struct SceneItem {
    /// 矩形（overlay 时为屏幕坐标，否则为世界坐标）
    pub rect: Rect,
    pub anims: AnimSets,
    pub layout: Layout,
    /// 动画是否循环
    pub anim_loop: bool,
    /// 动画起始 tick
    pub anim_start_tick: Tick,
    /// 旋转角度（度）
    pub angle: f64,
    pub zoom_x: f64,
    pub zoom_y: f64,
    pub flip: Flip,
    /// 是否为 UI 覆盖层（不受相机影响）
    pub overlay: bool,
    /// 文字标签（可编辑元素同时作为编辑缓冲区）
    pub text: String,
    pub font: Option<FontId>,
    /// 文字背景色，完全透明时不绘制
    pub background: Rgba,
    /// 是否可获得键盘编辑焦点
    pub editable: bool,
    /// 编辑缓冲区大小
    pub edit_capacity: usize,
    pub callbacks: ItemCallbacks,
    /// 应用层自定义数据
    pub user_int1: i64,
    pub user_int2: i64,
    pub user_string: Option<String>,

    hovered: bool,
    pressed: bool,
}

impl Default for SceneItem {
    fn default() -> Self {
        Self {
            rect: Rect::new(-1, -1, 0, 0),
            anims: AnimSets::default(),
            layout: Layout::TopLeft,
            anim_loop: true,
            anim_start_tick: 0,
            angle: 0.0,
            zoom_x: 1.0,
            zoom_y: 1.0,
            flip: Flip::None,
            overlay: false,
            text: String::new(),
            font: None,
            background: Rgba::TRANSPARENT,
            editable: false,
            edit_capacity: DEFAULT_EDIT_CAPACITY,
            callbacks: ItemCallbacks::default(),
            user_int1: 0,
            user_int2: 0,
            user_string: None,
            hovered: false,
            pressed: false,
        }
    }
}

impl SceneItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_pos(&mut self, x: i32, y: i32) {
        self.rect.x = x;
        self.rect.y = y;
    }

    pub fn set_shape(&mut self, w: i32, h: i32) {
        self.rect.w = w;
        self.rect.h = h;
    }

    /// 用单个动画替换 normal 槽位，矩形尺寸设为动画尺寸
    pub fn set_anim(&mut self, anim: Rc<Animation>) {
        self.set_shape(to_i32(anim.width()), to_i32(anim.height()));
        self.anims.set(AnimSlot::Normal, vec![anim]);
    }

    /// 替换 normal 槽位，矩形只增不减
    pub fn set_anims(&mut self, anims: Vec<Rc<Animation>>) {
        self.anims.set(AnimSlot::Normal, anims);
        let (w, h) = self.anims.max_size(AnimSlot::Normal);
        self.grow_to(to_i32(w), to_i32(h));
    }

    /// 向 normal 槽位追加动画，矩形扩大到能容纳它
    pub fn push_anim(&mut self, anim: Rc<Animation>) {
        let (w, h) = (to_i32(anim.width()), to_i32(anim.height()));
        self.anims.push(AnimSlot::Normal, anim);
        self.grow_to(w, h);
    }

    /// 矩形扩大到至少 `w x h`
    ///
    /// 文字服务测量出标签尺寸后也通过它撑开元素。
    pub fn grow_to(&mut self, w: i32, h: i32) {
        self.rect.w = self.rect.w.max(w);
        self.rect.h = self.rect.h.max(h);
    }

    /// 重新开始播放动画
    pub fn restart_anim(&mut self, now: Tick) {
        self.anim_start_tick = now;
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn on_click_left(&mut self, f: impl FnMut() + 'static) {
        self.callbacks.click_left = Some(Box::new(f));
    }

    pub fn on_click_right(&mut self, f: impl FnMut() + 'static) {
        self.callbacks.click_right = Some(Box::new(f));
    }

    pub fn on_double_click_left(&mut self, f: impl FnMut() + 'static) {
        self.callbacks.double_click_left = Some(Box::new(f));
    }

    pub fn on_double_click_right(&mut self, f: impl FnMut() + 'static) {
        self.callbacks.double_click_right = Some(Box::new(f));
    }

    pub fn on_wheel_up(&mut self, f: impl FnMut() + 'static) {
        self.callbacks.wheel_up = Some(Box::new(f));
    }

    pub fn on_wheel_down(&mut self, f: impl FnMut() + 'static) {
        self.callbacks.wheel_down = Some(Box::new(f));
    }

    pub fn on_hover(&mut self, f: impl FnMut(i32, i32) + 'static) {
        self.callbacks.hover = Some(Box::new(f));
    }

    pub fn on_edit(&mut self, f: impl FnMut(&str) + 'static) {
        self.callbacks.edit = Some(Box::new(f));
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub(crate) fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }

    pub(crate) fn set_pressed(&mut self, pressed: bool) {
        self.pressed = pressed;
    }

    /// 本帧生效的动画集槽位
    ///
    /// 优先级：pressed > hover > normal；对应槽位为空时向下回退。
    pub fn active_slot(&self) -> AnimSlot {
        if self.pressed && !self.anims.is_empty(AnimSlot::Pressed) {
            AnimSlot::Pressed
        } else if self.hovered && !self.anims.is_empty(AnimSlot::Hover) {
            AnimSlot::Hover
        } else {
            AnimSlot::Normal
        }
    }

    /// 本帧生效的动画集
    pub fn active_anims(&self) -> &[Rc<Animation>] {
        self.anims.get(self.active_slot())
    }

    /// 是否有与该侧按键对应的单击或双击回调
    pub(crate) fn has_click_callback(&self, left: bool) -> bool {
        if left {
            self.callbacks.click_left.is_some() || self.callbacks.double_click_left.is_some()
        } else {
            self.callbacks.click_right.is_some() || self.callbacks.double_click_right.is_some()
        }
    }

    /// 编辑缓冲区最多可容纳的字符数
    pub fn edit_limit(&self) -> usize {
        self.edit_capacity.saturating_sub(1)
    }
}

fn to_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}
