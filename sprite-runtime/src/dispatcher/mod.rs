//! # Dispatcher 模块
//!
//! 把输入事件分发给场景元素和全局回调。
//!
//! ## 设计说明
//!
//! - 命中测试分两趟：先 overlay 元素（屏幕坐标），再普通元素（经相机逆变换的世界坐标）
//! - 只要有 overlay 元素被命中，本次事件跳过普通元素那一趟
//! - 悬停可同时作用于多个元素；按下/松开/滚轮只交给第一个命中的元素
//! - 没有元素消费的鼠标事件交给全局订阅者
//! - 同一时刻最多一个元素持有键盘编辑焦点；持有焦点时按键输入进入其文本缓冲区
//!
//! 分发器必须在绘制之前跑完，保证渲染看到的 hover/pressed 状态一致。

mod bindings;
mod text_edit;

pub use bindings::{KeyBindings, MouseCallback, MouseSubscribers};
pub use text_edit::{EditOutcome, apply_key};

use tracing::debug;

use crate::camera::Camera;
use crate::geometry::Tick;
use crate::input::{InputEvent, Key, MouseButton, MouseEventKind, Scancode};
use crate::scene::{ItemId, Scene};

/// 命中结果：元素 ID + 相对元素左上角的坐标
#[derive(Debug, Clone, Copy)]
struct Hit {
    id: ItemId,
    local_x: i32,
    local_y: i32,
}

/// 输入分发器
#[derive(Debug)]
pub struct Dispatcher {
    pointer_inside: bool,
    pointer: (i32, i32),
    last_wheel_timestamp: Option<Tick>,
    focus: Option<ItemId>,
    /// 全局按键回调表
    pub keys: KeyBindings,
    /// 全局鼠标订阅表
    pub mouse: MouseSubscribers,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self {
            pointer_inside: true,
            pointer: (0, 0),
            last_wheel_timestamp: None,
            focus: None,
            keys: KeyBindings::default(),
            mouse: MouseSubscribers::default(),
        }
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 分发一个输入事件
    ///
    /// 返回 `true` 表示事件被某个元素或编辑焦点消费。
    pub fn dispatch(&mut self, event: &InputEvent, scene: &mut Scene, camera: &Camera) -> bool {
        match *event {
            InputEvent::WindowEnter => {
                self.pointer_inside = true;
                false
            }
            InputEvent::WindowLeave => {
                self.pointer_inside = false;
                for item in scene.items_mut() {
                    item.set_hovered(false);
                }
                false
            }
            InputEvent::KeyDown {
                scancode,
                key,
                shift,
                repeat,
            } => self.handle_key_down(scancode, key, shift, repeat, scene),
            InputEvent::KeyUp { scancode, repeat } => {
                if !repeat {
                    self.keys.fire_up(scancode);
                }
                false
            }
            InputEvent::MouseMotion { x, y } => {
                if !self.pointer_inside {
                    return false;
                }
                self.pointer = (x, y);
                self.handle_pointer(event, scene, camera)
            }
            InputEvent::MouseButtonDown { .. } => {
                if !self.pointer_inside {
                    return false;
                }
                self.clear_focus();
                self.handle_pointer(event, scene, camera)
            }
            InputEvent::MouseButtonUp { .. } => {
                // 窗口外松开也要清除按下状态
                for item in scene.items_mut() {
                    item.set_pressed(false);
                }
                if !self.pointer_inside {
                    return false;
                }
                self.handle_pointer(event, scene, camera)
            }
            InputEvent::MouseWheel { timestamp, .. } => {
                if !self.pointer_inside {
                    return false;
                }
                if self.last_wheel_timestamp == Some(timestamp) {
                    return false;
                }
                self.last_wheel_timestamp = Some(timestamp);
                self.handle_pointer(event, scene, camera)
            }
        }
    }

    /// 按当前指针位置重新计算所有元素的悬停标志
    ///
    /// 每帧绘制前调用一次。
    pub fn refresh_hover(&self, scene: &mut Scene, camera: &Camera) {
        for item in scene.items_mut() {
            item.set_hovered(false);
        }
        if !self.pointer_inside {
            return;
        }

        let mut hits = self.hit_test(scene, camera, true);
        if hits.is_empty() {
            hits = self.hit_test(scene, camera, false);
        }
        for hit in hits {
            if let Some(item) = scene.get_mut(hit.id) {
                item.set_hovered(true);
            }
        }
    }

    /// 当前持有编辑焦点的元素
    pub fn focus(&self) -> Option<ItemId> {
        self.focus
    }

    /// 把焦点交给指定元素（不检查是否可编辑）
    pub fn set_focus(&mut self, id: ItemId) {
        debug!(item = %id, "编辑焦点切换");
        self.focus = Some(id);
    }

    pub fn clear_focus(&mut self) {
        if let Some(id) = self.focus.take() {
            debug!(item = %id, "编辑焦点清除");
        }
    }

    /// 最后一次已知的指针屏幕坐标
    pub fn pointer_position(&self) -> (i32, i32) {
        self.pointer
    }

    pub fn is_pointer_inside(&self) -> bool {
        self.pointer_inside
    }

    fn handle_key_down(
        &mut self,
        scancode: Scancode,
        key: Key,
        shift: bool,
        repeat: bool,
        scene: &mut Scene,
    ) -> bool {
        if let Some(id) = self.focus {
            match scene.get_mut(id) {
                Some(item) => {
                    apply_key(item, key, shift);
                    return true;
                }
                None => {
                    // 焦点元素已被移除
                    self.focus = None;
                }
            }
        }

        if !repeat {
            self.keys.fire_down(scancode);
        }
        false
    }

    /// 两趟命中测试 + 全局订阅者兜底
    fn handle_pointer(&mut self, event: &InputEvent, scene: &mut Scene, camera: &Camera) -> bool {
        let mut consumed = false;

        for overlay in [true, false] {
            let hits = self.hit_test(scene, camera, overlay);
            if hits.is_empty() {
                continue;
            }
            consumed |= self.deliver(event, &hits, scene);
            if overlay {
                break;
            }
        }

        if !consumed {
            self.notify_subscribers(event);
        }
        consumed
    }

    fn hit_test(&self, scene: &Scene, camera: &Camera, overlay: bool) -> Vec<Hit> {
        let (sx, sy) = (f64::from(self.pointer.0), f64::from(self.pointer.1));
        let (px, py) = if overlay {
            (sx, sy)
        } else {
            camera.screen_to_world(sx, sy)
        };

        scene
            .iter()
            .filter(|(_, item)| item.overlay == overlay && item.rect.contains(px, py))
            .map(|(id, item)| Hit {
                id,
                local_x: (px - f64::from(item.rect.x)).floor() as i32,
                local_y: (py - f64::from(item.rect.y)).floor() as i32,
            })
            .collect()
    }

    /// 把事件交给一趟命中的元素，返回是否被消费
    fn deliver(&mut self, event: &InputEvent, hits: &[Hit], scene: &mut Scene) -> bool {
        match *event {
            InputEvent::MouseMotion { .. } => {
                for hit in hits {
                    if let Some(item) = scene.get_mut(hit.id) {
                        item.set_hovered(true);
                        if let Some(cb) = item.callbacks.hover.as_mut() {
                            cb(hit.local_x, hit.local_y);
                        }
                    }
                }
                true
            }
            InputEvent::MouseButtonDown { button, .. } => {
                let Some(item) = scene.get_mut(hits[0].id) else {
                    return false;
                };
                if item.editable {
                    // 获得焦点时缓冲区从头开始
                    item.text.clear();
                    self.set_focus(hits[0].id);
                }
                let left = button == MouseButton::Left;
                if matches!(button, MouseButton::Left | MouseButton::Right)
                    && item.has_click_callback(left)
                {
                    item.set_pressed(true);
                }
                true
            }
            InputEvent::MouseButtonUp { button, clicks } => {
                let Some(item) = scene.get_mut(hits[0].id) else {
                    return false;
                };
                let cbs = &mut item.callbacks;
                let callback = match (button, clicks) {
                    (MouseButton::Left, 1) => cbs.click_left.as_mut(),
                    (MouseButton::Right, 1) => cbs.click_right.as_mut(),
                    (MouseButton::Left, 2) => cbs.double_click_left.as_mut(),
                    (MouseButton::Right, 2) => cbs.double_click_right.as_mut(),
                    _ => None,
                };
                if let Some(cb) = callback {
                    cb();
                }
                true
            }
            InputEvent::MouseWheel { delta, .. } => {
                for hit in hits {
                    let Some(item) = scene.get_mut(hit.id) else {
                        continue;
                    };
                    let callback = if delta > 0 {
                        item.callbacks.wheel_up.as_mut()
                    } else if delta < 0 {
                        item.callbacks.wheel_down.as_mut()
                    } else {
                        None
                    };
                    if let Some(cb) = callback {
                        cb();
                        return true;
                    }
                }
                false
            }
            _ => false,
        }
    }

    fn notify_subscribers(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::MouseMotion { x, y } => {
                self.mouse.fire(MouseEventKind::Motion, x, y);
            }
            InputEvent::MouseButtonDown { button, .. } => {
                let code = button.code();
                self.mouse.fire(MouseEventKind::ButtonDown, code, 0);
            }
            InputEvent::MouseButtonUp { button, .. } => {
                let code = button.code();
                self.mouse.fire(MouseEventKind::ButtonUp, code, 0);
            }
            InputEvent::MouseWheel { delta, .. } => {
                if delta > 0 {
                    self.mouse.fire(MouseEventKind::WheelUp, delta, 0);
                } else if delta < 0 {
                    self.mouse.fire(MouseEventKind::WheelDown, delta, 0);
                }
            }
            _ => {}
        }
    }
}
