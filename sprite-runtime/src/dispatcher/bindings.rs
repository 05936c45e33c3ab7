//! 全局（与元素无关的）键盘与鼠标回调表

use std::fmt;

use crate::input::{MouseEventKind, Scancode};
use crate::item::Callback;

/// 全局鼠标回调
///
/// 参数含义随事件类型不同：
/// - `Motion`: 指针屏幕坐标 `(x, y)`
/// - `ButtonDown` / `ButtonUp`: `(按键编码, 0)`
/// - `WheelUp` / `WheelDown`: `(滚动量, 0)`
pub type MouseCallback = Box<dyn FnMut(i32, i32)>;

struct KeyBinding {
    scancode: Scancode,
    down: Callback,
    up: Option<Callback>,
}

/// 按扫描码注册的按键回调表
///
/// 同一扫描码可以注册多次，按注册顺序依次触发。
#[derive(Default)]
pub struct KeyBindings {
    bindings: Vec<KeyBinding>,
}

impl KeyBindings {
    /// 注册按下回调，以及可选的松开回调
    pub fn bind(
        &mut self,
        scancode: Scancode,
        down: impl FnMut() + 'static,
        up: Option<Box<dyn FnMut()>>,
    ) {
        self.bindings.push(KeyBinding {
            scancode,
            down: Box::new(down),
            up,
        });
    }

    /// 移除某个扫描码的全部回调
    pub fn unbind(&mut self, scancode: Scancode) {
        self.bindings.retain(|b| b.scancode != scancode);
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// 触发按下回调，返回触发的数量
    pub(crate) fn fire_down(&mut self, scancode: Scancode) -> usize {
        let mut fired = 0;
        for binding in self.bindings.iter_mut().filter(|b| b.scancode == scancode) {
            (binding.down)();
            fired += 1;
        }
        fired
    }

    /// 触发松开回调，返回触发的数量
    pub(crate) fn fire_up(&mut self, scancode: Scancode) -> usize {
        let mut fired = 0;
        for binding in self.bindings.iter_mut().filter(|b| b.scancode == scancode) {
            if let Some(up) = binding.up.as_mut() {
                up();
                fired += 1;
            }
        }
        fired
    }
}

impl fmt::Debug for KeyBindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.bindings.iter().map(|b| (b.scancode, b.up.is_some())))
            .finish()
    }
}

/// 全局鼠标订阅表
///
/// 只有没有任何元素消费的鼠标事件才会分发到这里。
#[derive(Default)]
pub struct MouseSubscribers {
    subscribers: Vec<(MouseEventKind, MouseCallback)>,
}

impl MouseSubscribers {
    pub fn subscribe(&mut self, kind: MouseEventKind, callback: impl FnMut(i32, i32) + 'static) {
        self.subscribers.push((kind, Box::new(callback)));
    }

    pub fn clear(&mut self) {
        self.subscribers.clear();
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    pub(crate) fn fire(&mut self, kind: MouseEventKind, a: i32, b: i32) -> usize {
        let mut fired = 0;
        for (_, callback) in self.subscribers.iter_mut().filter(|(k, _)| *k == kind) {
            callback(a, b);
            fired += 1;
        }
        fired
    }
}

impl fmt::Debug for MouseSubscribers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.subscribers.iter().map(|(kind, _)| kind))
            .finish()
    }
}
