//! # Input 模块
//!
//! 定义宿主层向分发器传递的输入事件。
//!
//! ## 设计说明
//!
//! - `InputEvent` 是平台无关的抽象事件，宿主层负责从窗口系统转换
//! - 点击次数（单击/双击）由平台侧统计后随事件传入
//! - 滚轮事件携带平台时间戳，用于去重

use serde::{Deserialize, Serialize};

use crate::geometry::Tick;

/// 物理按键码（平台无关的扫描码）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Scancode(pub u32);

/// 按键的语义
///
/// 文本编辑只关心这几类按键。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// 可打印字符（未应用 Shift 的小写形式）
    Char(char),
    Enter,
    Backspace,
    Delete,
    /// 其他按键（方向键、功能键等）
    Other,
}

/// 鼠标按键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// 输入事件
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// 指针进入窗口
    WindowEnter,
    /// 指针离开窗口
    WindowLeave,
    /// 指针移动（屏幕坐标）
    MouseMotion { x: i32, y: i32 },
    /// 按下鼠标键
    MouseButtonDown { button: MouseButton, clicks: u8 },
    /// 松开鼠标键
    ///
    /// `clicks` 为平台统计的连击次数：1 = 单击，2 = 双击。
    MouseButtonUp { button: MouseButton, clicks: u8 },
    /// 滚轮（`delta > 0` 向上）
    MouseWheel { delta: i32, timestamp: Tick },
    /// 按下键盘按键
    KeyDown {
        scancode: Scancode,
        key: Key,
        shift: bool,
        repeat: bool,
    },
    /// 松开键盘按键
    KeyUp { scancode: Scancode, repeat: bool },
}

/// 全局鼠标订阅的事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    Motion,
    ButtonDown,
    ButtonUp,
    WheelUp,
    WheelDown,
}

impl MouseButton {
    /// 作为全局回调参数时的数值（左 1，中 2，右 3）
    pub fn code(self) -> i32 {
        match self {
            MouseButton::Left => 1,
            MouseButton::Middle => 2,
            MouseButton::Right => 3,
        }
    }
}

impl InputEvent {
    /// 是否为鼠标/窗口事件
    pub fn is_pointer_event(&self) -> bool {
        !matches!(self, InputEvent::KeyDown { .. } | InputEvent::KeyUp { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_event_classification() {
        assert!(InputEvent::WindowEnter.is_pointer_event());
        assert!(InputEvent::MouseMotion { x: 0, y: 0 }.is_pointer_event());
        assert!(
            !InputEvent::KeyUp {
                scancode: Scancode(4),
                repeat: false
            }
            .is_pointer_event()
        );
    }

    #[test]
    fn test_button_codes() {
        assert_eq!(MouseButton::Left.code(), 1);
        assert_eq!(MouseButton::Middle.code(), 2);
        assert_eq!(MouseButton::Right.code(), 3);
    }
}
