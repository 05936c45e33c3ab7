//! # Input 模块
//!
//! 把 winit 窗口事件转换为运行时的 [`InputEvent`]。
//!
//! ## 设计说明
//!
//! - 指针坐标取物理像素，向下取整
//! - 连击次数由 [`ClickCounter`] 统计，松开事件沿用按下时的次数
//! - 滚轮只保留方向，时间戳取转换时的全局 tick
//! - 扫描码来自物理按键，字符来自不含修饰键的逻辑按键，Shift 状态单独跟踪

mod click;

pub use click::{ClickCounter, MULTI_CLICK_DISTANCE, MULTI_CLICK_INTERVAL_MS};

use sprite_runtime::{InputEvent, Key, MouseButton, Scancode, Tick};
use tracing::trace;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::{Key as WinitKey, NamedKey, PhysicalKey};
use winit::platform::modifier_supplement::KeyEventExtModifierSupplement;
use winit::platform::scancode::PhysicalKeyExtScancode;

/// winit 事件适配器
#[derive(Debug, Default)]
pub struct WinitInputAdapter {
    cursor: (i32, i32),
    shift: bool,
    clicks: ClickCounter,
}

impl WinitInputAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 最近一次指针位置
    pub fn cursor(&self) -> (i32, i32) {
        self.cursor
    }

    /// 转换窗口事件，不关心的事件返回 `None`
    pub fn convert(&mut self, event: &WindowEvent, now: Tick) -> Option<InputEvent> {
        let converted = match event {
            WindowEvent::CursorEntered { .. } => Some(InputEvent::WindowEnter),
            WindowEvent::CursorLeft { .. } => {
                self.clicks.reset();
                Some(InputEvent::WindowLeave)
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x.floor() as i32, position.y.floor() as i32);
                Some(InputEvent::MouseMotion {
                    x: self.cursor.0,
                    y: self.cursor.1,
                })
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = convert_button(*button)?;
                Some(match state {
                    ElementState::Pressed => {
                        let (x, y) = self.cursor;
                        let clicks = self.clicks.press(button, x, y, now);
                        InputEvent::MouseButtonDown { button, clicks }
                    }
                    ElementState::Released => InputEvent::MouseButtonUp {
                        button,
                        clicks: self.clicks.release(button),
                    },
                })
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => f64::from(*y),
                    MouseScrollDelta::PixelDelta(pos) => pos.y,
                };
                if dy == 0.0 {
                    None
                } else {
                    Some(InputEvent::MouseWheel {
                        delta: if dy > 0.0 { 1 } else { -1 },
                        timestamp: now,
                    })
                }
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.shift = modifiers.state().shift_key();
                None
            }
            WindowEvent::KeyboardInput { event, .. } => self.convert_key(
                event.physical_key,
                &event.key_without_modifiers(),
                event.state,
                event.repeat,
            ),
            _ => None,
        };
        if let Some(ev) = &converted {
            trace!(event = ?ev, "输入事件");
        }
        converted
    }

    fn convert_key(
        &self,
        physical: PhysicalKey,
        logical: &WinitKey,
        state: ElementState,
        repeat: bool,
    ) -> Option<InputEvent> {
        let scancode = Scancode(physical.to_scancode().unwrap_or(0));
        Some(match state {
            ElementState::Pressed => InputEvent::KeyDown {
                scancode,
                key: convert_key(logical),
                shift: self.shift,
                repeat,
            },
            ElementState::Released => InputEvent::KeyUp { scancode, repeat },
        })
    }
}

fn convert_button(button: winit::event::MouseButton) -> Option<MouseButton> {
    match button {
        winit::event::MouseButton::Left => Some(MouseButton::Left),
        winit::event::MouseButton::Right => Some(MouseButton::Right),
        winit::event::MouseButton::Middle => Some(MouseButton::Middle),
        _ => None,
    }
}

/// 逻辑按键 → 文本编辑关心的按键语义
pub fn convert_key(key: &WinitKey) -> Key {
    match key {
        WinitKey::Named(NamedKey::Enter) => Key::Enter,
        WinitKey::Named(NamedKey::Backspace) => Key::Backspace,
        WinitKey::Named(NamedKey::Delete) => Key::Delete,
        WinitKey::Named(NamedKey::Space) => Key::Char(' '),
        WinitKey::Character(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::Char(c),
                _ => Key::Other,
            }
        }
        _ => Key::Other,
    }
}
