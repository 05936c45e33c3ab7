//! 键盘文本编辑
//!
//! 编辑缓冲区就是焦点元素的 `text` 字段，容量由 `edit_capacity` 决定。

use crate::input::Key;
use crate::item::SceneItem;

/// 一次按键对缓冲区的影响
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// 追加了字符
    Inserted,
    /// 缓冲区已满，字符被丢弃
    Full,
    /// 删除了最后一个字符（空缓冲区时为无操作）
    Erased,
    /// 触发了提交
    Submitted,
    /// 与编辑无关的按键
    Ignored,
}

/// 把一次按键应用到元素的编辑缓冲区
pub fn apply_key(item: &mut SceneItem, key: Key, shift: bool) -> EditOutcome {
    match key {
        Key::Enter => {
            if let Some(cb) = item.callbacks.edit.as_mut() {
                cb(&item.text);
            }
            EditOutcome::Submitted
        }
        Key::Backspace | Key::Delete => {
            item.text.pop();
            EditOutcome::Erased
        }
        Key::Char(c) if !c.is_control() => {
            if item.text.chars().count() >= item.edit_limit() {
                return EditOutcome::Full;
            }
            let c = if shift && c.is_ascii_lowercase() {
                c.to_ascii_uppercase()
            } else {
                c
            };
            item.text.push(c);
            EditOutcome::Inserted
        }
        Key::Char(_) | Key::Other => EditOutcome::Ignored,
    }
}
