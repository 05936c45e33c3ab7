//! 连击计数
//!
//! winit 不提供点击次数，这里按常见桌面系统的规则自行统计。

use sprite_runtime::{MouseButton, Tick};

/// 两次按下被视为连击的最大间隔（毫秒）
pub const MULTI_CLICK_INTERVAL_MS: Tick = 500;

/// 两次按下被视为连击的最大位移（像素）
pub const MULTI_CLICK_DISTANCE: i32 = 4;

#[derive(Debug, Clone, Copy)]
struct Press {
    button: MouseButton,
    x: i32,
    y: i32,
    tick: Tick,
    count: u8,
}

/// 连击计数器
#[derive(Debug, Default)]
pub struct ClickCounter {
    last: Option<Press>,
}

impl ClickCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次按下，返回连击次数
    ///
    /// 同一按键、间隔与位移都在阈值内时次数加一，否则从 1 重新计数。
    pub fn press(&mut self, button: MouseButton, x: i32, y: i32, now: Tick) -> u8 {
        let count = match self.last {
            Some(prev)
                if prev.button == button
                    && now.saturating_sub(prev.tick) <= MULTI_CLICK_INTERVAL_MS
                    && (x - prev.x).abs() <= MULTI_CLICK_DISTANCE
                    && (y - prev.y).abs() <= MULTI_CLICK_DISTANCE =>
            {
                prev.count.saturating_add(1)
            }
            _ => 1,
        };
        self.last = Some(Press {
            button,
            x,
            y,
            tick: now,
            count,
        });
        count
    }

    /// 松开时沿用最近一次按下的次数
    pub fn release(&self, button: MouseButton) -> u8 {
        match self.last {
            Some(prev) if prev.button == button => prev.count,
            _ => 1,
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
