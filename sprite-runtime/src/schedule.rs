//! # Schedule 模块
//!
//! 根据全局 tick 计算当前应显示的帧。
//!
//! 纯函数：同样的 `(animation, looping, start, now)` 总是返回同样的帧索引。

use crate::animation::Animation;
use crate::geometry::Tick;

/// 计算当前帧索引
///
/// - 总时长为 0（静态图）时总是返回 0
/// - 循环：`elapsed = (now - start) % total`，返回累计延迟首次超过 `elapsed` 的帧
/// - 不循环：超过总时长后停在最后一帧
/// - `now < start`（时钟回拨）按 `elapsed = 0` 处理
pub fn current_frame(
    animation: &Animation,
    looping: bool,
    start_tick: Tick,
    now_tick: Tick,
) -> usize {
    let total = animation.total_duration();
    if total == 0 {
        return 0;
    }

    let last = animation.frame_count() - 1;
    let elapsed = now_tick.saturating_sub(start_tick);

    let elapsed = if looping {
        elapsed % total
    } else if elapsed >= total {
        return last;
    } else {
        elapsed
    };

    let mut cumulative = 0u64;
    for (index, &delay) in animation.delays().iter().enumerate() {
        cumulative += u64::from(delay);
        if elapsed < cumulative {
            return index;
        }
    }

    last
}
