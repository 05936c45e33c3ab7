//! # 路径规范化模块
//!
//! 资源在内部统一使用**逻辑路径**：相对于资源根目录、`/` 分隔、不带 `assets/` 前缀。

/// 规范化逻辑路径
///
/// - 统一使用 `/` 分隔符
/// - 处理 `.` 和 `..`（越过根目录的 `..` 被丢弃）
/// - 移除 `assets/` 前缀
pub fn normalize_logical_path(path: &str) -> String {
    let unified = path.replace('\\', "/");

    let mut components: Vec<&str> = Vec::new();
    for component in unified.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                components.pop();
            }
            _ => components.push(component),
        }
    }

    let result = components.join("/");
    match result.strip_prefix("assets/") {
        Some(rest) => rest.to_string(),
        None => result,
    }
}
