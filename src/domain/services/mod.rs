// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 地址解析（location_resolver）：从餐厅详情页解析邮编和城市
/// - 列表扫描（list_scanner）：在配送区域列表中定位餐厅的位置
/// - 排名解析（rank_resolver）：串联以上两步，产出排名快照
pub mod errors;
pub mod list_scanner;
pub mod location_resolver;
pub mod rank_resolver;

#[cfg(test)]
pub(crate) mod testing;
