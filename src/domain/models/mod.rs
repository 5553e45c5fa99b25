// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// - 位置（location）：餐厅所在的配送区域，解析过程中的中间值
/// - 排名快照（ranking）：一次解析得到的排名记录
pub mod location;
pub mod ranking;
