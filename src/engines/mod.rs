// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 渲染引擎模块
///
/// - 渲染抽象（traits）：页面渲染器与渲染会话
/// - Chromium实现（chromium_renderer）：基于 chromiumoxide 的无头浏览器
pub mod chromium_renderer;
pub mod traits;
