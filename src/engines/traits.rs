// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// 渲染错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// 超时
    #[error("Timeout")]
    Timeout,
    /// 元素未找到
    #[error("Element not found: {0}")]
    ElementNotFound(String),
    /// 页面导航失败
    #[error("Navigation failed: {0}")]
    Navigation(String),
    /// 脚本执行失败
    #[error("Script evaluation failed: {0}")]
    Script(String),
    /// 浏览器错误
    #[error("Browser error: {0}")]
    Browser(String),
}

impl RenderError {
    /// 判断会话是否已不可用
    ///
    /// 浏览器本身出错时继续在同一会话上重试没有意义
    pub fn is_session_fatal(&self) -> bool {
        matches!(self, RenderError::Browser(_))
    }
}

/// 渲染会话
///
/// 一个会话对应一次排名解析，使用完毕后必须调用 `close` 释放。
/// 所有调用都是单次、可失败的，实现方不应在内部重试。
#[async_trait]
pub trait RenderSession: Send + Sync {
    /// 元素句柄
    type Element: Send + Sync;

    /// 加载页面
    async fn render(&self, url: &str) -> Result<(), RenderError>;

    /// 查询页面中所有匹配的元素
    async fn find_all(&self, selector: &str) -> Result<Vec<Self::Element>, RenderError>;

    /// 查询元素内部所有匹配的子元素
    async fn find_within(
        &self,
        parent: &Self::Element,
        selector: &str,
    ) -> Result<Vec<Self::Element>, RenderError>;

    /// 等待元素出现，超过 `timeout` 返回 `RenderError::Timeout`
    async fn wait_for(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Self::Element, RenderError>;

    /// 点击元素
    async fn click(&self, element: &Self::Element) -> Result<(), RenderError>;

    /// 元素可见文本
    async fn text(&self, element: &Self::Element) -> Result<String, RenderError>;

    /// 元素属性
    async fn attribute(
        &self,
        element: &Self::Element,
        name: &str,
    ) -> Result<Option<String>, RenderError>;

    /// 页面内容高度（滚动范围）
    async fn scroll_extent(&self) -> Result<i64, RenderError>;

    /// 滚动到页面底部，触发增量加载
    async fn scroll_to_bottom(&self) -> Result<(), RenderError>;

    /// 释放会话
    async fn close(self) -> Result<(), RenderError>
    where
        Self: Sized;
}

/// 页面渲染器
///
/// 为每次解析创建独立的渲染会话，会话之间互不复用
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// 会话类型
    type Session: RenderSession;

    /// 打开新的会话
    async fn open(&self) -> Result<Self::Session, RenderError>;

    /// 渲染器名称
    fn name(&self) -> &'static str;
}
