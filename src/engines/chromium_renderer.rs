// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::ScraperSettings;
use crate::engines::traits::{PageRenderer, RenderError, RenderSession};
use async_trait::async_trait;
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;

const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

// 轮询等待元素出现的间隔
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Chromium渲染器配置
#[derive(Debug, Clone)]
pub struct ChromiumConfig {
    /// 远程调试地址，为空时本地启动浏览器
    pub remote_debugging_url: Option<String>,
    /// 单次CDP请求与页面加载超时
    pub request_timeout: Duration,
    /// User-Agent
    pub user_agent: String,
}

impl Default for ChromiumConfig {
    fn default() -> Self {
        Self {
            remote_debugging_url: None,
            request_timeout: Duration::from_secs(30),
            user_agent: DESKTOP_USER_AGENT.to_string(),
        }
    }
}

impl From<&ScraperSettings> for ChromiumConfig {
    fn from(settings: &ScraperSettings) -> Self {
        Self {
            remote_debugging_url: settings.remote_debugging_url.clone(),
            request_timeout: Duration::from_secs(settings.request_timeout_secs),
            user_agent: settings
                .user_agent
                .clone()
                .unwrap_or_else(|| DESKTOP_USER_AGENT.to_string()),
        }
    }
}

/// Chromium渲染器
///
/// 基于chromiumoxide实现。每个会话独立启动（或远程连接）一个浏览器，
/// 会话关闭时随之销毁，崩溃的页面不会影响下一次解析。
pub struct ChromiumRenderer {
    config: ChromiumConfig,
}

impl ChromiumRenderer {
    pub fn new(config: ChromiumConfig) -> Self {
        Self { config }
    }

    fn browser_config(&self) -> Result<BrowserConfig, RenderError> {
        BrowserConfig::builder()
            .no_sandbox()
            .window_size(1920, 1080)
            .request_timeout(self.config.request_timeout)
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-blink-features=AutomationControlled")
            .arg(format!("--user-agent={}", self.config.user_agent))
            .build()
            .map_err(RenderError::Browser)
    }
}

#[async_trait]
impl PageRenderer for ChromiumRenderer {
    type Session = ChromiumSession;

    async fn open(&self) -> Result<ChromiumSession, RenderError> {
        let (browser, mut handler, owned) = match &self.config.remote_debugging_url {
            Some(url) => {
                tracing::info!("Connecting to remote Chrome instance at: {}", url);
                let (browser, handler) = Browser::connect(url).await.map_err(|e| {
                    RenderError::Browser(format!("Failed to connect to remote Chrome: {}", e))
                })?;
                (browser, handler, false)
            }
            None => {
                let (browser, handler) = Browser::launch(self.browser_config()?)
                    .await
                    .map_err(|e| RenderError::Browser(e.to_string()))?;
                (browser, handler, true)
            }
        };

        // Spawn a handler to process browser events
        let handler_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                return Err(RenderError::Browser(e.to_string()));
            }
        };

        if !owned {
            // 远程浏览器不会应用启动参数
            if let Err(e) = page.set_user_agent(self.config.user_agent.as_str()).await {
                tracing::warn!("Failed to set user agent on remote page: {}", e);
            }
        }

        tracing::debug!(remote = !owned, "Render session opened");

        Ok(ChromiumSession {
            browser,
            page,
            handler_task,
            owned,
            request_timeout: self.config.request_timeout,
        })
    }

    fn name(&self) -> &'static str {
        "chromium"
    }
}

/// Chromium渲染会话
pub struct ChromiumSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    /// 浏览器进程是否由本会话启动
    owned: bool,
    request_timeout: Duration,
}

fn map_cdp(selector: &str, err: CdpError) -> RenderError {
    match err {
        CdpError::Timeout => RenderError::Timeout,
        CdpError::NotFound => RenderError::ElementNotFound(selector.to_string()),
        other => RenderError::Browser(other.to_string()),
    }
}

#[async_trait]
impl RenderSession for ChromiumSession {
    type Element = Element;

    async fn render(&self, url: &str) -> Result<(), RenderError> {
        tokio::time::timeout(self.request_timeout, self.page.goto(url))
            .await
            .map_err(|_| RenderError::Timeout)?
            .map_err(|e| RenderError::Navigation(format!("{}: {}", url, e)))?;
        Ok(())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Element>, RenderError> {
        self.page
            .find_elements(selector)
            .await
            .map_err(|e| map_cdp(selector, e))
    }

    async fn find_within(
        &self,
        parent: &Element,
        selector: &str,
    ) -> Result<Vec<Element>, RenderError> {
        parent
            .find_elements(selector)
            .await
            .map_err(|e| map_cdp(selector, e))
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<Element, RenderError> {
        tokio::time::timeout(timeout, async {
            loop {
                match self.page.find_element(selector).await {
                    Ok(element) => return element,
                    Err(_) => tokio::time::sleep(WAIT_POLL_INTERVAL).await,
                }
            }
        })
        .await
        .map_err(|_| RenderError::Timeout)
    }

    async fn click(&self, element: &Element) -> Result<(), RenderError> {
        element
            .click()
            .await
            .map_err(|e| RenderError::Script(format!("Click failed: {}", e)))?;
        Ok(())
    }

    async fn text(&self, element: &Element) -> Result<String, RenderError> {
        let text = element
            .inner_text()
            .await
            .map_err(|e| RenderError::Script(e.to_string()))?;
        Ok(text.unwrap_or_default())
    }

    async fn attribute(&self, element: &Element, name: &str) -> Result<Option<String>, RenderError> {
        element
            .attribute(name)
            .await
            .map_err(|e| RenderError::Script(e.to_string()))
    }

    async fn scroll_extent(&self) -> Result<i64, RenderError> {
        self.page
            .evaluate("document.body.scrollHeight")
            .await
            .map_err(|e| RenderError::Script(e.to_string()))?
            .into_value::<i64>()
            .map_err(|e| RenderError::Script(e.to_string()))
    }

    async fn scroll_to_bottom(&self) -> Result<(), RenderError> {
        self.page
            .evaluate("window.scrollTo(0, document.body.scrollHeight);")
            .await
            .map_err(|e| RenderError::Script(format!("Scroll failed: {}", e)))?;
        Ok(())
    }

    async fn close(self) -> Result<(), RenderError> {
        let ChromiumSession {
            mut browser,
            page,
            handler_task,
            owned,
            ..
        } = self;

        if let Err(e) = page.close().await {
            tracing::debug!("Failed to close page: {}", e);
        }

        let result = if owned {
            let closed = browser
                .close()
                .await
                .map(|_| ())
                .map_err(|e| RenderError::Browser(e.to_string()));
            if let Err(e) = browser.wait().await {
                tracing::debug!("Failed to wait for browser exit: {}", e);
            }
            closed
        } else {
            Ok(())
        };

        handler_task.abort();
        result
    }
}
