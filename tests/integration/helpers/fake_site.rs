// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 内存中的假站点
//!
//! 按URL回放详情页与列表页内容，供真实的 `RankResolver` 使用

use async_trait::async_trait;
use rankrs::config::settings::ScraperSettings;
use rankrs::engines::traits::{PageRenderer, RenderError, RenderSession};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const DETAIL_PATH: &str = "/speisekarte/";
const LISTING_PATH: &str = "/lieferservice/essen/";

#[derive(Default)]
pub struct FakeSite {
    /// 餐厅标识 -> 地址文本
    pub addresses: HashMap<String, String>,
    /// 列表标识（如 `frechen-50226`）-> 按顺序排列的餐厅标识
    pub listings: HashMap<String, Vec<String>>,
    /// 渲染该餐厅详情页时panic
    pub crash_on: Option<String>,
    pub sessions_opened: AtomicUsize,
    pub sessions_closed: AtomicUsize,
}

impl FakeSite {
    pub fn restaurant(mut self, slug: &str, address: &str) -> Self {
        self.addresses.insert(slug.to_string(), address.to_string());
        self
    }

    pub fn listing(mut self, listing_slug: &str, slugs: &[&str]) -> Self {
        self.listings.insert(
            listing_slug.to_string(),
            slugs.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    pub fn crashing_on(mut self, slug: &str) -> Self {
        self.crash_on = Some(slug.to_string());
        self
    }
}

/// 所有等待缩短到毫秒级的抓取配置
pub fn fast_scraper_settings() -> ScraperSettings {
    ScraperSettings {
        listing_settle_ms: 1,
        scroll_pause_ms: 1,
        container_timeout_ms: 10,
        location_settle_ms: 1,
        reveal_timeout_ms: 10,
        ..ScraperSettings::default()
    }
}

#[derive(Clone)]
pub struct FakeRenderer {
    pub site: Arc<FakeSite>,
}

impl FakeRenderer {
    pub fn new(site: FakeSite) -> Self {
        Self {
            site: Arc::new(site),
        }
    }
}

#[async_trait]
impl PageRenderer for FakeRenderer {
    type Session = FakeSession;

    async fn open(&self) -> Result<FakeSession, RenderError> {
        self.site.sessions_opened.fetch_add(1, Ordering::SeqCst);
        Ok(FakeSession {
            site: self.site.clone(),
            url: Mutex::new(String::new()),
            revealed: AtomicBool::new(false),
        })
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

#[derive(Debug, Clone, Copy)]
pub enum FakeNode {
    Button,
    Address,
    Container,
    Card(usize),
    Link(usize),
    Rating,
}

pub struct FakeSession {
    site: Arc<FakeSite>,
    url: Mutex<String>,
    revealed: AtomicBool,
}

impl FakeSession {
    fn page(&self, prefix: &str) -> Option<String> {
        let url = self.url.lock().unwrap();
        url.split_once(prefix).map(|(_, rest)| rest.to_string())
    }

    fn cards(&self) -> Vec<String> {
        self.page(LISTING_PATH)
            .and_then(|key| self.site.listings.get(&key).cloned())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RenderSession for FakeSession {
    type Element = FakeNode;

    async fn render(&self, url: &str) -> Result<(), RenderError> {
        *self.url.lock().unwrap() = url.to_string();
        self.revealed.store(false, Ordering::SeqCst);
        if let Some(slug) = &self.site.crash_on {
            if url.ends_with(&format!("{}{}", DETAIL_PATH, slug)) {
                panic!("render process crashed on {}", url);
            }
        }
        Ok(())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<FakeNode>, RenderError> {
        if selector.contains("restaurant-card") {
            return Ok((0..self.cards().len()).map(FakeNode::Card).collect());
        }
        Ok(Vec::new())
    }

    async fn find_within(
        &self,
        parent: &FakeNode,
        selector: &str,
    ) -> Result<Vec<FakeNode>, RenderError> {
        match (parent, selector) {
            (FakeNode::Card(i), "a") => Ok(vec![FakeNode::Link(*i)]),
            (FakeNode::Card(_), s) if s.contains("restaurant-ratings") => {
                Ok(vec![FakeNode::Rating])
            }
            _ => Ok(Vec::new()),
        }
    }

    async fn wait_for(&self, selector: &str, _timeout: Duration) -> Result<FakeNode, RenderError> {
        let detail = self
            .page(DETAIL_PATH)
            .filter(|slug| self.site.addresses.contains_key(slug));

        if selector.contains("header-action-info") && detail.is_some() {
            return Ok(FakeNode::Button);
        }
        if selector.contains("info-address")
            && detail.is_some()
            && self.revealed.load(Ordering::SeqCst)
        {
            return Ok(FakeNode::Address);
        }
        if selector.contains("list-all-open-content")
            && self
                .page(LISTING_PATH)
                .is_some_and(|key| self.site.listings.contains_key(&key))
        {
            return Ok(FakeNode::Container);
        }
        Err(RenderError::Timeout)
    }

    async fn click(&self, element: &FakeNode) -> Result<(), RenderError> {
        if matches!(element, FakeNode::Button) {
            self.revealed.store(true, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn text(&self, element: &FakeNode) -> Result<String, RenderError> {
        match element {
            FakeNode::Address => Ok(self
                .page(DETAIL_PATH)
                .and_then(|slug| self.site.addresses.get(&slug).cloned())
                .unwrap_or_default()),
            FakeNode::Rating => Ok("4,5\n(66)".to_string()),
            _ => Ok(String::new()),
        }
    }

    async fn attribute(
        &self,
        element: &FakeNode,
        name: &str,
    ) -> Result<Option<String>, RenderError> {
        match (element, name) {
            (FakeNode::Link(i), "href") => Ok(self
                .cards()
                .get(*i)
                .map(|slug| format!("{}{}", DETAIL_PATH, slug))),
            _ => Ok(None),
        }
    }

    async fn scroll_extent(&self) -> Result<i64, RenderError> {
        Ok(1_000)
    }

    async fn scroll_to_bottom(&self) -> Result<(), RenderError> {
        Ok(())
    }

    async fn close(self) -> Result<(), RenderError> {
        self.site.sessions_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
