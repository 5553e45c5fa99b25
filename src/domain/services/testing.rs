// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 脚本化的渲染会话
//!
//! 按预设的页面内容回放查询结果，用于在没有浏览器的情况下驱动定位与扫描的各个分支。

use crate::engines::traits::{PageRenderer, RenderError, RenderSession};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct FakeCard {
    pub href: Option<String>,
    pub rating: Option<String>,
    /// 卡片DOM损坏，读取链接时报错
    pub broken: bool,
}

impl FakeCard {
    pub fn restaurant(slug: &str) -> Self {
        Self {
            href: Some(format!("/speisekarte/{}", slug)),
            rating: None,
            broken: false,
        }
    }

    pub fn rated(slug: &str, rating: &str) -> Self {
        Self {
            rating: Some(rating.to_string()),
            ..Self::restaurant(slug)
        }
    }

    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeElement {
    RevealButton,
    Address,
    Container,
    Card(usize),
    Link(usize),
    Rating(usize),
}

#[derive(Debug, Default)]
pub struct Script {
    /// 地址按钮是否会出现
    pub reveal_available: bool,
    /// 每次尝试返回的地址文本，最后一项重复使用
    pub address_texts: Vec<String>,
    /// 列表页是否存在
    pub listing_available: bool,
    pub cards: Vec<FakeCard>,
    /// 第n次滚动后可见的卡片数，最后一项重复使用
    pub visible_steps: Vec<usize>,
    /// 第n次滚动后的页面高度，为空时按可见卡片数计算
    pub extent_steps: Vec<i64>,
    /// 打开会话失败
    pub open_fails: bool,
    /// 渲染URL以该slug结尾的页面时panic
    pub panic_on: Option<String>,

    // 记录
    pub sessions_opened: usize,
    pub sessions_closed: usize,
    pub rendered: Vec<String>,
    pub wait_timeouts: Vec<(String, Duration)>,
    pub clicks: usize,
    pub scrolls: usize,
    pub address_reads: usize,
}

impl Script {
    pub fn with_address(text: &str) -> Self {
        Self {
            reveal_available: true,
            address_texts: vec![text.to_string()],
            ..Self::default()
        }
    }

    pub fn with_listing(mut self, cards: Vec<FakeCard>, visible_steps: Vec<usize>) -> Self {
        self.listing_available = true;
        self.cards = cards;
        self.visible_steps = visible_steps;
        self
    }

    fn visible(&self) -> usize {
        let step = self
            .visible_steps
            .get(self.scrolls)
            .or_else(|| self.visible_steps.last())
            .copied()
            .unwrap_or(self.cards.len());
        step.min(self.cards.len())
    }

    fn extent(&self) -> i64 {
        match self
            .extent_steps
            .get(self.scrolls)
            .or_else(|| self.extent_steps.last())
        {
            Some(extent) => *extent,
            None => 500 + 100 * self.visible() as i64,
        }
    }
}

#[derive(Clone)]
pub struct ScriptedRenderer {
    pub script: Arc<Mutex<Script>>,
}

impl ScriptedRenderer {
    pub fn new(script: Script) -> Self {
        Self {
            script: Arc::new(Mutex::new(script)),
        }
    }

    pub fn session(&self) -> ScriptedSession {
        ScriptedSession {
            script: self.script.clone(),
        }
    }

    pub fn inspect<T>(&self, f: impl FnOnce(&Script) -> T) -> T {
        f(&self.script.lock().unwrap())
    }
}

#[async_trait]
impl PageRenderer for ScriptedRenderer {
    type Session = ScriptedSession;

    async fn open(&self) -> Result<ScriptedSession, RenderError> {
        let mut script = self.script.lock().unwrap();
        if script.open_fails {
            return Err(RenderError::Browser("launch failed".to_string()));
        }
        script.sessions_opened += 1;
        Ok(self.session())
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

pub struct ScriptedSession {
    script: Arc<Mutex<Script>>,
}

#[async_trait]
impl RenderSession for ScriptedSession {
    type Element = FakeElement;

    async fn render(&self, url: &str) -> Result<(), RenderError> {
        let crash = {
            let mut script = self.script.lock().unwrap();
            script.rendered.push(url.to_string());
            script
                .panic_on
                .as_ref()
                .is_some_and(|slug| url.ends_with(slug.as_str()))
        };
        if crash {
            panic!("renderer crashed on {}", url);
        }
        let mut script = self.script.lock().unwrap();
        script.scrolls = 0;
        Ok(())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<FakeElement>, RenderError> {
        let script = self.script.lock().unwrap();
        if selector.contains("restaurant-card") && script.listing_available {
            return Ok((0..script.visible()).map(FakeElement::Card).collect());
        }
        Ok(Vec::new())
    }

    async fn find_within(
        &self,
        parent: &FakeElement,
        selector: &str,
    ) -> Result<Vec<FakeElement>, RenderError> {
        let script = self.script.lock().unwrap();
        let FakeElement::Card(index) = *parent else {
            return Ok(Vec::new());
        };
        let card = &script.cards[index];
        if card.broken {
            return Err(RenderError::ElementNotFound(selector.to_string()));
        }
        if selector.contains("restaurant-ratings") {
            return Ok(card
                .rating
                .as_ref()
                .map(|_| vec![FakeElement::Rating(index)])
                .unwrap_or_default());
        }
        if selector == "a" {
            return Ok(card
                .href
                .as_ref()
                .map(|_| vec![FakeElement::Link(index)])
                .unwrap_or_default());
        }
        Ok(Vec::new())
    }

    async fn wait_for(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<FakeElement, RenderError> {
        let (found, wait) = {
            let mut script = self.script.lock().unwrap();
            script.wait_timeouts.push((selector.to_string(), timeout));
            let found = if selector.contains("header-action-info") {
                script.reveal_available.then_some(FakeElement::RevealButton)
            } else if selector.contains("info-address") {
                (script.reveal_available && script.clicks > 0).then_some(FakeElement::Address)
            } else if selector.contains("list-all-open-content") {
                script.listing_available.then_some(FakeElement::Container)
            } else {
                None
            };
            (found, timeout)
        };

        match found {
            Some(element) => Ok(element),
            None => {
                tokio::time::sleep(wait).await;
                Err(RenderError::Timeout)
            }
        }
    }

    async fn click(&self, _element: &FakeElement) -> Result<(), RenderError> {
        self.script.lock().unwrap().clicks += 1;
        Ok(())
    }

    async fn text(&self, element: &FakeElement) -> Result<String, RenderError> {
        let mut script = self.script.lock().unwrap();
        match *element {
            FakeElement::Address => {
                let index = script.address_reads;
                script.address_reads += 1;
                Ok(script
                    .address_texts
                    .get(index)
                    .or_else(|| script.address_texts.last())
                    .cloned()
                    .unwrap_or_default())
            }
            FakeElement::Rating(index) => Ok(script.cards[index].rating.clone().unwrap_or_default()),
            _ => Ok(String::new()),
        }
    }

    async fn attribute(
        &self,
        element: &FakeElement,
        name: &str,
    ) -> Result<Option<String>, RenderError> {
        let script = self.script.lock().unwrap();
        match (*element, name) {
            (FakeElement::Link(index), "href") => Ok(script.cards[index].href.clone()),
            _ => Ok(None),
        }
    }

    async fn scroll_extent(&self) -> Result<i64, RenderError> {
        Ok(self.script.lock().unwrap().extent())
    }

    async fn scroll_to_bottom(&self) -> Result<(), RenderError> {
        self.script.lock().unwrap().scrolls += 1;
        Ok(())
    }

    async fn close(self) -> Result<(), RenderError> {
        self.script.lock().unwrap().sessions_closed += 1;
        Ok(())
    }
}
