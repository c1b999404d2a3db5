//! Browser session access behind a trait, so the harvesting loop can be
//! exercised against a scripted page in tests.

use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;
use async_trait::async_trait;
use fantoccini::wd::TimeoutConfiguration;
use fantoccini::{Client, ClientBuilder, Locator};

/// Everything the harvester needs from a live page. One session is owned by
/// exactly one harvesting pass; there is no concurrent access by design.
#[async_trait]
pub trait BrowserDriver: Send {
    type Element: Clone + Send + Sync;

    async fn navigate(&mut self, url: &str) -> anyhow::Result<()>;

    /// Bounded wait for an element to appear; errors after `timeout`.
    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> anyhow::Result<()>;

    /// CSS query against the whole page. Zero matches is `Ok(vec![])`.
    async fn query(&mut self, selector: &str) -> anyhow::Result<Vec<Self::Element>>;

    /// CSS query scoped to a subtree.
    async fn query_within(
        &mut self,
        root: &Self::Element,
        selector: &str,
    ) -> anyhow::Result<Vec<Self::Element>>;

    async fn text(&mut self, element: &Self::Element) -> anyhow::Result<String>;

    async fn attribute(
        &mut self,
        element: &Self::Element,
        name: &str,
    ) -> anyhow::Result<Option<String>>;

    async fn click(&mut self, element: &Self::Element) -> anyhow::Result<()>;

    async fn scroll_to_top(&mut self) -> anyhow::Result<()>;

    async fn scroll_to_bottom(&mut self) -> anyhow::Result<()>;

    /// Scrolls a dedicated container (e.g. the reviews feed) to its bottom.
    async fn scroll_element_to_bottom(&mut self, element: &Self::Element) -> anyhow::Result<()>;

    async fn page_height(&mut self) -> anyhow::Result<u64>;

    async fn screenshot(&mut self, path: &Path) -> anyhow::Result<()>;
}

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const PAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Live WebDriver session over fantoccini.
pub struct WebDriverSession {
    client: Client,
}

impl WebDriverSession {
    /// Connects to a running WebDriver endpoint (such as chromedriver) and
    /// opens a Chrome session tuned for scraping: headless unless asked
    /// otherwise, fixed window size and user agent, images disabled.
    pub async fn connect(webdriver_url: &str, headless: bool) -> anyhow::Result<Self> {
        let mut args = vec![
            "--no-sandbox".to_owned(),
            "--disable-dev-shm-usage".to_owned(),
            "--disable-gpu".to_owned(),
            "--disable-extensions".to_owned(),
            "--disable-infobars".to_owned(),
            "--window-size=1920,1080".to_owned(),
            format!("--user-agent={USER_AGENT}"),
        ];
        if headless {
            args.push("--headless=new".to_owned());
        }

        let options = serde_json::json!({
            "args": args,
            "prefs": {
                "profile.managed_default_content_settings.images": 2,
                "profile.default_content_setting_values.notifications": 2,
            },
        });
        let mut capabilities = serde_json::Map::new();
        capabilities.insert("goog:chromeOptions".to_owned(), options);

        let client = ClientBuilder::native()
            .capabilities(capabilities)
            .connect(webdriver_url)
            .await
            .with_context(|| format!("connect to webdriver at {webdriver_url}"))?;

        client
            .update_timeouts(TimeoutConfiguration::new(
                None,
                Some(PAGE_LOAD_TIMEOUT),
                None,
            ))
            .await
            .context("set page load timeout")?;

        Ok(Self { client })
    }

    /// Ends the session. Call on every exit path of a pass.
    pub async fn close(self) -> anyhow::Result<()> {
        self.client.close().await.context("close browser session")
    }
}

#[async_trait]
impl BrowserDriver for WebDriverSession {
    type Element = fantoccini::elements::Element;

    async fn navigate(&mut self, url: &str) -> anyhow::Result<()> {
        self.client
            .goto(url)
            .await
            .with_context(|| format!("navigate to {url}"))
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> anyhow::Result<()> {
        self.client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(selector))
            .await
            .map(|_| ())
            .with_context(|| format!("wait for element: {selector}"))
    }

    async fn query(&mut self, selector: &str) -> anyhow::Result<Vec<Self::Element>> {
        self.client
            .find_all(Locator::Css(selector))
            .await
            .with_context(|| format!("query: {selector}"))
    }

    async fn query_within(
        &mut self,
        root: &Self::Element,
        selector: &str,
    ) -> anyhow::Result<Vec<Self::Element>> {
        root.find_all(Locator::Css(selector))
            .await
            .with_context(|| format!("query within element: {selector}"))
    }

    async fn text(&mut self, element: &Self::Element) -> anyhow::Result<String> {
        element.text().await.context("read element text")
    }

    async fn attribute(
        &mut self,
        element: &Self::Element,
        name: &str,
    ) -> anyhow::Result<Option<String>> {
        element
            .attr(name)
            .await
            .with_context(|| format!("read attribute: {name}"))
    }

    async fn click(&mut self, element: &Self::Element) -> anyhow::Result<()> {
        element.clone().click().await.context("click element")
    }

    async fn scroll_to_top(&mut self) -> anyhow::Result<()> {
        self.client
            .execute("window.scrollTo(0, 0);", vec![])
            .await
            .map(|_| ())
            .context("scroll to top")
    }

    async fn scroll_to_bottom(&mut self) -> anyhow::Result<()> {
        self.client
            .execute("window.scrollTo(0, document.body.scrollHeight);", vec![])
            .await
            .map(|_| ())
            .context("scroll to bottom")
    }

    async fn scroll_element_to_bottom(&mut self, element: &Self::Element) -> anyhow::Result<()> {
        let handle = serde_json::to_value(element).context("serialize element handle")?;
        self.client
            .execute(
                "arguments[0].scrollTop = arguments[0].scrollHeight;",
                vec![handle],
            )
            .await
            .map(|_| ())
            .context("scroll container to bottom")
    }

    async fn page_height(&mut self) -> anyhow::Result<u64> {
        let value = self
            .client
            .execute("return document.body.scrollHeight;", vec![])
            .await
            .context("read page height")?;
        value
            .as_u64()
            .or_else(|| value.as_f64().map(|height| height as u64))
            .ok_or_else(|| anyhow::anyhow!("scrollHeight is not numeric: {value}"))
    }

    async fn screenshot(&mut self, path: &Path) -> anyhow::Result<()> {
        let png = self.client.screenshot().await.context("take screenshot")?;
        std::fs::write(path, png)
            .with_context(|| format!("write screenshot: {}", path.display()))
    }
}
