use crate::configuration::manifest::SelectorEntry;
use crate::connection::RenderDom;
use crate::harness::assert::Assertable;
use crate::harness::check::Action;
use crate::harness::context::Target;
use crate::harness::error::Error;
use std::sync::Arc;
use std::time::Instant;

/// A check that needs the rendered DOM rather than the raw HTML.
pub struct BrowserJob {
    path: String,
    selectors: Vec<SelectorEntry>,
    browser: Arc<dyn RenderDom>,
}

impl BrowserJob {
    pub fn new(path: String, selectors: Vec<SelectorEntry>, browser: Arc<dyn RenderDom>) -> Self {
        Self {
            path,
            selectors,
            browser,
        }
    }
}

impl Action for BrowserJob {
    fn path(&self) -> Option<&str> {
        Some(&self.path)
    }

    fn perform(&self, target: &Target) -> Result<(), Error> {
        let url = target.url(&self.path)?;
        let css: Vec<String> = self.selectors.iter().map(|s| s.css.clone()).collect();
        let now = Instant::now();
        let found = self.browser.render(&url, &css, target.timeout())?;
        debug!("Rendered {} in {} ms", url, now.elapsed().as_millis());
        if found.len() != self.selectors.len() {
            return Err(Error::Transport(format!(
                "browser answered {} of {} selectors",
                found.len(),
                self.selectors.len()
            )));
        }
        self.selectors
            .iter()
            .zip(found.iter())
            .try_for_each(|(selector, texts)| selector.assert(texts))
    }
}
