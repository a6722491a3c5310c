//! In-memory browser serving fixed HTML per URL.

use super::Browser;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::error::Error;
use std::rc::Rc;

#[derive(Default)]
pub struct FakeBrowser {
    pages: HashMap<String, String>,
    current: Option<String>,
    visits: Rc<RefCell<Vec<String>>>,
    closed: Rc<Cell<bool>>,
    source_calls: usize,
    panic_on_visit: Option<usize>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    /// Panic inside the `n`th call to `goto` (1-based).
    pub fn panic_on_visit(mut self, n: usize) -> Self {
        self.panic_on_visit = Some(n);
        self
    }

    /// Shared log of every URL passed to `goto`, in order.
    pub fn visits(&self) -> Rc<RefCell<Vec<String>>> {
        Rc::clone(&self.visits)
    }

    /// Flag flipped by `close`.
    pub fn closed(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.closed)
    }

    pub fn source_calls(&self) -> usize {
        self.source_calls
    }
}

impl Browser for FakeBrowser {
    async fn goto(&mut self, url: &str) -> Result<(), Box<dyn Error>> {
        self.visits.borrow_mut().push(url.to_string());
        if self.panic_on_visit == Some(self.visits.borrow().len()) {
            panic!("browser crashed while loading {}", url);
        }
        if !self.pages.contains_key(url) {
            self.current = None;
            return Err(format!("unreachable: {}", url).into());
        }
        self.current = Some(url.to_string());
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String, Box<dyn Error>> {
        self.current.clone().ok_or_else(|| "no page loaded".into())
    }

    async fn source(&mut self) -> Result<String, Box<dyn Error>> {
        self.source_calls += 1;
        self.current
            .as_ref()
            .and_then(|url| self.pages.get(url))
            .cloned()
            .ok_or_else(|| "no page loaded".into())
    }

    async fn close(self) -> Result<(), Box<dyn Error>> {
        self.closed.set(true);
        Ok(())
    }
}
