//! Reading-time metrics
//!
//! Once the page has had time to settle after an open, count the words left
//! on the page outside the card and report them to the host.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use nabber_dom::{Document, NodeId};
use serde::Serialize;
use smol::{LocalExecutor, Task, Timer};
use tracing::debug;

use crate::messages::OutboundMessage;
use crate::reporter::Reporter;

/// One measurement, taken per successful open
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSample {
    pub domain: String,
    /// Words on the page minus words in the overlay; may be negative
    pub estimated_words_saved: i64,
    /// Document-relative top of the first recipe element before it moved
    pub scroll_anchor_offset: f64,
}

impl MetricsSample {
    pub fn to_message(&self) -> OutboundMessage {
        OutboundMessage::WordsSaved {
            domain: self.domain.clone(),
            words_saved: self.estimated_words_saved,
            first_recipe_element_scroll_top: self.scroll_anchor_offset,
        }
    }
}

/// Measure the document now
pub fn sample(doc: &Document, overlay_root: NodeId, anchor_offset: f64) -> MetricsSample {
    let tree = doc.tree();
    let page_words = doc.body().map_or(0, |body| tree.word_count(body));
    let overlay_words = tree.word_count(overlay_root);
    MetricsSample {
        domain: doc.domain(),
        estimated_words_saved: page_words as i64 - overlay_words as i64,
        scroll_anchor_offset: anchor_offset,
    }
}

/// Spawn a task that samples after `delay` and reports the result
///
/// Delivery failures are logged and dropped.
pub fn schedule_sample<P>(
    executor: &LocalExecutor<'static>,
    document: Rc<RefCell<Document>>,
    overlay_root: NodeId,
    anchor_offset: f64,
    delay: Duration,
    reporter: Rc<P>,
) -> Task<MetricsSample>
where
    P: Reporter + ?Sized + 'static,
{
    executor.spawn(async move {
        Timer::after(delay).await;
        let measured = sample(&document.borrow(), overlay_root, anchor_offset);
        debug!(?measured, "metrics sampled");
        if let Err(err) = reporter.report(&measured.to_message()) {
            debug!("metrics report dropped: {err}");
        }
        measured
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::ChannelReporter;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn test_sample_subtracts_overlay() {
        let mut doc = Document::new("https://www.example.org/soup");
        let body = doc.body().unwrap();
        let para = doc.tree.create_element("p");
        let text = doc.tree.create_text(&words(40));
        let overlay = doc.tree.create_element("div");
        let card = doc.tree.create_text(&words(5));
        let script = doc.tree.create_element("script");
        let code = doc.tree.create_text("var a = 1; var b = 2;");
        doc.tree.append_child(body, para).unwrap();
        doc.tree.append_child(para, text).unwrap();
        doc.tree.append_child(body, overlay).unwrap();
        doc.tree.append_child(overlay, card).unwrap();
        doc.tree.append_child(body, script).unwrap();
        doc.tree.append_child(script, code).unwrap();

        let measured = sample(&doc, overlay, 120.0);
        assert_eq!(measured.domain, "www.example.org");
        assert_eq!(measured.estimated_words_saved, 40);
        assert_eq!(measured.scroll_anchor_offset, 120.0);
    }

    #[test]
    fn test_sample_may_be_negative() {
        let mut doc = Document::new("https://example.org/");
        let overlay = doc.tree.create_element("div");
        let text = doc.tree.create_text(&words(7));
        doc.tree.append_child(overlay, text).unwrap();
        assert_eq!(sample(&doc, overlay, 0.0).estimated_words_saved, -7);
    }

    #[test]
    fn test_scheduled_sample_reports_once() {
        let executor = LocalExecutor::new();
        let doc = Rc::new(RefCell::new(Document::new("https://example.org/")));
        let overlay = doc.borrow_mut().tree.create_element("div");
        let (tx, rx) = smol::channel::unbounded();
        let reporter = Rc::new(ChannelReporter::new(tx));

        let task = schedule_sample(
            &executor,
            doc.clone(),
            overlay,
            3.0,
            Duration::from_millis(5),
            reporter,
        );
        let measured = smol::block_on(executor.run(task));
        assert_eq!(measured.estimated_words_saved, 0);
        assert_eq!(rx.len(), 1);
        let json = rx.try_recv().unwrap();
        assert!(json.contains(r#""firstRecipeElementScrollTop":3.0"#));
    }

    #[test]
    fn test_report_failure_swallowed() {
        let executor = LocalExecutor::new();
        let doc = Rc::new(RefCell::new(Document::new("https://example.org/")));
        let overlay = doc.borrow_mut().tree.create_element("div");
        let (tx, rx) = smol::channel::unbounded();
        drop(rx);

        let task = schedule_sample(
            &executor,
            doc,
            overlay,
            0.0,
            Duration::ZERO,
            Rc::new(ChannelReporter::new(tx)),
        );
        let measured = smol::block_on(executor.run(task));
        assert_eq!(measured.domain, "example.org");
    }
}
