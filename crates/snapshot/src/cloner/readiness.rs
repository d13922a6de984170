//! The ordered barrier a sandbox passes before its clone may be read.

use core::time::Duration;
use std::rc::Rc;

use dom::{Frame, ImageRequest, ReadyState};
use futures::future::join_all;
use log::trace;
use tokio::time::{MissedTickBehavior, interval};

/// How often the sandbox document is checked after its load event.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// One thing the barrier waits for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadinessCondition {
    /// Load event fired, body has content and the document is complete.
    FrameLoaded,
    /// Every font face has loaded or failed.
    FontsReady,
    /// Every image element has decoded or failed.
    ImagesSettled,
}

/// Waits, in order, for the frame to load and then for fonts and images together.
///
/// There is no timeout at this level; dropping the future abandons the wait.
#[derive(Debug)]
pub struct ReadinessBarrier {
    frame: Rc<Frame>,
    wait_for_images: bool,
}

/// Whether image decoding is only observable after load for this user agent.
#[must_use]
pub fn resolves_images_late(user_agent: &str) -> bool {
    user_agent.contains("AppleWebKit")
}

impl ReadinessBarrier {
    /// Barrier for `frame`. `wait_for_images` overrides the user-agent based decision.
    #[must_use]
    pub fn new(frame: Rc<Frame>, wait_for_images: Option<bool>) -> Self {
        let wait_for_images =
            wait_for_images.unwrap_or_else(|| resolves_images_late(frame.user_agent()));
        Self {
            frame,
            wait_for_images,
        }
    }

    #[must_use]
    pub fn conditions(&self) -> Vec<ReadinessCondition> {
        let mut conditions = vec![
            ReadinessCondition::FrameLoaded,
            ReadinessCondition::FontsReady,
        ];
        if self.wait_for_images {
            conditions.push(ReadinessCondition::ImagesSettled);
        }
        conditions
    }

    fn body_ready(&self) -> bool {
        let document = self.frame.document();
        let document = document.borrow();
        document.ready_state() == ReadyState::Complete
            && document
                .body()
                .is_some_and(|body| !document.children(body).is_empty())
    }

    async fn frame_loaded(&self) {
        self.frame.load_event().await;
        let mut ticker = interval(POLL_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if self.body_ready() {
                return;
            }
            trace!(target: "snapshot::readiness", "sandbox body not ready, polling again");
        }
    }

    /// Resolve once every condition holds.
    pub async fn wait(&self) {
        self.frame_loaded().await;

        let (fonts, images) = {
            let document = self.frame.document();
            let document = document.borrow();
            let images: Vec<Rc<ImageRequest>> = if self.wait_for_images {
                document
                    .images()
                    .into_iter()
                    .filter_map(|(_, request)| request)
                    .collect()
            } else {
                Vec::new()
            };
            (document.fonts().clone(), images)
        };
        trace!(
            target: "snapshot::readiness",
            "waiting for {} font faces and {} images",
            fonts.faces().len(),
            images.len()
        );
        futures::join!(
            fonts.ready(),
            join_all(images.iter().map(|request| request.settled()))
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::{Document, FrameOptions};

    #[test]
    fn webkit_user_agents_wait_for_images() {
        assert!(resolves_images_late(
            "Mozilla/5.0 (Macintosh) AppleWebKit/605.1.15 (KHTML, like Gecko) Safari/605.1.15"
        ));
        assert!(!resolves_images_late("Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101"));
    }

    #[test]
    fn explicit_override_wins_over_user_agent() {
        let frame = Frame::new(Document::new(), &FrameOptions::default());
        let barrier = ReadinessBarrier::new(Rc::clone(&frame), Some(true));
        assert_eq!(
            barrier.conditions(),
            vec![
                ReadinessCondition::FrameLoaded,
                ReadinessCondition::FontsReady,
                ReadinessCondition::ImagesSettled
            ]
        );
        let barrier = ReadinessBarrier::new(frame, None);
        assert_eq!(barrier.conditions().len(), 2);
    }
}
