use std::time::Duration;

use tracing::debug;

use crate::config::TypingConfig;
use crate::dom::{ElementId, Presentation};
use crate::schedule::{Scheduler, TimerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingState {
    Idle,
    /// Next character is due on `timer`
    Waiting { timer: TimerId },
    Done,
    Stopped,
}

/// Types an element's text back in one character at a time
#[derive(Debug, Clone)]
pub struct TypingEffect {
    element: ElementId,
    chars: Vec<char>,
    typed: usize,
    start_delay: Duration,
    interval: Duration,
    state: TypingState,
}

impl TypingEffect {
    pub fn new(element: ElementId, text: &str, config: &TypingConfig) -> Self {
        Self {
            element,
            chars: text.chars().collect(),
            typed: 0,
            start_delay: Duration::from_millis(config.start_delay_ms),
            interval: Duration::from_millis(config.char_interval_ms),
            state: TypingState::Idle,
        }
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn state(&self) -> TypingState {
        self.state
    }

    /// Text shown so far
    pub fn typed(&self) -> String {
        self.chars[..self.typed].iter().collect()
    }

    /// Clear the element and schedule the first character
    pub fn start<K, S, P>(&mut self, scheduler: &mut S, key: K, presentation: &mut P) -> bool
    where
        S: Scheduler<K> + ?Sized,
        P: Presentation + ?Sized,
    {
        if self.state != TypingState::Idle {
            return false;
        }
        presentation.set_text(self.element, "");
        if self.chars.is_empty() {
            self.state = TypingState::Done;
            return true;
        }
        let timer = scheduler.set_timeout(self.start_delay, key);
        self.state = TypingState::Waiting { timer };
        true
    }

    /// Type the next character if `id` is the pending step
    pub fn on_timer<K, S, P>(
        &mut self,
        id: TimerId,
        scheduler: &mut S,
        key: K,
        presentation: &mut P,
    ) -> bool
    where
        S: Scheduler<K> + ?Sized,
        P: Presentation + ?Sized,
    {
        match self.state {
            TypingState::Waiting { timer } if timer == id => {}
            _ => return false,
        }

        self.typed = (self.typed + 1).min(self.chars.len());
        presentation.set_text(self.element, &self.typed());

        if self.typed < self.chars.len() {
            let timer = scheduler.set_timeout(self.interval, key);
            self.state = TypingState::Waiting { timer };
        } else {
            debug!(element = %self.element, "Typing effect finished");
            self.state = TypingState::Done;
        }
        true
    }

    pub fn stop<K, S>(&mut self, scheduler: &mut S)
    where
        S: Scheduler<K> + ?Sized,
    {
        if let TypingState::Waiting { timer } = self.state {
            scheduler.clear_timeout(timer);
        }
        if self.state != TypingState::Done {
            self.state = TypingState::Stopped;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::RecordingPresentation;
    use crate::schedule::VirtualScheduler;

    #[test]
    fn test_types_one_char_per_interval() {
        let mut sched = VirtualScheduler::new();
        let mut pres = RecordingPresentation::new();
        let el = ElementId(1);
        let mut typing = TypingEffect::new(el, "Hai", &TypingConfig::default());

        typing.start(&mut sched, (), &mut pres);
        assert_eq!(pres.text(el), Some(""));

        let mut stamps = Vec::new();
        while let Some((id, ())) = sched.pop_due(u64::MAX) {
            typing.on_timer(id, &mut sched, (), &mut pres);
            stamps.push((sched.now(), pres.text(el).unwrap_or_default().to_string()));
        }

        assert_eq!(
            stamps,
            vec![
                (1000, "H".to_string()),
                (1100, "Ha".to_string()),
                (1200, "Hai".to_string()),
            ]
        );
        assert_eq!(typing.state(), TypingState::Done);
    }

    #[test]
    fn test_multibyte_text_types_per_char() {
        let mut sched = VirtualScheduler::new();
        let mut pres = RecordingPresentation::new();
        let el = ElementId(1);
        let mut typing = TypingEffect::new(el, "héllo 👋", &TypingConfig::default());
        typing.start(&mut sched, (), &mut pres);
        while let Some((id, ())) = sched.pop_due(u64::MAX) {
            typing.on_timer(id, &mut sched, (), &mut pres);
        }
        assert_eq!(pres.text(el), Some("héllo 👋"));
    }

    #[test]
    fn test_empty_text_finishes_immediately() {
        let mut sched = VirtualScheduler::new();
        let mut pres = RecordingPresentation::new();
        let mut typing = TypingEffect::new(ElementId(1), "", &TypingConfig::default());
        assert!(typing.start(&mut sched, (), &mut pres));
        assert_eq!(typing.state(), TypingState::Done);
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn test_stop_mid_way() {
        let mut sched = VirtualScheduler::new();
        let mut pres = RecordingPresentation::new();
        let el = ElementId(1);
        let mut typing = TypingEffect::new(el, "Nabil", &TypingConfig::default());
        typing.start(&mut sched, (), &mut pres);
        let (id, ()) = sched.pop_due(u64::MAX).unwrap();
        typing.on_timer(id, &mut sched, (), &mut pres);
        typing.stop(&mut sched);

        assert_eq!(sched.pending(), 0);
        assert_eq!(pres.text(el), Some("N"));
        assert_eq!(typing.state(), TypingState::Stopped);
    }
}
