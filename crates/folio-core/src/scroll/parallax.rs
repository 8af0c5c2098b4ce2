use std::time::Duration;

use crate::config::ParallaxConfig;
use crate::dom::{ElementId, Presentation};
use crate::rate_limit::Throttle;
use crate::schedule::Millis;

/// Moves the hero element at a fraction of the scroll speed
#[derive(Debug, Clone)]
pub struct HeroParallax {
    element: ElementId,
    factor: f64,
    throttle: Throttle,
}

impl HeroParallax {
    pub fn new(element: ElementId, config: &ParallaxConfig) -> Self {
        Self {
            element,
            factor: config.factor,
            throttle: Throttle::new(Duration::from_millis(config.throttle_ms)),
        }
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    /// Apply the offset for `scroll_y` unless throttled. Returns whether it did.
    pub fn on_scroll<P>(&mut self, now: Millis, scroll_y: f64, presentation: &mut P) -> bool
    where
        P: Presentation + ?Sized,
    {
        if !self.throttle.try_acquire(now) {
            return false;
        }
        self.apply(scroll_y, presentation);
        true
    }

    /// Apply the offset for `scroll_y` regardless of the throttle
    pub fn apply<P>(&mut self, scroll_y: f64, presentation: &mut P)
    where
        P: Presentation + ?Sized,
    {
        presentation.set_translate_y(self.element, scroll_y * self.factor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::RecordingPresentation;

    #[test]
    fn test_offset_is_half_scroll() {
        let mut hero = HeroParallax::new(ElementId(1), &ParallaxConfig::default());
        let mut pres = RecordingPresentation::new();
        assert!(hero.on_scroll(0, 200.0, &mut pres));
        assert_eq!(pres.translate_y(ElementId(1)), Some(100.0));
    }

    #[test]
    fn test_throttled_within_window() {
        let mut hero = HeroParallax::new(ElementId(1), &ParallaxConfig::default());
        let mut pres = RecordingPresentation::new();
        assert!(hero.on_scroll(0, 10.0, &mut pres));
        assert!(!hero.on_scroll(5, 80.0, &mut pres));
        assert_eq!(pres.translate_y(ElementId(1)), Some(5.0));
        assert!(hero.on_scroll(10, 80.0, &mut pres));
        assert_eq!(pres.translate_y(ElementId(1)), Some(40.0));
    }
}
