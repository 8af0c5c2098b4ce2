pub mod animate;
pub mod config;
pub mod dom;
pub mod error;
pub mod page;
pub mod rate_limit;
pub mod reveal;
pub mod schedule;
pub mod scroll;
pub mod visibility;

pub use config::SiteConfig;
pub use dom::{ElementId, Presentation, RecordingPresentation, StateFlag};
pub use error::{Error, Result};
pub use page::{AttrElement, Page, PageElements, Task};
pub use schedule::{Millis, Scheduler, TimerId, VirtualScheduler};
pub use scroll::{Layout, NavLink, ScrollState, Section};
pub use visibility::{
    IntersectionEntry, Margin, TriggerPolicy, VisibilityWatcher, WatchGroup, WatchOptions,
};
