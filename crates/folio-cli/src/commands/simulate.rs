use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use folio_core::dom::Change;
use folio_core::{
    Page, RecordingPresentation, Scheduler, SiteConfig, Task, VirtualScheduler, WatchGroup,
};

use crate::scenario::{build, Names, Scenario, SimLayout, Step};

type SimPage = Page<VirtualScheduler<Task>, RecordingPresentation>;

/// One presentation change, stamped and named for output
#[derive(Debug, Serialize)]
pub struct TimelineEntry {
    pub at_ms: u64,
    pub name: String,
    pub change: Change,
}

/// Replays a scenario on virtual time
pub struct Simulation {
    page: SimPage,
    layout: SimLayout,
    names: Names,
    config: SiteConfig,
}

impl Simulation {
    pub fn new(scenario: &Scenario, config: &SiteConfig) -> Self {
        let mut names = Names::default();
        let (elements, layout) = build(scenario, &mut names);
        let page = Page::new(
            config,
            elements,
            VirtualScheduler::new(),
            RecordingPresentation::new(),
        );
        Self {
            page,
            layout,
            names,
            config: config.clone(),
        }
    }

    pub fn page(&self) -> &SimPage {
        &self.page
    }

    /// Initial pass plus the observers' first notification batch
    pub fn start(&mut self) -> Vec<TimelineEntry> {
        self.page.start(&self.layout);
        self.notify_observers();
        self.collect()
    }

    /// Run timers up to `at_ms`, then apply a scroll and/or resize
    pub fn step(&mut self, step: &Step) -> Vec<TimelineEntry> {
        let mut out = self.advance_to(step.at_ms);

        if let Some(resize) = step.resize {
            debug!(at_ms = step.at_ms, "Resize");
            self.layout.resize(resize);
            self.page.on_resize();
        }
        if let Some(scroll_y) = step.scroll_y {
            debug!(at_ms = step.at_ms, scroll_y, "Scroll");
            self.layout.viewport.scroll_y = scroll_y;
            self.page.on_scroll(&self.layout);
        }
        self.notify_observers();

        out.extend(self.collect());
        out
    }

    /// Run every timer due by `at_ms`, stamping changes with their firing time
    pub fn advance_to(&mut self, at_ms: u64) -> Vec<TimelineEntry> {
        let mut out = Vec::new();
        while let Some(due) = self.page.scheduler().next_due().filter(|due| *due <= at_ms) {
            self.page.advance_to(due, &self.layout);
            out.extend(self.collect());
        }
        self.page.advance_to(at_ms, &self.layout);
        out
    }

    fn notify_observers(&mut self) {
        for group in WatchGroup::ALL {
            let margin = self.config.watch_options(group).margin;
            let entries = self.layout.entries(self.page.watched(group), &margin);
            if !entries.is_empty() {
                self.page.on_intersections(group, &entries);
            }
        }
    }

    fn collect(&mut self) -> Vec<TimelineEntry> {
        let at_ms = self.page.scheduler().now();
        self.page
            .presentation_mut()
            .drain_log()
            .into_iter()
            .map(|change| TimelineEntry {
                at_ms,
                name: self.names.name(change.element()).to_string(),
                change,
            })
            .collect()
    }
}

fn describe(change: &Change) -> String {
    match change {
        Change::Flag { flag, on, .. } => {
            format!("{}{}", if *on { '+' } else { '-' }, flag.class_name())
        }
        Change::Text { text, .. } => format!("text = {text:?}"),
        Change::Width { percent, .. } => format!("width = {percent}%"),
        Change::TranslateY { px, .. } => format!("translateY = {px}px"),
    }
}

fn print_entries(entries: &[TimelineEntry], json: bool) -> Result<()> {
    for entry in entries {
        if json {
            println!("{}", serde_json::to_string(entry)?);
        } else {
            println!(
                "[{:>6}ms] {:<16} {}",
                entry.at_ms,
                entry.name,
                describe(&entry.change)
            );
        }
    }
    Ok(())
}

pub async fn run(
    scenario_path: &Path,
    config: &SiteConfig,
    json: bool,
    realtime: bool,
) -> Result<()> {
    let scenario = Scenario::load(scenario_path)
        .with_context(|| format!("loading scenario {}", scenario_path.display()))?;

    let mut sim = Simulation::new(&scenario, config);
    print_entries(&sim.start(), json)?;

    let mut last_ms = 0;
    for step in &scenario.steps {
        if realtime {
            tokio::time::sleep(Duration::from_millis(step.at_ms - last_ms)).await;
        }
        last_ms = step.at_ms;
        print_entries(&sim.step(step), json)?;
    }

    let end_ms = scenario.end_ms();
    if realtime {
        tokio::time::sleep(Duration::from_millis(end_ms - last_ms)).await;
    }
    print_entries(&sim.advance_to(end_ms), json)?;

    if !json {
        let state = sim.page().scroll_state();
        let active = if state.active_section_id.is_empty() {
            "(none)"
        } else {
            state.active_section_id.as_str()
        };
        println!(
            "\nFinal: scroll_y={} active={} pending_timers={}",
            state.scroll_y,
            active,
            sim.page().scheduler().pending()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::StateFlag;

    const PAGE: &str = r##"
        navbar = "navbar"
        back_to_top = "top"
        hero = "hero"
        end_ms = 6000

        [viewport]
        height = 800.0

        [[sections]]
        id = "home"
        top = 0.0
        height = 900.0

        [[sections]]
        id = "skills"
        top = 900.0
        height = 900.0

        [[links]]
        name = "nav-home"
        href = "#home"

        [[links]]
        name = "nav-skills"
        href = "#skills"

        [[counters]]
        name = "years"
        value = "5"
        rect = { y = 1200.0, width = 200.0, height = 100.0 }

        [[progress_bars]]
        name = "rust"
        value = "85"
        rect = { y = 1500.0, width = 400.0, height = 10.0 }

        [[steps]]
        at_ms = 100
        scroll_y = 1000.0

        [[steps]]
        at_ms = 3000
        scroll_y = 0.0

        [[steps]]
        at_ms = 4000
        scroll_y = 1000.0
    "##;

    fn texts(entries: &[TimelineEntry], name: &str) -> Vec<String> {
        entries
            .iter()
            .filter(|e| e.name == name)
            .filter_map(|e| match &e.change {
                Change::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn run_all(sim: &mut Simulation, scenario: &Scenario) -> Vec<TimelineEntry> {
        let mut all = sim.start();
        for step in &scenario.steps {
            all.extend(sim.step(step));
        }
        all.extend(sim.advance_to(scenario.end_ms()));
        all
    }

    #[test]
    fn test_full_replay() {
        let scenario = Scenario::parse(PAGE).unwrap();
        let mut sim = Simulation::new(&scenario, &SiteConfig::default());
        let all = run_all(&mut sim, &scenario);

        // Counter ran exactly once despite the second visit
        let years = texts(&all, "years");
        assert_eq!(years.last().map(String::as_str), Some("5"));
        let mut sorted = years.clone();
        sorted.sort_by_key(|t| t.parse::<u64>().unwrap());
        assert_eq!(years, sorted);

        // Bar filled 200ms after it became visible at t=100
        let fill = all
            .iter()
            .find(|e| e.name == "rust" && matches!(e.change, Change::Width { .. }))
            .unwrap();
        assert_eq!(fill.at_ms, 300);

        let pres = sim.page().presentation();
        assert_eq!(sim.page().scroll_state().active_section_id, "skills");
        assert!(pres.has_flag(folio_core::ElementId(0), StateFlag::Scrolled));
        assert_eq!(sim.page().scheduler().pending(), 0);
    }

    #[test]
    fn test_sections_reveal_once() {
        let scenario = Scenario::parse(PAGE).unwrap();
        let mut sim = Simulation::new(&scenario, &SiteConfig::default());
        let all = run_all(&mut sim, &scenario);

        let reveals = all
            .iter()
            .filter(|e| {
                matches!(
                    e.change,
                    Change::Flag {
                        flag: StateFlag::Revealed,
                        ..
                    }
                )
            })
            .count();
        assert_eq!(reveals, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_realtime_run_sleeps_through_timeline() {
        let path = std::env::temp_dir().join(format!("folio-scenario-{}.toml", std::process::id()));
        std::fs::write(&path, PAGE).unwrap();

        let started = tokio::time::Instant::now();
        run(&path, &SiteConfig::default(), true, true).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(6000));

        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_missing_scenario_is_an_error() {
        let path = std::env::temp_dir().join("folio-no-such-scenario.toml");
        let err = run(&path, &SiteConfig::default(), false, false)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("loading scenario"));
    }
}
