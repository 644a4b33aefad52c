use bus::VisibilityEvent;
use core_types::HeadingId;
use enhance::toc::{ActiveSectionSync, HeadingRegistry, Highlighter, NavigationIndex};
use html::Id;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;

const FORMAT: &str = "sync-scenarios-v1";

#[derive(Debug, Deserialize)]
struct Manifest {
    format: String,
    scenario: Vec<Scenario>,
}

#[derive(Debug, Deserialize)]
struct Scenario {
    name: String,
    headings: Vec<String>,
    nav: Vec<String>,
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct Step {
    events: Vec<String>,
    expect: Option<String>,
    swaps: usize,
}

/// Tracks which anchors are highlighted, as the DOM would.
#[derive(Default)]
struct Anchors {
    active: BTreeSet<Id>,
}

impl Highlighter for Anchors {
    fn set_active(&mut self, anchor: Id, active: bool) {
        if active {
            self.active.insert(anchor);
        } else {
            self.active.remove(&anchor);
        }
    }
}

fn load_manifest() -> Manifest {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sync_scenarios.toml");
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("failed to read scenarios {path:?}: {err}"));
    let manifest: Manifest = toml::from_str(&content)
        .unwrap_or_else(|err| panic!("failed to parse scenarios {path:?}: {err}"));
    assert_eq!(manifest.format, FORMAT, "unsupported scenario format in {path:?}");
    manifest
}

fn parse_event(event: &str, at: u64) -> VisibilityEvent {
    let (sign, id) = event.split_at(1);
    let is_intersecting = match sign {
        "+" => true,
        "-" => false,
        _ => panic!("event {event:?} must start with + or -"),
    };
    VisibilityEvent {
        heading: HeadingId::new(id),
        is_intersecting,
        ratio: if is_intersecting { 1.0 } else { 0.0 },
        at,
    }
}

#[test]
fn scenarios_resolve_expected_sections() {
    let manifest = load_manifest();
    assert!(!manifest.scenario.is_empty());

    for scenario in &manifest.scenario {
        let registry = HeadingRegistry::from_ids(scenario.headings.iter().map(String::as_str));
        let index = NavigationIndex::from_entries(scenario.nav.iter().map(String::as_str));
        let mut sync = ActiveSectionSync::new(registry, index);
        let mut anchors = Anchors::default();
        assert!(sync.start(&mut anchors), "{}: did not start", scenario.name);

        for (i, step) in scenario.steps.iter().enumerate() {
            let at = (i as u64 + 1) * 100;
            let batch: Vec<_> = step.events.iter().map(|e| parse_event(e, at)).collect();
            sync.apply_batch(&batch, &mut anchors);

            let ctx = format!("{} step {}", scenario.name, i + 1);
            assert_eq!(
                sync.active().map(HeadingId::as_str),
                step.expect.as_deref(),
                "{ctx}: active section"
            );
            assert_eq!(sync.swap_count(), step.swaps, "{ctx}: swap count");
            assert!(anchors.active.len() <= 1, "{ctx}: more than one anchor highlighted");
            assert_eq!(sync.index().active_count(), anchors.active.len(), "{ctx}");
            if let Some(expect) = &step.expect {
                let entry = sync.index().lookup(&HeadingId::new(expect)).unwrap();
                assert!(anchors.active.contains(&entry.node), "{ctx}: wrong anchor lit");
            }
        }
    }
}
