use super::parse_selector;
use crate::config::ShortcutsConfig;
use bus::HostCommand;
use html::Node;
use html::select::select_first;

/// Alt+S focuses the search box, Alt+H goes home. Returns true when the key was consumed.
pub fn on_key_down(
    dom: &Node,
    key: char,
    alt: bool,
    config: &ShortcutsConfig,
    commands: &mut Vec<HostCommand>,
) -> bool {
    if !config.enabled || !alt {
        return false;
    }
    match key {
        's' => {
            let input = parse_selector(&config.search_selector)
                .and_then(|selector| select_first(dom, &selector).map(|n| n.id()));
            match input {
                Some(target) => commands.push(HostCommand::Focus { target }),
                None => log::debug!(target: "enhance.keys", "no search input to focus"),
            }
            true
        }
        'h' => {
            commands.push(HostCommand::Navigate {
                url: config.home_url.clone(),
            });
            true
        }
        _ => false,
    }
}
