use dioxus::prelude::*;
#[cfg(target_arch = "wasm32")]
use gloo_storage::{LocalStorage, Storage};

use crate::config::RuntimeConfig;
use crate::dom;
use crate::navigation::{NavState, HOME_SECTION};
use crate::reveal::{use_one_shot_observer, ObserveOptions};

pub const THEME_STORAGE_KEY: &str = "rdg-theme";
pub const BACK_TO_TOP_ID: &str = "back-to-top";

pub fn header_scrolled(scroll_y: f64, threshold: f64) -> bool {
    scroll_y > threshold
}

pub fn back_to_top_visible(scroll_y: f64, threshold: f64) -> bool {
    scroll_y > threshold
}

/// Lets at most one scroll update run per animation frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScrollThrottle {
    pending: bool,
}

impl ScrollThrottle {
    /// True when the caller should schedule a frame; false while one is queued.
    pub fn request(&mut self) -> bool {
        !std::mem::replace(&mut self.pending, true)
    }

    /// Called from the frame callback before doing the work.
    pub fn settle(&mut self) {
        self.pending = false;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    /// A stored choice wins; otherwise follow the OS preference.
    pub fn resolve(stored: Option<&str>, prefers_dark: bool) -> Self {
        stored.and_then(Theme::parse).unwrap_or(if prefers_dark {
            Theme::Dark
        } else {
            Theme::Light
        })
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Toggle button caption: the theme a click switches to.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Theme::Light => "🌙 Theme",
            Theme::Dark => "☀️ Theme",
        }
    }
}

// Stored as the bare string rather than JSON so the value stays "light"/"dark".
#[cfg(target_arch = "wasm32")]
fn load_theme_preference() -> Option<String> {
    LocalStorage::raw().get_item(THEME_STORAGE_KEY).ok().flatten()
}

#[cfg(target_arch = "wasm32")]
fn save_theme_preference(theme: Theme) {
    if LocalStorage::raw()
        .set_item(THEME_STORAGE_KEY, theme.as_str())
        .is_err()
    {
        tracing::warn!("chrome: theme preference not persisted");
    }
}

fn initial_theme() -> Theme {
    #[cfg(target_arch = "wasm32")]
    {
        Theme::resolve(load_theme_preference().as_deref(), dom::prefers_dark_scheme())
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        Theme::resolve(None, dom::prefers_dark_scheme())
    }
}

#[component]
pub fn ThemeToggle() -> Element {
    let mut theme = use_signal(initial_theme);

    use_effect(move || {
        let current = theme();
        dom::apply_theme(current);
        tracing::debug!("chrome: theme {}", current.as_str());
    });

    rsx! {
        button {
            id: "themeToggle",
            r#type: "button",
            class: "theme-toggle",
            aria_label: "Toggle color theme",
            onclick: move |_| {
                let next = theme.peek().toggled();
                theme.set(next);
                #[cfg(target_arch = "wasm32")]
                save_theme_preference(next);
            },
            "{theme().toggle_label()}"
        }
    }
}

#[component]
pub fn BackToTop(scroll_y: f64) -> Element {
    let threshold = use_context::<RuntimeConfig>().back_to_top_offset;
    let mut nav = use_context::<NavState>();
    let class = if back_to_top_visible(scroll_y, threshold) {
        "back-to-top show"
    } else {
        "back-to-top"
    };

    rsx! {
        button {
            id: BACK_TO_TOP_ID,
            r#type: "button",
            class: class,
            title: "Back to top",
            aria_label: "Back to top",
            onclick: move |event| {
                event.prevent_default();
                event.stop_propagation();
                dom::smooth_scroll_to(0.0);
                nav.links.write().mark_target(HOME_SECTION);
                tracing::debug!("chrome: back to top");
            },
            "↑"
        }
    }
}

/// Image whose real source is set only once it nears the viewport.
#[component]
pub fn LazyImage(src: String, alt: String, #[props(default)] class: String) -> Element {
    let observer = use_one_shot_observer(ObserveOptions::LAZY_IMAGE);
    let loaded = observer.has_fired();

    if loaded {
        rsx! {
            img { class: "{class}", src: "{src}", alt: "{alt}" }
        }
    } else {
        rsx! {
            img {
                class: "{class} lazy",
                "data-src": "{src}",
                alt: "{alt}",
                onmounted: move |event| observer.attach(event),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn back_to_top_toggles_exactly_at_threshold() {
        let threshold = 500.0;
        let going_down: Vec<bool> = [499.0, 500.0, 500.5, 900.0]
            .iter()
            .map(|y| back_to_top_visible(*y, threshold))
            .collect();
        assert_eq!(going_down, vec![false, false, true, true]);
        let going_up: Vec<bool> = [900.0, 500.5, 500.0, 0.0]
            .iter()
            .map(|y| back_to_top_visible(*y, threshold))
            .collect();
        assert_eq!(going_up, vec![true, true, false, false]);
    }

    #[test]
    fn header_switches_past_100() {
        assert!(!header_scrolled(100.0, 100.0));
        assert!(header_scrolled(101.0, 100.0));
    }

    #[test]
    fn throttle_ignores_events_until_frame_runs() {
        let mut throttle = ScrollThrottle::default();
        let scheduled: Vec<bool> = (0..4).map(|_| throttle.request()).collect();
        assert_eq!(scheduled, vec![true, false, false, false]);
        throttle.settle();
        assert!(throttle.request());
    }

    #[test]
    fn stored_theme_beats_os_preference() {
        assert_eq!(Theme::resolve(Some("light"), true), Theme::Light);
        assert_eq!(Theme::resolve(Some("dark"), false), Theme::Dark);
    }

    #[test]
    fn unknown_stored_theme_falls_back_to_os_preference() {
        assert_eq!(Theme::resolve(Some("sepia"), true), Theme::Dark);
        assert_eq!(Theme::resolve(None, false), Theme::Light);
    }

    #[test]
    fn toggling_flips_and_relabels() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled().toggled(), Theme::Dark);
        assert_eq!(Theme::Light.toggle_label(), "🌙 Theme");
        assert_eq!(Theme::parse(Theme::Dark.as_str()), Some(Theme::Dark));
    }
}
