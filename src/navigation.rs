use dioxus::prelude::*;

use crate::config::RuntimeConfig;
use crate::dom;
#[cfg(target_arch = "wasm32")]
use crate::dom::ListenerHandle;

pub const NAV_MENU_ID: &str = "nav-menu";
pub const NAV_TOGGLE_ID: &str = "nav-toggle";
pub const NAV_CLOSE_ID: &str = "nav-close";
pub const HOME_SECTION: &str = "home";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub target: &'static str,
}

impl NavLink {
    pub fn href(&self) -> String {
        format!("#{}", self.target)
    }
}

pub const SITE_LINKS: [NavLink; 5] = [
    NavLink { label: "Home", target: HOME_SECTION },
    NavLink { label: "About", target: "about" },
    NavLink { label: "Services", target: "services" },
    NavLink { label: "Results", target: "stats" },
    NavLink { label: "Contact", target: "contact" },
];

/// Where a same-page reference points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnchorTarget {
    Top,
    Section(String),
}

/// `#` or an empty href means the top of the page; `#id` names a section.
/// Anything else is not a same-page reference.
pub fn resolve_anchor(href: &str) -> Option<AnchorTarget> {
    let href = href.trim();
    if href.is_empty() || href == "#" {
        return Some(AnchorTarget::Top);
    }
    let id = href.strip_prefix('#')?;
    if id.chars().any(char::is_whitespace) {
        return None;
    }
    Some(AnchorTarget::Section(id.to_string()))
}

/// Scroll offset that puts a section's top just below the fixed header.
pub fn scroll_target(section_top: f64, header_height: f64) -> f64 {
    (section_top - header_height).max(0.0)
}

#[derive(Clone, Debug, PartialEq)]
pub struct SectionBounds {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

impl SectionBounds {
    fn contains(&self, scroll_y: f64, header_height: f64, lookahead: f64) -> bool {
        scroll_y >= self.top - header_height - lookahead && scroll_y < self.top + self.height
    }
}

/// Section the reader is in; sections overlap only at boundaries, where the
/// last one in document order wins.
pub fn active_section(
    sections: &[SectionBounds],
    scroll_y: f64,
    header_height: f64,
    lookahead: f64,
) -> Option<&str> {
    sections
        .iter()
        .filter(|section| section.contains(scroll_y, header_height, lookahead))
        .last()
        .map(|section| section.id.as_str())
}

#[derive(Clone, Debug, PartialEq)]
pub struct NavLinkSet {
    links: Vec<NavLink>,
    active: Option<usize>,
}

impl NavLinkSet {
    pub fn new(links: impl Into<Vec<NavLink>>) -> Self {
        Self {
            links: links.into(),
            active: None,
        }
    }

    pub fn links(&self) -> &[NavLink] {
        &self.links
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.active == Some(index)
    }

    pub fn active_target(&self) -> Option<&'static str> {
        self.active
            .and_then(|index| self.links.get(index))
            .map(|link| link.target)
    }

    /// Marks `index` as the only active link. Out-of-range indexes change nothing.
    pub fn mark_active(&mut self, index: usize) -> bool {
        if index >= self.links.len() {
            return false;
        }
        self.active = Some(index);
        true
    }

    /// Marks the link pointing at `target`; clears every mark when no link does.
    pub fn mark_target(&mut self, target: &str) {
        self.active = self.links.iter().position(|link| link.target == target);
    }

    /// Decides what activating the link at `index` does, given the header
    /// height and a way to find a section's top offset.
    pub fn plan_activation<F>(&self, index: usize, header_height: f64, section_top: F) -> Activation
    where
        F: Fn(&str) -> Option<f64>,
    {
        let Some(link) = self.links.get(index) else {
            return Activation::Ignored;
        };
        match resolve_anchor(&link.href()) {
            Some(AnchorTarget::Top) => Activation::Scroll { offset: 0.0, index },
            Some(AnchorTarget::Section(id)) => match section_top(&id) {
                Some(top) => Activation::Scroll {
                    offset: scroll_target(top, header_height),
                    index,
                },
                None => Activation::Missing(id),
            },
            None => Activation::Ignored,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Activation {
    Scroll { offset: f64, index: usize },
    Missing(String),
    Ignored,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MobileMenu {
    open: bool,
}

impl MobileMenu {
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Returns true when the menu was closed before.
    pub fn open(&mut self) -> bool {
        !std::mem::replace(&mut self.open, true)
    }

    /// Returns true when the menu was open before.
    pub fn close(&mut self) -> bool {
        std::mem::replace(&mut self.open, false)
    }

    pub fn should_close_on_click(&self, inside_menu: bool, inside_toggle: bool) -> bool {
        self.open && !inside_menu && !inside_toggle
    }

    pub fn should_close_on_key(&self, key: &str) -> bool {
        self.open && key == "Escape"
    }
}

/// Scroll-tracked navigation state shared between the header and the page.
#[derive(Clone, Copy)]
pub struct NavState {
    pub links: Signal<NavLinkSet>,
    pub menu: Signal<MobileMenu>,
}

impl NavState {
    pub fn new(links: Signal<NavLinkSet>, menu: Signal<MobileMenu>) -> Self {
        Self { links, menu }
    }

    pub fn open_menu(&mut self) {
        if self.menu.write().open() {
            dom::set_scroll_locked(true);
            tracing::debug!("navigation: mobile menu opened");
        }
    }

    pub fn close_menu(&mut self, reason: &str) {
        if self.menu.write().close() {
            dom::set_scroll_locked(false);
            tracing::debug!("navigation: mobile menu closed ({reason})");
        }
    }

    /// Handles activation of the link at `index`.
    pub fn activate(&mut self, index: usize, header_fallback: f64) {
        self.close_menu("link");
        let header = dom::header_height().unwrap_or(header_fallback);
        let plan = self.links.peek().plan_activation(index, header, dom::section_top);
        match plan {
            Activation::Scroll { offset, index } => {
                tracing::debug!("navigation: scrolling to {offset}");
                dom::smooth_scroll_to(offset);
                self.links.write().mark_active(index);
            }
            Activation::Missing(id) => {
                tracing::warn!("navigation: target section not found: #{id}");
            }
            Activation::Ignored => {}
        }
    }

    /// Recomputes the active link from the current layout.
    pub fn track_scroll(&mut self, scroll_y: f64, config: &RuntimeConfig) {
        let sections = dom::section_bounds();
        let header = dom::header_height().unwrap_or(config.header_fallback_height);
        let Some(id) = active_section(&sections, scroll_y, header, config.section_lookahead) else {
            return;
        };
        if self.links.peek().active_target() != Some(id) {
            self.links.write().mark_target(id);
        }
    }
}

#[cfg(target_arch = "wasm32")]
struct MenuListeners {
    _click: ListenerHandle,
    _keydown: ListenerHandle,
}

#[component]
pub fn SiteHeader(scrolled: bool, children: Element) -> Element {
    let header_fallback = use_context::<RuntimeConfig>().header_fallback_height;
    let mut nav = use_context::<NavState>();
    #[cfg(target_arch = "wasm32")]
    let mut listeners = use_signal(|| None::<MenuListeners>);

    #[cfg(target_arch = "wasm32")]
    use_effect(move || {
        if listeners.peek().is_some() {
            return;
        }
        let Some(document) = dom::document_target() else {
            return;
        };
        let mut on_click_nav = nav;
        let click = dom::listen(&document, "click", move |event| {
            let menu = *on_click_nav.menu.peek();
            let inside_menu = dom::event_within(&event, &[NAV_MENU_ID]);
            let inside_toggle = dom::event_within(&event, &[NAV_TOGGLE_ID]);
            if menu.should_close_on_click(inside_menu, inside_toggle) {
                on_click_nav.close_menu("outside click");
            }
        });
        let mut on_key_nav = nav;
        let keydown = dom::listen(&document, "keydown", move |event| {
            use wasm_bindgen::JsCast;
            let Some(event) = event.dyn_ref::<web_sys::KeyboardEvent>() else {
                return;
            };
            if on_key_nav.menu.peek().should_close_on_key(&event.key()) {
                on_key_nav.close_menu("escape");
            }
        });
        match (click, keydown) {
            (Ok(click), Ok(keydown)) => {
                tracing::info!(
                    "navigation: initialized with {} links",
                    nav.links.peek().links().len()
                );
                listeners.set(Some(MenuListeners {
                    _click: click,
                    _keydown: keydown,
                }));
            }
            (Err(message), _) | (_, Err(message)) => {
                tracing::error!("navigation: {message}");
            }
        }
    });

    let links = nav.links.read().links().to_vec();
    let menu_open = nav.menu.read().is_open();
    let header_class = if scrolled { "header header--scrolled" } else { "header" };
    let menu_class = if menu_open { "nav__menu show" } else { "nav__menu" };

    rsx! {
        header { id: dom::HEADER_ID, class: header_class,
            nav { class: "nav container",
                a {
                    class: "nav__logo",
                    href: "#",
                    onclick: move |event| {
                        event.prevent_default();
                        nav.activate(0, header_fallback);
                    },
                    "RDG & Associates"
                }
                div { id: NAV_MENU_ID, class: menu_class,
                    ul { class: "nav__list",
                        for (index, link) in links.into_iter().enumerate() {
                            li { key: "{link.target}", class: "nav__item",
                                a {
                                    class: if nav.links.read().is_active(index) { "nav__link active" } else { "nav__link" },
                                    href: link.href(),
                                    onclick: move |event| {
                                        event.prevent_default();
                                        event.stop_propagation();
                                        nav.activate(index, header_fallback);
                                    },
                                    "{link.label}"
                                }
                            }
                        }
                    }
                    button {
                        id: NAV_CLOSE_ID,
                        r#type: "button",
                        class: "nav__close",
                        aria_label: "Close menu",
                        onclick: move |event| {
                            event.prevent_default();
                            event.stop_propagation();
                            nav.close_menu("close button");
                        },
                        "✕"
                    }
                }
                div { class: "nav__actions",
                    {children}
                    button {
                        id: NAV_TOGGLE_ID,
                        r#type: "button",
                        class: "nav__toggle",
                        aria_label: "Open menu",
                        aria_expanded: "{menu_open}",
                        onclick: move |event| {
                            event.prevent_default();
                            event.stop_propagation();
                            nav.open_menu();
                        },
                        "☰"
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sections() -> Vec<SectionBounds> {
        vec![
            SectionBounds { id: "home".to_string(), top: 0.0, height: 700.0 },
            SectionBounds { id: "about".to_string(), top: 700.0, height: 600.0 },
            SectionBounds { id: "services".to_string(), top: 1300.0, height: 900.0 },
            SectionBounds { id: "contact".to_string(), top: 2200.0, height: 800.0 },
        ]
    }

    #[test]
    fn resolves_same_page_references() {
        assert_eq!(resolve_anchor("#"), Some(AnchorTarget::Top));
        assert_eq!(resolve_anchor(""), Some(AnchorTarget::Top));
        assert_eq!(
            resolve_anchor("#services"),
            Some(AnchorTarget::Section("services".to_string()))
        );
        assert_eq!(resolve_anchor("/privacy"), None);
        assert_eq!(resolve_anchor("#two words"), None);
    }

    #[test]
    fn scroll_target_sits_below_header_and_never_negative() {
        assert_eq!(scroll_target(1300.0, 80.0), 1220.0);
        assert_eq!(scroll_target(40.0, 80.0), 0.0);
    }

    #[test]
    fn marking_a_link_clears_the_others() {
        let mut links = NavLinkSet::new(SITE_LINKS);
        assert!(links.mark_active(2));
        assert!(links.mark_active(4));
        let active: Vec<usize> = (0..links.links().len())
            .filter(|index| links.is_active(*index))
            .collect();
        assert_eq!(active, vec![4]);
        assert_eq!(links.active_target(), Some("contact"));
    }

    #[test]
    fn out_of_range_link_keeps_current_mark() {
        let mut links = NavLinkSet::new(SITE_LINKS);
        links.mark_active(1);
        assert!(!links.mark_active(42));
        assert_eq!(links.active(), Some(1));
    }

    #[test]
    fn marking_unknown_target_clears_every_link() {
        let mut links = NavLinkSet::new(SITE_LINKS);
        links.mark_target("services");
        assert_eq!(links.active(), Some(2));
        links.mark_target("footer");
        assert_eq!(links.active(), None);
    }

    fn layout(id: &str) -> Option<f64> {
        sections()
            .into_iter()
            .find(|section| section.id == id)
            .map(|section| section.top)
    }

    #[test]
    fn activation_scrolls_to_existing_section() {
        let mut links = NavLinkSet::new(SITE_LINKS);
        let plan = links.plan_activation(2, 80.0, layout);
        assert_eq!(plan, Activation::Scroll { offset: 1220.0, index: 2 });
        if let Activation::Scroll { index, .. } = plan {
            links.mark_active(index);
        }
        let active: Vec<usize> = (0..links.links().len())
            .filter(|index| links.is_active(*index))
            .collect();
        assert_eq!(active, vec![2]);
    }

    #[test]
    fn home_link_scrolls_to_top() {
        let links = NavLinkSet::new([NavLink { label: "Top", target: "" }]);
        assert_eq!(
            links.plan_activation(0, 80.0, |_| None),
            Activation::Scroll { offset: 0.0, index: 0 }
        );
    }

    #[test]
    fn activation_of_missing_section_changes_nothing() {
        let mut links = NavLinkSet::new(SITE_LINKS);
        links.mark_active(1);
        // "stats" is not part of the layout above.
        let plan = links.plan_activation(3, 80.0, layout);
        assert_eq!(plan, Activation::Missing("stats".to_string()));
        assert_eq!(links.active(), Some(1));
        assert_eq!(links.plan_activation(9, 80.0, layout), Activation::Ignored);
    }

    #[test]
    fn active_section_uses_header_and_lookahead() {
        let sections = sections();
        assert_eq!(active_section(&sections, 0.0, 80.0, 100.0), Some("home"));
        // 700 - 80 - 100 = 520 is where "about" starts matching.
        assert_eq!(active_section(&sections, 519.0, 80.0, 100.0), Some("home"));
        assert_eq!(active_section(&sections, 900.0, 80.0, 100.0), Some("about"));
        assert_eq!(active_section(&sections, 2500.0, 80.0, 100.0), Some("contact"));
    }

    #[test]
    fn overlapping_sections_resolve_to_the_later_one() {
        let sections = sections();
        // 520..700 lies inside both "home" and the lookahead band of "about".
        assert_eq!(active_section(&sections, 600.0, 80.0, 100.0), Some("about"));
    }

    #[test]
    fn no_section_past_the_end() {
        assert_eq!(active_section(&sections(), 5000.0, 80.0, 100.0), None);
        assert_eq!(active_section(&[], 0.0, 80.0, 100.0), None);
    }

    #[test]
    fn menu_open_close_report_transitions() {
        let mut menu = MobileMenu::default();
        assert!(!menu.close());
        assert!(menu.open());
        assert!(!menu.open());
        assert!(menu.is_open());
        assert!(menu.close());
        assert!(!menu.is_open());
    }

    #[test]
    fn outside_click_closes_only_an_open_menu() {
        let mut menu = MobileMenu::default();
        assert!(!menu.should_close_on_click(false, false));
        menu.open();
        assert!(menu.should_close_on_click(false, false));
        assert!(!menu.should_close_on_click(true, false));
        assert!(!menu.should_close_on_click(false, true));
    }

    #[test]
    fn escape_closes_an_open_menu() {
        let mut menu = MobileMenu::default();
        assert!(!menu.should_close_on_key("Escape"));
        menu.open();
        assert!(menu.should_close_on_key("Escape"));
        assert!(!menu.should_close_on_key("Enter"));
    }
}
