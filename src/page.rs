use dioxus::prelude::*;

use crate::chrome::{header_scrolled, BackToTop, LazyImage, ThemeToggle};
use crate::config::{use_runtime_config, RuntimeConfig};
use crate::contact::ContactSection;
#[cfg(target_arch = "wasm32")]
use crate::diagnostics;
use crate::dom;
use crate::navigation::{MobileMenu, NavLinkSet, NavState, SiteHeader, SITE_LINKS};
use crate::reveal::{Counter, RevealCard, RevealSection, StaggerItem};

const MAIN_CSS: Asset = asset!("/assets/main.css");

const SERVICES: [(&str, &str); 4] = [
    (
        "Tax Planning",
        "Year-round planning that keeps filings clean and surprises rare.",
    ),
    (
        "Bookkeeping",
        "Monthly books closed on time, reconciled and ready for review.",
    ),
    (
        "Audit Support",
        "Preparation and representation from the first request to the final letter.",
    ),
    (
        "Advisory",
        "Cash-flow forecasts and growth plans grounded in your own numbers.",
    ),
];

const STATS: [(&str, &str, &str); 4] = [
    ("250", "+", "Clients served"),
    ("15", "", "Years in practice"),
    ("98", "%", "Client retention"),
    ("1200", "+", "Returns filed"),
];

#[component]
pub fn App() -> Element {
    let config_resource = use_runtime_config();

    rsx! {
        document::Title { "RDG & Associates" }
        document::Link { rel: "stylesheet", href: MAIN_CSS }
        {
            match config_resource() {
                None => rsx! {
                    div { class: "page loading",
                        p { "Loading..." }
                    }
                },
                Some(config) => rsx! {
                    Site { config: config }
                },
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
struct PageListeners {
    _scroll: Option<dom::ListenerHandle>,
    _errors: Option<dom::ListenerHandle>,
}

#[component]
fn Site(config: RuntimeConfig) -> Element {
    let config = use_context_provider(|| config);
    let links = use_signal(|| NavLinkSet::new(SITE_LINKS));
    let menu = use_signal(MobileMenu::default);
    let nav = use_context_provider(|| NavState::new(links, menu));
    let mut scroll_y = use_signal(dom::scroll_y);

    #[cfg(target_arch = "wasm32")]
    let mut listeners = use_signal(|| None::<PageListeners>);

    let tracked_config = config.clone();
    use_effect(move || {
        let mut nav = nav;
        let y = dom::scroll_y();
        scroll_y.set(y);
        nav.track_scroll(y, &tracked_config);

        #[cfg(target_arch = "wasm32")]
        {
            if listeners.peek().is_some() {
                return;
            }
            let scroll = match watch_scroll(scroll_y, nav, tracked_config.clone()) {
                Ok(handle) => Some(handle),
                Err(message) => {
                    tracing::error!("page: scroll tracking unavailable: {message}");
                    None
                }
            };
            let errors = match diagnostics::install_error_logger() {
                Ok(handle) => Some(handle),
                Err(message) => {
                    tracing::warn!("page: error logging unavailable: {message}");
                    None
                }
            };
            listeners.set(Some(PageListeners {
                _scroll: scroll,
                _errors: errors,
            }));
            diagnostics::probe().log();
        }
    });

    let scrolled = header_scrolled(scroll_y(), config.header_scrolled_offset);

    rsx! {
        SiteHeader { scrolled: scrolled,
            ThemeToggle {}
        }
        main { class: "main",
            Hero {}
            About {}
            Services {}
            Stats {}
            RevealSection { id: "contact", class: "contact",
                div { class: "container",
                    StaggerItem { index: 0,
                        h2 { class: "section__title", "Get in Touch" }
                    }
                    StaggerItem { index: 1,
                        p { class: "section__subtitle",
                            "Tell us what you need and we will reply within one business day."
                        }
                    }
                    ContactSection {}
                }
            }
        }
        footer { class: "footer",
            div { class: "container",
                p { "© RDG & Associates. All rights reserved." }
            }
        }
        BackToTop { scroll_y: scroll_y() }
    }
}

/// Throttled window scroll listener: one layout read per animation frame.
#[cfg(target_arch = "wasm32")]
fn watch_scroll(
    scroll_y: Signal<f64>,
    nav: NavState,
    config: RuntimeConfig,
) -> Result<dom::ListenerHandle, String> {
    use crate::chrome::ScrollThrottle;
    use std::cell::RefCell;
    use std::rc::Rc;

    let window = dom::window_target().ok_or_else(|| "no window to watch".to_string())?;
    let throttle = Rc::new(RefCell::new(ScrollThrottle::default()));
    let frame = Rc::new(RefCell::new(None));
    dom::listen(&window, "scroll", move |_| {
        if !throttle.borrow_mut().request() {
            return;
        }
        let throttle = Rc::clone(&throttle);
        let config = config.clone();
        let mut scroll_y = scroll_y;
        let mut nav = nav;
        let handle = dom::next_frame(move || {
            throttle.borrow_mut().settle();
            let y = dom::scroll_y();
            scroll_y.set(y);
            nav.track_scroll(y, &config);
        });
        *frame.borrow_mut() = Some(handle);
    })
}

#[component]
fn Hero() -> Element {
    let mut nav = use_context::<NavState>();
    let header_fallback = use_context::<RuntimeConfig>().header_fallback_height;
    let contact_index = SITE_LINKS
        .iter()
        .position(|link| link.target == "contact")
        .unwrap_or(0);

    rsx! {
        RevealSection { id: "home", class: "hero",
            div { class: "container hero__content",
                StaggerItem { index: 0,
                    h1 { class: "hero__title", "Numbers you can build on" }
                }
                StaggerItem { index: 1,
                    p { class: "hero__subtitle",
                        "Accounting, tax and advisory for growing businesses."
                    }
                }
                StaggerItem { index: 2,
                    a {
                        class: "btn btn--primary",
                        href: "#contact",
                        onclick: move |event| {
                            event.prevent_default();
                            nav.activate(contact_index, header_fallback);
                        },
                        "Book a consultation"
                    }
                }
            }
        }
    }
}

#[component]
fn About() -> Element {
    rsx! {
        RevealSection { id: "about", class: "about",
            div { class: "container about__grid",
                div { class: "about__text",
                    StaggerItem { index: 0,
                        h2 { class: "section__title", "About Us" }
                    }
                    StaggerItem { index: 1,
                        p {
                            "RDG & Associates is an independent practice serving owners who want "
                            "clear books and straight answers."
                        }
                    }
                }
                LazyImage {
                    src: "/assets/team.jpg",
                    alt: "The RDG & Associates team",
                    class: "about__image",
                }
            }
        }
    }
}

#[component]
fn Services() -> Element {
    rsx! {
        RevealSection { id: "services", class: "services",
            div { class: "container",
                StaggerItem { index: 0,
                    h2 { class: "section__title", "Services" }
                }
                div { class: "services__grid",
                    for (index, (title, blurb)) in SERVICES.into_iter().enumerate() {
                        RevealCard { key: "{title}", index: index,
                            h3 { class: "card__title", "{title}" }
                            p { class: "card__text", "{blurb}" }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn Stats() -> Element {
    rsx! {
        RevealSection { id: "stats", class: "stats",
            div { class: "container stats__grid",
                for (target, suffix, label) in STATS {
                    Counter {
                        key: "{label}",
                        target: target.to_string(),
                        label: label.to_string(),
                        suffix: suffix.to_string(),
                    }
                }
            }
        }
    }
}
