use dioxus::prelude::*;
#[cfg(target_arch = "wasm32")]
use dioxus::web::WebEventExt;
#[cfg(target_arch = "wasm32")]
use gloo_timers::future::TimeoutFuture;

use crate::config::RuntimeConfig;
#[cfg(target_arch = "wasm32")]
use crate::dom;

pub const STAGGER_STEP_MS: u32 = 120;
pub const CARD_DELAY_STEP_MS: u32 = 100;

/// Intersection settings: the visible fraction that counts as "seen" and the
/// margin applied to the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObserveOptions {
    pub threshold: f64,
    pub root_margin: &'static str,
}

impl ObserveOptions {
    pub const SECTION: Self = Self {
        threshold: 0.1,
        root_margin: "0px 0px -100px 0px",
    };
    pub const CARD: Self = Self {
        threshold: 0.1,
        root_margin: "0px 0px -50px 0px",
    };
    pub const COUNTER: Self = Self {
        threshold: 0.5,
        root_margin: "0px 0px -50px 0px",
    };
    pub const LAZY_IMAGE: Self = Self {
        threshold: 0.0,
        root_margin: "100px 0px",
    };
}

/// A flag that can be raised once per page load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OneShot {
    fired: bool,
}

impl OneShot {
    /// Returns true only for the first call.
    pub fn fire(&mut self) -> bool {
        !std::mem::replace(&mut self.fired, true)
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }
}

pub fn stagger_delay_ms(index: usize) -> u32 {
    u32::try_from(index)
        .unwrap_or(u32::MAX)
        .saturating_mul(STAGGER_STEP_MS)
}

/// A staggered child starts its delay once its parent has revealed, and only once.
pub fn should_show(parent_revealed: bool, already_shown: bool) -> bool {
    parent_revealed && !already_shown
}

pub fn parse_counter_target(raw: &str) -> u64 {
    raw.trim().parse().unwrap_or(0)
}

/// Time-based ramp from 0 to `target`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CounterAnimation {
    target: u64,
    duration_ms: f64,
}

impl CounterAnimation {
    pub fn new(target: u64, duration_ms: f64) -> Self {
        Self {
            target,
            duration_ms,
        }
    }

    pub fn progress(&self, elapsed_ms: f64) -> f64 {
        if self.duration_ms.is_nan() || self.duration_ms <= 0.0 {
            return 1.0;
        }
        (elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
    }

    pub fn value_at(&self, elapsed_ms: f64) -> u64 {
        let progress = self.progress(elapsed_ms);
        if progress >= 1.0 {
            return self.target;
        }
        ((self.target as f64) * progress).floor() as u64
    }

    pub fn is_finished(&self, elapsed_ms: f64) -> bool {
        self.progress(elapsed_ms) >= 1.0
    }
}

/// An element watched until it first becomes visible.
#[derive(Clone, Copy)]
pub struct OneShotObserver {
    shot: Signal<OneShot>,
    #[cfg(target_arch = "wasm32")]
    target: Signal<Option<web_sys::Element>>,
}

impl OneShotObserver {
    pub fn has_fired(&self) -> bool {
        self.shot.read().has_fired()
    }

    /// Raises the flag; later calls neither fire nor notify subscribers.
    pub fn trigger(&self) -> bool {
        let mut shot = self.shot;
        if shot.peek().has_fired() {
            return false;
        }
        let fired = shot.write().fire();
        fired
    }

    pub fn attach(&self, event: MountedEvent) {
        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            let mut target = self.target;
            let element = event.data.as_ref().as_web_event();
            if let Ok(node) = element.dyn_into::<web_sys::Element>() {
                target.set(Some(node));
            }
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = event;
            self.trigger();
        }
    }
}

pub fn use_one_shot_observer(options: ObserveOptions) -> OneShotObserver {
    let shot = use_signal(OneShot::default);

    #[cfg(target_arch = "wasm32")]
    {
        let target = use_signal(|| None::<web_sys::Element>);
        let mut handle = use_signal(|| None::<dom::ObserverHandle>);
        let observer = OneShotObserver { shot, target };
        use_effect(move || {
            let Some(element) = target.read().as_ref().cloned() else {
                return;
            };
            if handle.peek().is_some() || observer.shot.peek().has_fired() {
                return;
            }
            match dom::observe_once(&element, options, move || {
                observer.trigger();
            }) {
                Ok(observing) => handle.set(Some(observing)),
                Err(message) => {
                    tracing::warn!("reveal: {message}; showing element immediately");
                    observer.trigger();
                }
            }
        });
        observer
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = options;
        OneShotObserver { shot }
    }
}

#[derive(Clone, Copy)]
struct RevealScope {
    observer: OneShotObserver,
}

fn revealed_class(base: &str, revealed: bool) -> String {
    if revealed {
        format!("{base} revealed")
    } else {
        base.to_string()
    }
}

/// A page section that fades in the first time it scrolls into view.
#[component]
pub fn RevealSection(id: String, #[props(default)] class: String, children: Element) -> Element {
    let observer = use_one_shot_observer(ObserveOptions::SECTION);
    use_context_provider(|| RevealScope { observer });
    let class = revealed_class(&format!("section fade-in {class}"), observer.has_fired());

    rsx! {
        section { id: "{id}", class: "{class}", onmounted: move |event| observer.attach(event),
            {children}
        }
    }
}

/// A card that slides in once, with a CSS transition delay by position.
#[component]
pub fn RevealCard(index: usize, #[props(default)] class: String, children: Element) -> Element {
    let observer = use_one_shot_observer(ObserveOptions::CARD);
    let class = revealed_class(&format!("card fade-in {class}"), observer.has_fired());
    let delay = u32::try_from(index)
        .unwrap_or(u32::MAX)
        .saturating_mul(CARD_DELAY_STEP_MS);

    rsx! {
        div {
            class: "{class}",
            style: "transition-delay: {delay}ms",
            onmounted: move |event| observer.attach(event),
            {children}
        }
    }
}

/// Child of a [`RevealSection`] that appears `index` stagger steps after its section.
#[component]
pub fn StaggerItem(index: usize, #[props(default)] class: String, children: Element) -> Element {
    let scope = try_use_context::<RevealScope>();
    let mut shown = use_signal(|| false);

    use_effect(move || {
        let parent_revealed = scope.map(|scope| scope.observer.has_fired()).unwrap_or(true);
        if !should_show(parent_revealed, *shown.peek()) {
            return;
        }
        let delay = stagger_delay_ms(index);
        spawn(async move {
            #[cfg(target_arch = "wasm32")]
            TimeoutFuture::new(delay).await;
            #[cfg(not(target_arch = "wasm32"))]
            let _ = delay;
            shown.set(true);
        });
    });

    let class = if shown() {
        format!("stagger visible {class}")
    } else {
        format!("stagger {class}")
    };
    rsx! {
        div { class: "{class}", {children} }
    }
}

/// Number that counts up from 0 to its target the first time it is seen.
#[component]
pub fn Counter(target: String, label: String, #[props(default)] suffix: String) -> Element {
    let duration_ms = use_context::<RuntimeConfig>().counter_duration_ms;
    let observer = use_one_shot_observer(ObserveOptions::COUNTER);
    let mut value = use_signal(|| 0u64);
    let target_value = parse_counter_target(&target);

    use_effect(move || {
        if !observer.has_fired() {
            return;
        }
        let animation = CounterAnimation::new(target_value, duration_ms);
        tracing::debug!("reveal: counting up to {target_value}");
        #[cfg(target_arch = "wasm32")]
        {
            let mut started_at = None;
            dom::run_frames(move |timestamp| {
                let start = *started_at.get_or_insert(timestamp);
                let elapsed = timestamp - start;
                value.set(animation.value_at(elapsed));
                !animation.is_finished(elapsed)
            });
        }
        #[cfg(not(target_arch = "wasm32"))]
        value.set(animation.value_at(f64::INFINITY));
    });

    rsx! {
        div { class: "stats__item",
            span {
                class: "stats__number",
                "data-target": "{target}",
                onmounted: move |event| observer.attach(event),
                "{value}"
            }
            span { class: "stats__suffix", "{suffix}" }
            p { class: "stats__label", "{label}" }
        }
    }
}
