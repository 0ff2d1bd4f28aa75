//! Start-up self-check: logs which interactive pieces of the page were found.

#[cfg(target_arch = "wasm32")]
use crate::chrome::BACK_TO_TOP_ID;
#[cfg(target_arch = "wasm32")]
use crate::contact::FORM_ID;
#[cfg(target_arch = "wasm32")]
use crate::dom;
#[cfg(target_arch = "wasm32")]
use crate::navigation::{NAV_MENU_ID, NAV_TOGGLE_ID};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeatureReport {
    pub nav_links: u32,
    pub mobile_menu: bool,
    pub contact_form: bool,
    pub back_to_top: bool,
    pub name_field: bool,
}

impl FeatureReport {
    pub fn missing(&self) -> Vec<&'static str> {
        let checks = [
            ("navigation links", self.nav_links > 0),
            ("mobile menu", self.mobile_menu),
            ("contact form", self.contact_form),
            ("back-to-top button", self.back_to_top),
            ("name field", self.name_field),
        ];
        checks
            .into_iter()
            .filter(|(_, present)| !present)
            .map(|(name, _)| name)
            .collect()
    }

    pub fn all_present(&self) -> bool {
        self.missing().is_empty()
    }

    pub fn log(&self) {
        let missing = self.missing();
        if missing.is_empty() {
            tracing::info!(
                "page: initialized ({} nav links, menu, form, back-to-top)",
                self.nav_links
            );
        } else {
            tracing::warn!("page: initialized without {}", missing.join(", "));
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub fn probe() -> FeatureReport {
    FeatureReport {
        nav_links: dom::count_matching(".nav__link"),
        mobile_menu: dom::element_exists(NAV_MENU_ID) && dom::element_exists(NAV_TOGGLE_ID),
        contact_form: dom::element_exists(FORM_ID),
        back_to_top: dom::element_exists(BACK_TO_TOP_ID),
        name_field: dom::element_exists("name"),
    }
}

/// Routes uncaught script errors into the log. Keep the handle alive for the page lifetime.
#[cfg(target_arch = "wasm32")]
pub fn install_error_logger() -> Result<dom::ListenerHandle, String> {
    let window = dom::window_target().ok_or_else(|| "no window".to_string())?;
    dom::listen(&window, "error", |event| {
        use wasm_bindgen::JsCast;
        match event.dyn_ref::<web_sys::ErrorEvent>() {
            Some(error) => tracing::error!(
                "page: script error: {} ({}:{})",
                error.message(),
                error.filename(),
                error.lineno()
            ),
            None => tracing::error!("page: script error: {}", event.type_()),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn complete() -> FeatureReport {
        FeatureReport {
            nav_links: 5,
            mobile_menu: true,
            contact_form: true,
            back_to_top: true,
            name_field: true,
        }
    }

    #[test]
    fn full_page_reports_nothing_missing() {
        assert!(complete().all_present());
        assert_eq!(complete().missing(), Vec::<&str>::new());
    }

    #[test]
    fn missing_pieces_are_listed_in_order() {
        let report = FeatureReport {
            nav_links: 0,
            back_to_top: false,
            ..complete()
        };
        assert!(!report.all_present());
        assert_eq!(report.missing(), vec!["navigation links", "back-to-top button"]);
    }

    #[test]
    fn empty_page_misses_everything() {
        assert_eq!(FeatureReport::default().missing().len(), 5);
    }
}
