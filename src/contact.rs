use dioxus::prelude::*;
#[cfg(target_arch = "wasm32")]
use gloo_timers::future::TimeoutFuture;
use gloo_net::http::Request;
use serde::Deserialize;
use std::fmt;

use crate::config::RuntimeConfig;
use crate::dom;

pub const FORM_ID: &str = "contact-form";
pub const FORM_MESSAGE_ID: &str = "form-message";
pub const SUBMIT_ID: &str = "submit-btn";
pub const SUCCESS_HIDE_MS: u32 = 10_000;

const SUCCESS_TEXT: &str =
    "Thank you! Your message has been sent successfully. We will get back to you soon.";
const INVALID_TEXT: &str = "Please fill in all required fields correctly.";
const REJECTED_TEXT: &str = "Oops! There was a problem submitting your form. Please try again.";
const NETWORK_TEXT: &str = "Network error. Please check your internet connection and try again.";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

impl ContactForm {
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Phone => &self.phone,
            Field::Message => &self.message,
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        match field {
            Field::Name => self.name = value,
            Field::Email => self.email = value,
            Field::Phone => self.phone = value,
            Field::Message => self.message = value,
        }
    }

    /// `application/x-www-form-urlencoded` body, fields in form order.
    pub fn encode(&self) -> String {
        Field::ALL
            .iter()
            .map(|field| {
                format!(
                    "{}={}",
                    field.name(),
                    urlencoding::encode(self.value(*field).trim())
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    Name,
    Email,
    Phone,
    Message,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Name, Field::Email, Field::Phone, Field::Message];

    pub fn name(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Message => "message",
        }
    }

    pub fn required(self) -> bool {
        !matches!(self, Field::Phone)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldProblem {
    Missing,
    MalformedEmail,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub problem: FieldProblem,
}

impl FieldError {
    pub fn message(&self) -> &'static str {
        match (self.field, self.problem) {
            (Field::Name, FieldProblem::Missing) => "Full name is required",
            (Field::Email, FieldProblem::Missing) => "Email address is required",
            (Field::Message, FieldProblem::Missing) => "Message is required",
            (_, FieldProblem::MalformedEmail) => "Please enter a valid email address",
            (_, FieldProblem::Missing) => "This field is required",
        }
    }
}

/// Shape check only: no whitespace, one `@`, and a dot inside the domain.
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(index, ch)| ch == '.' && index > 0 && index + 1 < domain.len())
}

/// Every problem with the form, in field order.
pub fn validate(form: &ContactForm) -> Vec<FieldError> {
    let mut errors = Vec::new();
    for field in Field::ALL {
        let value = form.value(field).trim();
        if field.required() && value.is_empty() {
            errors.push(FieldError {
                field,
                problem: FieldProblem::Missing,
            });
        } else if field == Field::Email && !is_valid_email(value) {
            errors.push(FieldError {
                field,
                problem: FieldProblem::MalformedEmail,
            });
        }
    }
    errors
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitError {
    /// The relay answered with a non-2xx status, optionally listing reasons.
    Rejected(Vec<String>),
    /// The request never got an answer.
    Network(String),
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::Rejected(reasons) if !reasons.is_empty() => {
                write!(f, "Error: {}", reasons.join(", "))
            }
            SubmitError::Rejected(_) => f.write_str(REJECTED_TEXT),
            SubmitError::Network(_) => f.write_str(NETWORK_TEXT),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RelayErrorBody {
    #[serde(default)]
    errors: Vec<RelayError>,
}

#[derive(Debug, Deserialize)]
struct RelayError {
    message: String,
}

/// Reads the relay's `{"errors":[{"message":...}]}` body; anything else
/// yields a rejection without reasons.
pub fn rejection_from_body(body: &str) -> SubmitError {
    let parsed: RelayErrorBody = serde_json::from_str(body).unwrap_or_default();
    SubmitError::Rejected(
        parsed
            .errors
            .into_iter()
            .map(|error| error.message)
            .filter(|message| !message.trim().is_empty())
            .collect(),
    )
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub text: String,
}

impl Banner {
    fn success() -> Self {
        Self {
            kind: BannerKind::Success,
            text: SUCCESS_TEXT.to_string(),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Error,
            text: text.into(),
        }
    }

    pub fn class(&self) -> &'static str {
        match self.kind {
            BannerKind::Success => "form__message success",
            BannerKind::Error => "form__message error",
        }
    }

    pub fn auto_hide_ms(&self) -> Option<u32> {
        match self.kind {
            BannerKind::Success => Some(SUCCESS_HIDE_MS),
            BannerKind::Error => None,
        }
    }
}

/// Tracks which banner is on screen so a delayed hide only removes the
/// banner it was scheduled for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BannerSlot {
    serial: u64,
}

impl BannerSlot {
    /// Claims the slot for a new banner and returns its serial.
    pub fn show(&mut self) -> u64 {
        self.serial = self.serial.wrapping_add(1);
        self.serial
    }

    pub fn is_current(&self, serial: u64) -> bool {
        self.serial == serial
    }
}

/// Why a submit attempt did not produce a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Blocked {
    InFlight,
    Invalid(Banner),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Completion {
    pub banner: Banner,
    pub reset_fields: bool,
}

/// Submission state of the contact form: one request at a time, plus the
/// field errors from the last validation pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContactFlow {
    submitting: bool,
    errors: Vec<FieldError>,
}

impl ContactFlow {
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn error_for(&self, field: Field) -> Option<&FieldError> {
        self.errors.iter().find(|error| error.field == field)
    }

    /// Validates and, when nothing is in flight, claims the single request
    /// slot. Returns the encoded body to send.
    pub fn begin(&mut self, form: &ContactForm) -> Result<String, Blocked> {
        if self.submitting {
            return Err(Blocked::InFlight);
        }
        self.errors = validate(form);
        if !self.errors.is_empty() {
            return Err(Blocked::Invalid(Banner::error(INVALID_TEXT)));
        }
        self.submitting = true;
        Ok(form.encode())
    }

    /// Releases the request slot whatever the outcome.
    pub fn complete(&mut self, outcome: Result<(), SubmitError>) -> Completion {
        self.submitting = false;
        match outcome {
            Ok(()) => {
                self.errors.clear();
                Completion {
                    banner: Banner::success(),
                    reset_fields: true,
                }
            }
            Err(error) => Completion {
                banner: Banner::error(error.to_string()),
                reset_fields: false,
            },
        }
    }

    /// Drops the mark on `field` after the user edits it.
    pub fn clear_on_input(&mut self, field: Field) -> bool {
        let before = self.errors.len();
        self.errors.retain(|error| error.field != field);
        before != self.errors.len()
    }

    /// Drops the mark on `field` when it loses focus holding something.
    pub fn clear_on_blur(&mut self, field: Field, value: &str) -> bool {
        if value.trim().is_empty() {
            return false;
        }
        self.clear_on_input(field)
    }
}

pub async fn post_to_relay(endpoint: &str, body: String) -> Result<(), SubmitError> {
    let request = Request::post(endpoint)
        .header("Accept", "application/json")
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(body)
        .map_err(|err| SubmitError::Network(format!("request failed: {err}")))?;
    let response = request
        .send()
        .await
        .map_err(|err| SubmitError::Network(format!("request failed: {err}")))?;
    tracing::debug!("contact: relay answered {}", response.status());
    if response.ok() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(rejection_from_body(&body))
}

/// Shows `next`; a success banner hides itself unless replaced in the meantime.
fn show_banner(mut banner: Signal<Option<Banner>>, mut slot: Signal<BannerSlot>, next: Banner) {
    let shown = slot.write().show();
    let hide_after = next.auto_hide_ms();
    banner.set(Some(next));
    if let Some(delay) = hide_after {
        spawn(async move {
            #[cfg(target_arch = "wasm32")]
            TimeoutFuture::new(delay).await;
            #[cfg(not(target_arch = "wasm32"))]
            let _ = delay;
            if slot.peek().is_current(shown) {
                banner.set(None);
            }
        });
    }
}

#[component]
pub fn ContactSection() -> Element {
    let endpoint = use_context::<RuntimeConfig>().form_endpoint;
    let mut form = use_signal(ContactForm::default);
    let mut flow = use_signal(ContactFlow::default);
    let mut banner = use_signal(|| None::<Banner>);
    let banner_slot = use_signal(BannerSlot::default);
    use_hook(|| tracing::info!("contact: form initialized, relay {endpoint}"));

    use_effect(move || {
        if banner.read().is_some() {
            dom::scroll_into_view(FORM_MESSAGE_ID);
        }
    });

    let submitting = flow.read().is_submitting();

    rsx! {
        div { class: "contact__form-wrapper",
            form {
                id: FORM_ID,
                class: "contact__form",
                novalidate: true,
                onsubmit: move |event| {
                    event.prevent_default();
                    event.stop_propagation();
                    let started = flow.write().begin(&form.peek());
                    let body = match started {
                        Ok(body) => body,
                        Err(Blocked::InFlight) => {
                            tracing::debug!("contact: already submitting, ignoring");
                            return;
                        }
                        Err(Blocked::Invalid(invalid)) => {
                            tracing::debug!(
                                "contact: validation failed on {} field(s)",
                                flow.peek().errors().len()
                            );
                            show_banner(banner, banner_slot, invalid);
                            return;
                        }
                    };
                    let endpoint = endpoint.clone();
                    tracing::info!("contact: submitting to relay");
                    spawn(async move {
                        let outcome = post_to_relay(&endpoint, body).await;
                        if let Err(error) = &outcome {
                            tracing::error!("contact: submission failed: {error:?}");
                        }
                        let done = flow.write().complete(outcome);
                        if done.reset_fields {
                            form.set(ContactForm::default());
                            tracing::info!("contact: submitted");
                        }
                        show_banner(banner, banner_slot, done.banner);
                    });
                },
                div { class: "form__row",
                    FormField { field: Field::Name, label: "Full Name", input_type: "text", form: form, flow: flow }
                    FormField { field: Field::Email, label: "Email Address", input_type: "email", form: form, flow: flow }
                }
                FormField { field: Field::Phone, label: "Phone (optional)", input_type: "tel", form: form, flow: flow }
                FormField { field: Field::Message, label: "Message", input_type: "textarea", form: form, flow: flow }
                button {
                    id: SUBMIT_ID,
                    r#type: "submit",
                    class: if submitting { "btn btn--primary btn--loading" } else { "btn btn--primary" },
                    disabled: submitting,
                    span { class: "btn__text", hidden: submitting, "Send Message" }
                    span { class: "btn__loading", hidden: !submitting, "Sending..." }
                }
            }
            if let Some(current) = banner() {
                div { id: FORM_MESSAGE_ID, class: current.class(), role: "status",
                    span { "{current.text}" }
                    button {
                        r#type: "button",
                        class: "form__message-dismiss",
                        aria_label: "Dismiss",
                        onclick: move |_| banner.set(None),
                        "✕"
                    }
                }
            } else {
                div { id: FORM_MESSAGE_ID, class: "form__message", hidden: true }
            }
        }
    }
}

#[component]
fn FormField(
    field: Field,
    label: &'static str,
    input_type: &'static str,
    form: Signal<ContactForm>,
    flow: Signal<ContactFlow>,
) -> Element {
    let mut form = form;
    let mut flow = flow;
    let error = flow.read().error_for(field).copied();
    let value = form.read().value(field).to_string();
    let disabled = flow.read().is_submitting();
    let class = if error.is_some() {
        "form__input field-invalid"
    } else {
        "form__input"
    };

    let on_input = move |event: FormEvent| {
        form.write().set(field, event.value());
        if flow.peek().error_for(field).is_some() {
            flow.write().clear_on_input(field);
        }
    };
    let on_blur = move |_: FocusEvent| {
        let value = form.peek().value(field).to_string();
        if flow.peek().error_for(field).is_some() {
            flow.write().clear_on_blur(field, &value);
        }
    };

    rsx! {
        div { class: "form__group",
            label { r#for: field.name(), class: "form__label",
                "{label}"
                if field.required() {
                    span { class: "form__required", " *" }
                }
            }
            if input_type == "textarea" {
                textarea {
                    id: field.name(),
                    name: field.name(),
                    class: class,
                    rows: "6",
                    maxlength: "2000",
                    value: "{value}",
                    disabled: disabled,
                    oninput: on_input,
                    onblur: on_blur,
                }
            } else {
                input {
                    id: field.name(),
                    name: field.name(),
                    r#type: input_type,
                    class: class,
                    value: "{value}",
                    disabled: disabled,
                    oninput: on_input,
                    onblur: on_blur,
                }
            }
            if let Some(error) = error {
                div { class: "field-error", role: "alert", "{error.message()}" }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn filled() -> ContactForm {
        ContactForm {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: String::new(),
            message: "We need an audit.".to_string(),
        }
    }

    fn fields(errors: &[FieldError]) -> Vec<Field> {
        errors.iter().map(|error| error.field).collect()
    }

    #[test]
    fn email_shape_check() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("foo@bar"));
        assert!(!is_valid_email("foo@.com"));
        assert!(!is_valid_email("foo@bar."));
        assert!(!is_valid_email("@bar.com"));
        assert!(!is_valid_email("foo@b@r.com"));
        assert!(!is_valid_email("foo bar@example.com"));
        assert!(!is_valid_email("foo.example.com"));
    }

    #[test]
    fn empty_form_reports_three_missing_fields() {
        let errors = validate(&ContactForm::default());
        assert_eq!(fields(&errors), vec![Field::Name, Field::Email, Field::Message]);
        assert!(errors
            .iter()
            .all(|error| error.problem == FieldProblem::Missing));
    }

    #[test]
    fn whitespace_only_counts_as_missing() {
        let form = ContactForm {
            name: "   ".to_string(),
            ..filled()
        };
        assert_eq!(
            validate(&form),
            vec![FieldError {
                field: Field::Name,
                problem: FieldProblem::Missing
            }]
        );
    }

    #[test]
    fn malformed_email_is_the_only_error() {
        let form = ContactForm {
            email: "foo@bar".to_string(),
            ..filled()
        };
        let errors = validate(&form);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, Field::Email);
        assert_eq!(errors[0].message(), "Please enter a valid email address");
    }

    #[test]
    fn missing_field_messages_name_the_field() {
        let messages: Vec<&str> = validate(&ContactForm::default())
            .iter()
            .map(FieldError::message)
            .collect();
        assert_eq!(
            messages,
            vec![
                "Full name is required",
                "Email address is required",
                "Message is required"
            ]
        );
    }

    #[test]
    fn stale_hide_timer_leaves_newer_banner_alone() {
        let mut slot = BannerSlot::default();
        let success = Banner::success();
        let success_serial = slot.show();
        assert_eq!(success.auto_hide_ms(), Some(SUCCESS_HIDE_MS));

        let error = Banner::error(NETWORK_TEXT);
        let error_serial = slot.show();
        assert_eq!(error.auto_hide_ms(), None);

        assert!(!slot.is_current(success_serial));
        assert!(slot.is_current(error_serial));
    }

    #[test]
    fn hide_timer_removes_its_own_banner() {
        let mut slot = BannerSlot::default();
        let serial = slot.show();
        assert!(slot.is_current(serial));
    }

    #[test]
    fn invalid_form_never_claims_the_request_slot() {
        let mut flow = ContactFlow::default();
        let result = flow.begin(&ContactForm::default());
        assert_eq!(result, Err(Blocked::Invalid(Banner::error(INVALID_TEXT))));
        assert!(!flow.is_submitting());
        assert_eq!(flow.errors().len(), 3);
    }

    #[test]
    fn second_submit_while_pending_is_ignored() {
        let mut flow = ContactFlow::default();
        let mut requests = Vec::new();
        for _ in 0..3 {
            if let Ok(body) = flow.begin(&filled()) {
                requests.push(body);
            }
        }
        assert_eq!(requests.len(), 1);
        assert_eq!(flow.begin(&filled()), Err(Blocked::InFlight));
        flow.complete(Ok(()));
        assert!(flow.begin(&filled()).is_ok());
    }

    #[test]
    fn body_is_form_encoded() {
        let form = ContactForm {
            message: "Hi & bye = ok".to_string(),
            ..filled()
        };
        assert_eq!(
            form.encode(),
            "name=Ada%20Lovelace&email=ada%40example.com&phone=&message=Hi%20%26%20bye%20%3D%20ok"
        );
    }

    #[test]
    fn success_resets_fields_and_clears_errors() {
        let mut flow = ContactFlow::default();
        let _ = flow.begin(&ContactForm::default());
        flow.begin(&filled()).unwrap();
        let done = flow.complete(Ok(()));
        assert!(done.reset_fields);
        assert_eq!(done.banner.kind, BannerKind::Success);
        assert_eq!(done.banner.auto_hide_ms(), Some(SUCCESS_HIDE_MS));
        assert!(flow.errors().is_empty());
        assert!(!flow.is_submitting());
    }

    #[test]
    fn rejection_lists_relay_reasons_and_keeps_fields() {
        let mut flow = ContactFlow::default();
        flow.begin(&filled()).unwrap();
        let outcome = Err(rejection_from_body(r#"{"errors":[{"message":"Invalid"}]}"#));
        let done = flow.complete(outcome);
        assert!(!done.reset_fields);
        assert!(done.banner.text.contains("Invalid"));
        assert_eq!(done.banner.text, "Error: Invalid");
        assert_eq!(done.banner.auto_hide_ms(), None);
        assert!(!flow.is_submitting());
    }

    #[test]
    fn rejection_without_reasons_is_generic() {
        assert_eq!(rejection_from_body("<html>502</html>"), SubmitError::Rejected(vec![]));
        assert_eq!(rejection_from_body(r#"{"errors":[]}"#).to_string(), REJECTED_TEXT);
        assert_eq!(
            rejection_from_body(r#"{"errors":[{"message":"a"},{"message":"b"}]}"#).to_string(),
            "Error: a, b"
        );
    }

    #[test]
    fn network_failure_releases_the_slot() {
        let mut flow = ContactFlow::default();
        flow.begin(&filled()).unwrap();
        let done = flow.complete(Err(SubmitError::Network("offline".to_string())));
        assert_eq!(done.banner.text, NETWORK_TEXT);
        assert_eq!(done.banner.kind, BannerKind::Error);
        assert!(!flow.is_submitting());
    }

    #[test]
    fn editing_a_marked_field_clears_only_that_mark() {
        let mut flow = ContactFlow::default();
        let _ = flow.begin(&ContactForm::default());
        assert!(flow.clear_on_input(Field::Email));
        assert!(!flow.clear_on_input(Field::Email));
        assert_eq!(fields(flow.errors()), vec![Field::Name, Field::Message]);
    }

    #[test]
    fn blur_clears_only_with_content() {
        let mut flow = ContactFlow::default();
        let _ = flow.begin(&ContactForm::default());
        assert!(!flow.clear_on_blur(Field::Name, "  "));
        assert!(flow.clear_on_blur(Field::Name, "Ada"));
        assert!(flow.error_for(Field::Name).is_none());
    }

    #[test]
    fn new_validation_pass_replaces_old_errors() {
        let mut flow = ContactFlow::default();
        let _ = flow.begin(&ContactForm::default());
        let form = ContactForm {
            email: "nope".to_string(),
            ..filled()
        };
        let _ = flow.begin(&form);
        assert_eq!(fields(flow.errors()), vec![Field::Email]);
    }
}
