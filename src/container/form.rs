use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use super::{Container, Node, ValidationMessages};
use crate::element::Element;
use crate::errors::SubmitError;
use crate::field::FormField;
use crate::format::FormatMode;
use crate::session::{BindSession, FormId};
use crate::value::{escape, is_empty, to_text};

/// Name of the payload key identifying the form a submission comes from
pub const FORM_ID_KEY: &str = "_form_id";

/// Persists a bound and validated form
#[async_trait]
pub trait SubmitHandler: Send + Sync {
    /// Persist the form, returning whether the submission was accepted
    async fn submit(&self, form: &Form) -> Result<bool, SubmitError>;
}

/// A [`SubmitHandler`] from a closure returning a boxed future
pub struct HandlerFn<F>(F);

/// Create a submit handler from a closure
///
/// ```rust
/// use formwork::container::handler_fn;
/// use futures::FutureExt;
///
/// let handler = handler_fn(|form| async move { Ok(form.value(None).is_object()) }.boxed());
/// ```
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: for<'a> Fn(&'a Form) -> BoxFuture<'a, Result<bool, SubmitError>> + Send + Sync,
{
    HandlerFn(f)
}

#[async_trait]
impl<F> SubmitHandler for HandlerFn<F>
where
    F: for<'a> Fn(&'a Form) -> BoxFuture<'a, Result<bool, SubmitError>> + Send + Sync,
{
    async fn submit(&self, form: &Form) -> Result<bool, SubmitError> {
        (self.0)(form).await
    }
}

/// Outcome of handling a request payload
#[derive(Clone, Debug, PartialEq)]
pub enum Submission {
    /// The payload was not a submission of this form
    NotSubmitted,
    /// The submission failed validation
    Invalid(ValidationMessages),
    /// The submission was valid but the handler did not accept it
    Rejected,
    /// The submission was valid and persisted
    Accepted,
}

impl Submission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Submission::Accepted)
    }

    /// Build the JSON body answering an asynchronous submission
    pub fn response(&self, success_url: &str) -> Value {
        match self {
            Submission::Accepted => json!({"success": true, "url": success_url}),
            Submission::Invalid(messages) => json!({"success": false, "errors": messages}),
            Submission::NotSubmitted | Submission::Rejected => {
                json!({"success": false, "errors": {}})
            }
        }
    }
}

/// The root of a form tree
///
/// A form owns its root container and the binding session of its request. Its id scopes the
/// radio groups of its fields and identifies submissions through the `_form_id` payload key.
#[derive(Debug)]
pub struct Form {
    id: FormId,
    element: Element,
    root: Container,
    session: BindSession,
    output_form_id: bool,
}

impl Form {
    pub fn new(id: impl Into<FormId>) -> Self {
        let id = id.into();
        let mut element = Element::new();
        element.attributes_mut().insert("method", "post");

        let mut root = Container::hgroup();
        root.element.form = Some(id.clone());

        Form {
            id,
            element,
            root,
            session: BindSession::new(),
            output_form_id: false,
        }
    }

    pub fn with_root(mut self, mut root: Container) -> Self {
        root.element.form = Some(self.id.clone());
        root.element.format_mode = self.root.element.format_mode;
        root.add_children(std::mem::take(&mut self.root).into_children());
        self.root = root;
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.add_child(child);
        self
    }

    pub fn id(&self) -> &FormId {
        &self.id
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    pub fn root(&self) -> &Container {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Container {
        &mut self.root
    }

    pub fn session(&self) -> &BindSession {
        &self.session
    }

    /// Add a child to the root container, it joins the form on the next cascade
    pub fn add_child(&mut self, child: impl Into<Node>) -> &mut Self {
        self.root.add_child(child);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.root.field(name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FormField> {
        self.root.field_mut(name)
    }

    /// Submit the form asynchronously, adding or removing the `ajax` class
    pub fn use_ajax(&mut self, enabled: bool) {
        if enabled {
            self.element.add_class("ajax");
        } else {
            self.element.remove_class("ajax");
        }
    }

    pub fn set_format_mode(&mut self, mode: FormatMode) {
        self.root.set_format_mode(mode);
    }

    /// Render the hidden `_form_id` input with the form
    pub fn output_form_id(&mut self, output: bool) {
        self.output_form_id = output;
    }

    pub fn set_value(&mut self, value: &Value) {
        self.root.set_value(value, &mut self.session);
    }

    pub fn value(&self, mode: Option<FormatMode>) -> Value {
        self.root.value(mode)
    }

    pub fn validate(&mut self) -> bool {
        self.root.validate(&mut self.session)
    }

    pub fn validation_messages(&self) -> ValidationMessages {
        self.root.validation_messages()
    }

    pub fn render(&mut self) -> String {
        let t = self.element.indentation();
        let mut out = format!("{t}<form{}>", self.element.output_attributes(None));
        out.push_str(&self.root.render(&mut self.session));
        if self.output_form_id {
            out.push_str(&format!(
                "{t}\t<input type=\"hidden\" name=\"{FORM_ID_KEY}\" value=\"{}\" />",
                escape(&self.id)
            ));
        }
        out.push_str(&format!("{t}</form>"));
        out
    }

    /// Handle a request payload
    ///
    /// A payload carrying the id of this form under `_form_id` is a submission: it is bound and
    /// validated, and valid submissions are passed on to the handler. Any other non-empty
    /// payload is bound and validated so the form renders with the given values and messages.
    ///
    /// # Errors
    ///
    /// Fails only if the handler fails.
    #[instrument(name = "handle_form", skip_all, fields(form = %self.id), err)]
    pub async fn handle<H>(&mut self, payload: &Value, handler: &H) -> Result<Submission, SubmitError>
    where
        H: SubmitHandler + ?Sized,
    {
        self.output_form_id = true;
        let submitted = payload
            .get(FORM_ID_KEY)
            .map(|id| to_text(id) == *self.id)
            .unwrap_or(false);

        if !submitted {
            let repopulate = match payload {
                Value::Object(map) => !map.is_empty(),
                other => !is_empty(other),
            };
            self.set_value(payload);
            if repopulate {
                self.validate();
            }
            debug!(repopulate, "form not submitted");
            return Ok(Submission::NotSubmitted);
        }

        self.set_value(payload);
        if !self.validate() {
            let messages = self.validation_messages();
            warn!(fields = messages.len(), "submission is invalid");
            return Ok(Submission::Invalid(messages));
        }

        if handler.submit(self).await? {
            debug!("submission accepted");
            Ok(Submission::Accepted)
        } else {
            debug!("submission rejected");
            Ok(Submission::Rejected)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::Numeric;
    use futures::FutureExt;
    use pretty_assertions::assert_eq;

    fn contact() -> Form {
        Form::new("contact")
            .with_child(FormField::text("name").with_label("Name").with_required(true))
            .with_child(FormField::text("age").with_validator(Numeric))
    }

    #[tokio::test]
    async fn it_ignores_payloads_of_other_forms() {
        let mut form = contact();
        let handler = handler_fn(|_| async { Ok(true) }.boxed());

        let outcome = form.handle(&json!({}), &handler).await.unwrap();
        assert_eq!(outcome, Submission::NotSubmitted);
        assert!(form.validation_messages().is_empty());

        let outcome = form
            .handle(&json!({"_form_id": "other", "age": "x"}), &handler)
            .await
            .unwrap();
        assert_eq!(outcome, Submission::NotSubmitted);
        // repopulated and validated
        assert_eq!(form.field("age").unwrap().value(None), json!("x"));
        assert_eq!(form.validation_messages().len(), 2);
    }

    #[tokio::test]
    async fn it_reports_invalid_submissions() {
        let mut form = contact();
        let handler = handler_fn(|_| async { Ok(true) }.boxed());

        let outcome = form
            .handle(&json!({"_form_id": "contact", "age": "x"}), &handler)
            .await
            .unwrap();
        let Submission::Invalid(messages) = &outcome else {
            panic!("submission should be invalid");
        };
        assert_eq!(
            messages.get("name"),
            Some(&["<b>Name:</b> This is a required field.".to_string()][..])
        );
        assert_eq!(
            outcome.response("/done"),
            json!({
                "success": false,
                "errors": {
                    "name": ["<b>Name:</b> This is a required field."],
                    "age": ["Input field must be numeric"]
                }
            })
        );
    }

    #[tokio::test]
    async fn it_passes_valid_submissions_to_the_handler() {
        let mut form = contact();
        let handler = handler_fn(|form| {
            async move { Ok(form.value(None)["name"] == json!("Ada")) }.boxed()
        });

        let outcome = form
            .handle(&json!({"_form_id": "contact", "name": "Ada", "age": "36"}), &handler)
            .await
            .unwrap();
        assert_eq!(outcome, Submission::Accepted);
        assert_eq!(
            outcome.response("/done"),
            json!({"success": true, "url": "/done"})
        );

        let outcome = form
            .handle(&json!({"_form_id": "contact", "name": "Alan"}), &handler)
            .await
            .unwrap();
        assert_eq!(outcome, Submission::Rejected);
    }

    #[tokio::test]
    async fn it_propagates_handler_failures() {
        let mut form = contact();
        let handler = handler_fn(|_| {
            async { Err(SubmitError::from(anyhow::anyhow!("database is down"))) }.boxed()
        });

        let result = form
            .handle(&json!({"_form_id": "contact", "name": "Ada"}), &handler)
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn it_renders_the_form_id_once_handled() {
        let mut form = contact();
        assert!(!form.render().contains("_form_id"));

        form.output_form_id(true);
        let html = form.render();
        assert!(html.starts_with("\n<form method='post'>"));
        assert!(html.contains("<input type=\"hidden\" name=\"_form_id\" value=\"contact\" />"));
        assert!(html.ends_with("</form>"));
    }

    #[test]
    fn it_scopes_fields_to_the_form() {
        let mut form = contact();
        form.render();
        assert_eq!(
            form.field("name").unwrap().element().form(),
            Some(&FormId::new("contact"))
        );
    }
}
