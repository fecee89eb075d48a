//! Shared form-submit cascade
//!
//! Login and search submit the same way: an ordered list of methods is
//! tried until one succeeds. The method order differs per flow (search
//! prefers Enter, login prefers the button), so the caller supplies it.

use element_locator::{LocatorStrategy, SelectorResolver};
use page_adapter::{ElementHandle, PageDriver};
use tracing::debug;

/// Script run against an input to submit its enclosing form directly.
const FORM_SUBMIT_FN: &str =
    "function() { if (this.form) { this.form.submit(); return true; } return false; }";

/// One method in a submit cascade.
pub enum SubmitStep<'a> {
    /// Resolve a submit button and click it.
    ClickButton(&'a [LocatorStrategy]),

    /// Press the platform confirm key on the given field.
    PressConfirm(&'a ElementHandle),

    /// Submit the field's enclosing form via script.
    FormSubmit(&'a ElementHandle),
}

/// Try each step in order; the first success wins. Returns the name of the
/// winning method, or an error when the cascade is exhausted.
pub async fn submit(
    page: &dyn PageDriver,
    resolver: &SelectorResolver,
    steps: &[SubmitStep<'_>],
) -> Result<&'static str, String> {
    for step in steps {
        match step {
            SubmitStep::ClickButton(strategies) => {
                if let Some(button) = resolver.resolve(page, strategies).await {
                    match button.click().await {
                        Ok(()) => return Ok("button"),
                        Err(err) => debug!("submit button click failed: {}", err),
                    }
                } else {
                    debug!("no submit button resolved");
                }
            }
            SubmitStep::PressConfirm(field) => match field.press("Enter").await {
                Ok(()) => return Ok("enter"),
                Err(err) => debug!("confirm key failed: {}", err),
            },
            SubmitStep::FormSubmit(field) => match field.evaluate(FORM_SUBMIT_FN).await {
                Ok(value) if value.as_bool() == Some(true) => return Ok("form"),
                Ok(_) => debug!("no enclosing form to submit"),
                Err(err) => debug!("form submit script failed: {}", err),
            },
        }
    }
    Err("all submit methods failed".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use element_locator::LocatorStrategy;
    use page_adapter::mock::{MockElement, MockPage};
    use page_adapter::Query;

    async fn handle(page: &MockPage, expr: &str) -> ElementHandle {
        page.query(&Query::Css(expr.into())).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn button_wins_when_present() {
        let page = MockPage::new();
        page.insert("button[type='submit']", MockElement::new());
        page.insert("#password", MockElement::new());
        let field = handle(&page, "#password").await;

        let buttons = [LocatorStrategy::css(["button[type='submit']"])];
        let steps = [
            SubmitStep::ClickButton(&buttons),
            SubmitStep::PressConfirm(&field),
        ];
        assert_eq!(
            submit(&page, &SelectorResolver::new(), &steps).await.unwrap(),
            "button"
        );
    }

    #[tokio::test]
    async fn cascade_falls_through_to_confirm_key() {
        let page = MockPage::new();
        let field_handle = page.insert("#password", MockElement::new());
        let field = handle(&page, "#password").await;

        let buttons = [LocatorStrategy::css(["button[type='submit']"])];
        let steps = [
            SubmitStep::ClickButton(&buttons),
            SubmitStep::PressConfirm(&field),
        ];
        assert_eq!(
            submit(&page, &SelectorResolver::new(), &steps).await.unwrap(),
            "enter"
        );
        assert_eq!(field_handle.keys(), vec!["Enter"]);
    }

    #[tokio::test]
    async fn form_submit_requires_truthy_script_result() {
        let page = MockPage::new();
        page.insert(
            "#with-form",
            MockElement::new()
                .press_fails()
                .script_result(serde_json::json!(true)),
        );
        let field = handle(&page, "#with-form").await;

        let steps = [
            SubmitStep::PressConfirm(&field),
            SubmitStep::FormSubmit(&field),
        ];
        assert_eq!(
            submit(&page, &SelectorResolver::new(), &steps).await.unwrap(),
            "form"
        );
    }

    #[tokio::test]
    async fn exhausted_cascade_errors() {
        let page = MockPage::new();
        page.insert("#orphan", MockElement::new().press_fails());
        let field = handle(&page, "#orphan").await;

        let buttons = [LocatorStrategy::css([".login-btn"])];
        let steps = [
            SubmitStep::ClickButton(&buttons),
            SubmitStep::PressConfirm(&field),
            SubmitStep::FormSubmit(&field),
        ];
        assert!(submit(&page, &SelectorResolver::new(), &steps).await.is_err());
    }
}
