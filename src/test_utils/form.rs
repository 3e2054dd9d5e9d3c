use scraper::{ElementRef, Html, Selector};

use crate::html::FORM_ERROR_STYLE;

#[track_caller]
pub(crate) fn must_get_form(html: &Html) -> ElementRef<'_> {
    html.select(&Selector::parse("form").unwrap())
        .next()
        .expect("No form found")
}

#[track_caller]
pub(crate) fn assert_hx_endpoint(element: &ElementRef<'_>, endpoint: &str, attribute: &str) {
    let got = element
        .value()
        .attr(attribute)
        .unwrap_or_else(|| panic!("{attribute} attribute missing"));

    assert_eq!(
        got, endpoint,
        "want element with attribute {attribute}=\"{endpoint}\", got {got:?}"
    );
}

#[track_caller]
fn must_get_input<'a>(form: &ElementRef<'a>, name: &str) -> ElementRef<'a> {
    form.select(&Selector::parse("input").unwrap())
        .find(|input| input.value().attr("name") == Some(name))
        .unwrap_or_else(|| panic!("No input found with name \"{name}\""))
}

/// Checks the input called `name` has `type_` and is required.
#[track_caller]
pub(crate) fn assert_form_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    let input = must_get_input(form, name);
    let input_type = input.value().attr("type").unwrap_or_default();

    assert_eq!(
        input_type, type_,
        "want input {name} with type \"{type_}\", got {input_type:?}"
    );
    assert!(
        input.value().attr("required").is_some(),
        "want input {name} to have the required attribute but got none"
    );
}

#[track_caller]
pub(crate) fn assert_form_input_with_value(
    form: &ElementRef<'_>,
    name: &str,
    type_: &str,
    value: &str,
) {
    assert_form_input(form, name, type_);

    let got = must_get_input(form, name)
        .value()
        .attr("value")
        .unwrap_or_default();
    assert_eq!(got, value, "want input {name} with value \"{value}\", got {got:?}");
}

/// Checks the form's first button submits it, and has `text` if given.
#[track_caller]
pub(crate) fn assert_form_submit_button(form: &ElementRef<'_>, text: Option<&str>) {
    let submit_button = form
        .select(&Selector::parse("button").unwrap())
        .next()
        .expect("No button found");

    assert_eq!(
        submit_button.value().attr("type").unwrap_or_default(),
        "submit",
        "want submit button with type=\"submit\""
    );

    if let Some(text) = text {
        let got_text = submit_button.text().collect::<String>();
        assert_eq!(text, got_text.trim());
    }
}

/// The text of every inline field error under `element`, in document order.
pub(crate) fn form_error_messages(element: &ElementRef<'_>) -> Vec<String> {
    let selector = format!("p.{}", FORM_ERROR_STYLE.replace(' ', "."));

    element
        .select(&Selector::parse(&selector).unwrap())
        .map(|p| p.text().collect::<String>().trim().to_owned())
        .collect()
}

#[track_caller]
pub(crate) fn assert_form_error_message(form: &ElementRef<'_>, want_error_message: &str) {
    let got = form_error_messages(form);

    assert!(
        got.iter().any(|message| message == want_error_message),
        "want error message {want_error_message:?}, got {got:?}"
    );
}
