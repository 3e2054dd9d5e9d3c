//! The transaction form shared by the create and edit pages.

use maud::{Markup, html};
use serde::Deserialize;
use time::{Date, macros::format_description};

use crate::{
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE,
        FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, loading_spinner,
    },
    transaction::{
        category::{Category, TransactionType},
        lifecycle::{EditorMode, FieldErrors, MIN_TRANSACTION_DATE, TransactionDraft},
    },
};

/// The raw form data for creating or editing a transaction.
///
/// Fields are kept as text so that invalid input can be shown back to the
/// user with a message instead of being rejected by the extractor.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    pub type_: TransactionType,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

impl TransactionForm {
    /// Convert the form into a draft. Unparseable dates are treated as missing.
    pub fn into_draft(self) -> TransactionDraft {
        let date = self.date.as_deref().and_then(|date| {
            Date::parse(date.trim(), format_description!("[year]-[month]-[day]")).ok()
        });

        TransactionDraft {
            transaction_type: self.type_,
            amount: self.amount.trim().to_owned(),
            description: self.description,
            category: self.category.filter(|category| !category.trim().is_empty()),
            date,
        }
    }
}

fn field_error(message: Option<&str>) -> Markup {
    html! {
        @if let Some(message) = message {
            p class=(FORM_ERROR_STYLE) { (message) }
        }
    }
}

/// The category select for `transaction_type`, with `selected` chosen if it is allowed.
///
/// The type radio buttons replace this element when the type changes.
pub fn category_select(
    transaction_type: TransactionType,
    selected: Option<Category>,
    error_message: Option<&str>,
) -> Markup {
    let selected = selected.filter(|category| category.is_allowed_for(transaction_type));

    html! {
        div id="category-select"
        {
            label for="category" class=(FORM_LABEL_STYLE) { "Category" }

            select
                id="category"
                name="category"
                required
                class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" disabled selected[selected.is_none()] { "Select a category" }

                @for category in Category::allowed_for(transaction_type) {
                    option
                        value=(category.as_str())
                        selected[selected == Some(*category)]
                    {
                        (category.as_str())
                    }
                }
            }

            (field_error(error_message))
        }
    }
}

fn type_radio(transaction_type: TransactionType, current: TransactionType) -> Markup {
    let id = format!("transaction-type-{}", transaction_type.as_str());
    let label = match transaction_type {
        TransactionType::Income => "Income",
        TransactionType::Expense => "Expense",
    };

    html! {
        div class="flex items-center gap-3"
        {
            input
                name="type_"
                id=(id)
                type="radio"
                value=(transaction_type.as_str())
                checked[transaction_type == current]
                required
                hx-get=(endpoints::CATEGORY_OPTIONS)
                hx-trigger="change"
                hx-target="#category-select"
                hx-swap="outerHTML"
                class=(FORM_RADIO_INPUT_STYLE);

            label for=(id) class=(FORM_RADIO_LABEL_STYLE) { (label) }
        }
    }
}

/// The form for a new or existing transaction, showing `errors` next to their fields.
///
/// `max_date` is the latest date the date picker allows.
pub fn transaction_form(
    mode: EditorMode,
    draft: &TransactionDraft,
    errors: &FieldErrors,
    max_date: Date,
) -> Markup {
    let (create_url, update_url, submit_text) = match mode {
        EditorMode::Create => (Some(endpoints::TRANSACTIONS_API.to_owned()), None, "Add Transaction"),
        EditorMode::Edit(id) => (
            None,
            Some(format_endpoint(endpoints::TRANSACTION, id)),
            "Save Changes",
        ),
    };
    let date = draft.date.map(|date| date.to_string());

    html! {
        form
            hx-post=[create_url]
            hx-put=[update_url]
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="w-full space-y-4 md:space-y-6"
        {
            fieldset class="space-y-2"
            {
                legend class=(FORM_LABEL_STYLE) { "Transaction type" }

                div class=(FORM_RADIO_GROUP_STYLE)
                {
                    (type_radio(TransactionType::Expense, draft.transaction_type))
                    (type_radio(TransactionType::Income, draft.transaction_type))
                }
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                div class="input-wrapper w-full"
                {
                    input
                        name="amount"
                        id="amount"
                        type="number"
                        step="0.01"
                        min="0.01"
                        placeholder="0.00"
                        required
                        autofocus
                        value=(draft.amount)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                (field_error(errors.amount.as_deref()))
            }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                input
                    name="description"
                    id="description"
                    type="text"
                    minlength="2"
                    placeholder="e.g. Groceries"
                    required
                    value=(draft.description)
                    class=(FORM_TEXT_INPUT_STYLE);

                (field_error(errors.description.as_deref()))
            }

            (category_select(
                draft.transaction_type,
                draft.selected_category(),
                errors.category.as_deref(),
            ))

            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                input
                    name="date"
                    id="date"
                    type="date"
                    min=(MIN_TRANSACTION_DATE)
                    max=(max_date)
                    required
                    value=[date]
                    class=(FORM_TEXT_INPUT_STYLE);

                (field_error(errors.date.as_deref()))
            }

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                span id="indicator" class="inline htmx-indicator" { (loading_spinner()) }
                (submit_text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        endpoints,
        test_utils::{
            assert_form_input, assert_form_input_with_value, assert_form_submit_button,
            assert_hx_endpoint, assert_valid_html, form_error_messages, must_get_form,
        },
        transaction::{
            category::{Category, TransactionType},
            lifecycle::{EditorMode, FieldErrors, TransactionDraft},
        },
    };

    use super::{TransactionForm, category_select, transaction_form};

    fn selected_options(html: &Html) -> Vec<String> {
        html.select(&Selector::parse("option[selected]").unwrap())
            .map(|option| option.value().attr("value").unwrap_or_default().to_owned())
            .collect()
    }

    #[test]
    fn create_form_posts_to_transactions_api() {
        let draft = TransactionDraft::new(date!(2025 - 10 - 05));

        let html = Html::parse_fragment(
            &transaction_form(
                EditorMode::Create,
                &draft,
                &FieldErrors::default(),
                date!(2025 - 10 - 05),
            )
            .into_string(),
        );

        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::TRANSACTIONS_API, "hx-post");
        assert_hx_endpoint(&form, "#submit-button", "hx-disabled-elt");
        assert_form_input(&form, "amount", "number");
        assert_form_input(&form, "description", "text");
        assert_form_input_with_value(&form, "date", "date", "2025-10-05");
        assert_form_submit_button(&form, Some("Add Transaction"));
    }

    #[test]
    fn edit_form_puts_to_transaction() {
        let draft = TransactionDraft {
            transaction_type: TransactionType::Income,
            amount: "5000.00".to_owned(),
            description: "Salary".to_owned(),
            category: Some("Salary".to_owned()),
            date: Some(date!(2025 - 10 - 01)),
        };

        let html = Html::parse_fragment(
            &transaction_form(
                EditorMode::Edit(7),
                &draft,
                &FieldErrors::default(),
                date!(2025 - 10 - 05),
            )
            .into_string(),
        );

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, "/api/transactions/7", "hx-put");
        assert_form_input_with_value(&form, "amount", "number", "5000.00");
        assert_eq!(selected_options(&html), vec!["Salary"]);
        let checked = html
            .select(&Selector::parse("input[type=radio][checked]").unwrap())
            .map(|radio| radio.value().attr("value").unwrap_or_default())
            .collect::<Vec<_>>();
        assert_eq!(checked, vec!["income"]);
    }

    #[test]
    fn shows_field_errors() {
        let draft = TransactionDraft::new(date!(2025 - 10 - 05));
        let errors = FieldErrors {
            amount: Some("Amount must be positive.".to_owned()),
            category: Some("Please select a category.".to_owned()),
            ..Default::default()
        };

        let html = Html::parse_fragment(
            &transaction_form(EditorMode::Create, &draft, &errors, date!(2025 - 10 - 05))
                .into_string(),
        );

        assert_eq!(
            form_error_messages(&html.root_element()),
            vec!["Amount must be positive.", "Please select a category."]
        );
    }

    #[test]
    fn category_select_only_lists_allowed_categories() {
        let html = Html::parse_fragment(
            &category_select(TransactionType::Income, Some(Category::Food), None).into_string(),
        );

        let options = html
            .select(&Selector::parse("option").unwrap())
            .filter_map(|option| option.value().attr("value"))
            .filter(|value| !value.is_empty())
            .collect::<Vec<_>>();

        assert_eq!(options, vec!["Salary", "Investments", "Other"]);
        assert_eq!(selected_options(&html), vec![""]);
    }

    #[test]
    fn form_data_becomes_a_draft() {
        let form = TransactionForm {
            type_: TransactionType::Expense,
            amount: " 150.75 ".to_owned(),
            description: "Groceries".to_owned(),
            category: Some(String::new()),
            date: Some("2025-10-05".to_owned()),
        };

        let draft = form.into_draft();

        assert_eq!(draft.amount, "150.75");
        assert_eq!(draft.category, None);
        assert_eq!(draft.date, Some(date!(2025 - 10 - 05)));
    }

    #[test]
    fn bad_date_becomes_missing() {
        let form = TransactionForm {
            type_: TransactionType::Expense,
            amount: "1".to_owned(),
            description: "Bus".to_owned(),
            category: Some("Transport".to_owned()),
            date: Some("05/10/2025".to_owned()),
        };

        assert_eq!(form.into_draft().date, None);
    }
}
