//! Alert fragments for displaying success and error messages to users.
//!
//! Endpoints driven by htmx render these fragments into the shared
//! `#alert-container` element via `hx-target-error`.

use maud::{Markup, html};

/// Alert message types for styling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertType {
    Success,
    Error,
}

/// Renders alert messages with appropriate styling
#[derive(Debug, Clone)]
pub struct AlertView<'a> {
    pub alert_type: AlertType,
    pub message: &'a str,
    pub details: &'a str,
}

impl<'a> AlertView<'a> {
    /// Create a new success alert
    #[allow(dead_code)]
    pub fn success(message: &'a str, details: &'a str) -> Self {
        Self {
            alert_type: AlertType::Success,
            message,
            details,
        }
    }

    /// Create a new error alert
    pub fn error(message: &'a str, details: &'a str) -> Self {
        Self {
            alert_type: AlertType::Error,
            message,
            details,
        }
    }

    pub fn into_html(self) -> Markup {
        let container_style = match self.alert_type {
            AlertType::Success => {
                "p-4 rounded-lg border bg-green-50 border-green-200 text-green-800 \
                dark:bg-green-900/30 dark:border-green-800 dark:text-green-200"
            }
            AlertType::Error => {
                "p-4 rounded-lg border bg-red-50 border-red-200 text-red-800 \
                dark:bg-red-900/30 dark:border-red-800 dark:text-red-200"
            }
        };

        html! {
            div
                class=(container_style)
                role="alert"
                onclick="this.parentElement.classList.add('hidden')"
            {
                p class="font-semibold" { (self.message) }

                @if !self.details.is_empty() {
                    p class="text-sm mt-1" { (self.details) }
                }

                script { "document.getElementById('alert-container').classList.remove('hidden');" }
            }
        }
    }
}
