//! Stat cards showing totals and month-over-month trends.

use maud::{Markup, html};

use crate::{dashboard::stats::TransactionSummary, html::format_currency};

/// Renders the row of stat cards at the top of the dashboard.
pub(super) fn stat_cards_view(summary: &TransactionSummary) -> Markup {
    html! {
        section class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 md:grid-cols-3 gap-4"
            {
                (stat_card(
                    "Total Income",
                    summary.total_income,
                    Some(Trend {
                        value: summary.income_trend,
                        // More income than last month is good news.
                        is_positive: summary.income_trend >= 0.0,
                    }),
                ))

                (stat_card(
                    "Total Expenses",
                    summary.total_expense,
                    Some(Trend {
                        value: summary.expense_trend,
                        // More spending than last month is bad news.
                        is_positive: summary.expense_trend <= 0.0,
                    }),
                ))

                (stat_card("Balance", summary.balance, None))
            }
        }
    }
}

struct Trend {
    value: f64,
    is_positive: bool,
}

fn stat_card(title: &str, amount: f64, trend: Option<Trend>) -> Markup {
    html! {
        div class="bg-white dark:bg-gray-800 border border-gray-200 dark:border-gray-700
            rounded-lg p-6 shadow-md hover:shadow-lg transition-shadow"
        {
            p class="text-sm font-medium text-gray-600 dark:text-gray-400 mb-1" { (title) }

            h3 class="text-3xl font-bold" { (format_currency(amount)) }

            @if let Some(trend) = trend {
                (trend_line(&trend))
            }
        }
    }
}

fn trend_line(trend: &Trend) -> Markup {
    let style = if trend.is_positive {
        "text-sm mt-2 text-green-600 dark:text-green-400"
    } else {
        "text-sm mt-2 text-red-600 dark:text-red-400"
    };
    let arrow = if trend.value >= 0.0 { "↑" } else { "↓" };

    html! {
        p class=(style)
        {
            (arrow) " " (format!("{:.1}", trend.value.abs())) "% from last month"
        }
    }
}
