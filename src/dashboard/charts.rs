//! Chart generation and rendering for the dashboard.
//!
//! This module creates ECharts visualizations for financial data:
//! - **Expenses by Category**: pie chart of expense totals per category
//! - **Income vs Expenses**: bar chart of monthly totals for the last six months
//!
//! Each chart is generated as JSON configuration for the ECharts library and
//! rendered with corresponding HTML containers and JavaScript initialization code.

use std::collections::HashMap;

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, JsFunction, Tooltip, Trigger,
    },
    series::{Pie, bar},
};
use maud::PreEscaped;
use time::{Date, Month};

use crate::{
    category::Category,
    dashboard::stats::previous_month,
    html::HeadElement,
    transaction::{Transaction, TransactionKind},
};

/// The label and slice color for expenses without a category.
const UNCATEGORIZED_LABEL: &str = "Uncategorized";
const UNCATEGORIZED_COLOR: &str = "#6B7280";

/// Bar colors for the income and expense series.
const INCOME_COLOR: &str = "#4ADE80";
const EXPENSE_COLOR: &str = "#F87171";

/// How many months of history the bar chart shows.
const BAR_CHART_MONTHS: usize = 6;

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Generates JavaScript initialization code for dashboard charts.
///
/// Creates scripts that initialize ECharts instances with dark mode support
/// and responsive resizing.
pub(super) fn charts_script(charts: &[DashboardChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

/// Pie chart of expense totals per category, all time.
pub(super) fn expenses_by_category_chart(
    transactions: &[Transaction],
    categories: &[Category],
) -> Chart {
    let totals = expense_totals_by_category(transactions, categories);

    let colors: Vec<charming::element::Color> = totals
        .iter()
        .map(|(_, _, color)| color.as_str().into())
        .collect();
    let data: Vec<(f64, &str)> = totals
        .iter()
        .map(|(name, total, _)| (*total, name.as_str()))
        .collect();

    Chart::new()
        .title(Title::new().text("Expenses by Category"))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter()),
        )
        .legend(Legend::new().left("right").top("center"))
        .color(colors)
        .series(Pie::new().name("Expenses").radius("60%").data(data))
}

/// Bar chart of income and expense totals for the last six months.
pub(super) fn income_expense_chart(transactions: &[Transaction], today: Date) -> Chart {
    let months = trailing_months(today, BAR_CHART_MONTHS);
    let labels = month_labels(&months);
    let income = monthly_kind_totals(transactions, &months, TransactionKind::Income);
    let expenses = monthly_kind_totals(transactions, &months, TransactionKind::Expense);

    let bar_colors: Vec<charming::element::Color> =
        vec![INCOME_COLOR.into(), EXPENSE_COLOR.into()];

    Chart::new()
        .title(Title::new().text("Income vs Expenses").subtext("Last six months"))
        .tooltip(currency_tooltip())
        .legend(Legend::new().left("right"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .color(bar_colors)
        .series(bar::Bar::new().name("Income").data(income))
        .series(bar::Bar::new().name("Expenses").data(expenses))
}

/// Sums expense amounts per category, resolving names and colors.
///
/// Categories without expenses are omitted; expenses without a category are
/// grouped under [UNCATEGORIZED_LABEL], which sorts last. The other entries
/// keep the alphabetical category order.
pub(super) fn expense_totals_by_category(
    transactions: &[Transaction],
    categories: &[Category],
) -> Vec<(String, f64, String)> {
    let mut totals: HashMap<Option<i64>, f64> = HashMap::new();

    for transaction in transactions
        .iter()
        .filter(|transaction| transaction.kind == TransactionKind::Expense)
    {
        *totals.entry(transaction.category_id).or_insert(0.0) += transaction.amount;
    }

    let mut result = Vec::new();

    for category in categories {
        if let Some(total) = totals.get(&Some(category.id)) {
            result.push((
                category.name.to_string(),
                *total,
                category.color.to_string(),
            ));
        }
    }

    // Expenses referencing a deleted category are folded into the
    // uncategorized slice rather than dropped.
    let uncategorized: f64 = totals
        .iter()
        .filter(|(category_id, _)| {
            category_id.is_none_or(|id| !categories.iter().any(|category| category.id == id))
        })
        .map(|(_, total)| total)
        .sum();

    if uncategorized > 0.0 {
        result.push((
            UNCATEGORIZED_LABEL.to_owned(),
            uncategorized,
            UNCATEGORIZED_COLOR.to_owned(),
        ));
    }

    result
}

/// The last `count` calendar months ending with the month of `today`, in
/// chronological order.
pub(super) fn trailing_months(today: Date, count: usize) -> Vec<(Month, i32)> {
    let mut months = Vec::with_capacity(count);
    let mut current = (today.month(), today.year());

    for _ in 0..count {
        months.push(current);
        current = previous_month(current.0, current.1);
    }

    months.reverse();
    months
}

/// Formats months as a three-letter abbreviation with a two-digit year,
/// e.g. "Mar 25".
pub(super) fn month_labels(months: &[(Month, i32)]) -> Vec<String> {
    let month_to_str = |month: Month| match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    };

    months
        .iter()
        .map(|(month, year)| format!("{} {:02}", month_to_str(*month), year.rem_euclid(100)))
        .collect()
}

/// Sums amounts of `kind` per month, with one entry per month in `months`.
pub(super) fn monthly_kind_totals(
    transactions: &[Transaction],
    months: &[(Month, i32)],
    kind: TransactionKind,
) -> Vec<f64> {
    months
        .iter()
        .map(|(month, year)| {
            transactions
                .iter()
                .filter(|transaction| {
                    transaction.kind == kind
                        && transaction.date.month() == *month
                        && transaction.date.year() == *year
                })
                .map(|transaction| transaction.amount)
                .sum()
        })
        .collect()
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}
