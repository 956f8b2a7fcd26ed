//! CSV serialization of a transaction subset.

use csv::{QuoteStyle, WriterBuilder};

use crate::{
    Error,
    category::Category,
    export::{category_name_index, resolve_category_name},
    transaction::Transaction,
};

/// The header row of exported CSV files.
const CSV_HEADERS: [&str; 6] = ["Date", "Title", "Category", "Type", "Amount", "Description"];

/// Serialize `transactions` to CSV text, one row per transaction in input
/// order.
///
/// Every field is quoted and embedded quotes are doubled. Amounts are
/// rendered with exactly two decimal digits. Missing category references
/// render as "Uncategorized" and dangling ones as "Unknown".
///
/// # Errors
/// Returns an [Error::CsvError] if a record cannot be written.
pub fn transactions_to_csv(
    transactions: &[&Transaction],
    categories: &[Category],
) -> Result<String, Error> {
    let category_names = category_name_index(categories);

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(Vec::new());

    writer
        .write_record(CSV_HEADERS)
        .map_err(|error| Error::CsvError(error.to_string()))?;

    for transaction in transactions {
        writer
            .write_record([
                transaction.date.to_string().as_str(),
                &transaction.title,
                resolve_category_name(transaction.category_id, &category_names),
                transaction.kind.as_str(),
                &format!("{:.2}", transaction.amount),
                transaction.description.as_deref().unwrap_or(""),
            ])
            .map_err(|error| Error::CsvError(error.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))?;

    String::from_utf8(bytes).map_err(|error| Error::CsvError(error.to_string()))
}
