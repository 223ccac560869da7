use serde::Serialize;
use serde_json::Value;
use std::io::{self, Write};

#[derive(clap::Args, Clone, Debug, Default)]
pub struct Output {
    /// How to format CLI output
    #[clap(global = true, short, long, value_enum)]
    pub output: Option<OutputType>,
}

#[derive(clap::ValueEnum, Debug, Copy, Clone, PartialEq, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputType {
    /// Format output as compact JSON with items separated by newlines
    Json,
    /// Format output as YAML
    Yaml,
    /// Format the output as a pretty-printed table
    Table,
}

/// A trait for things that can be output from the CLI as either JSON, YAML, or a table.
/// The body of this trait is focused on table output, since JSON and YAML are both handled
/// by `Serialize`.
pub trait CliOutput: Serialize {
    /// Allows threading through an alternate representation of table output.
    /// `type TableAlt = ();` is used to opt out of having an alternative representation.
    type TableAlt: Copy;
    /// The type output from `into_table_row`. Common types are `String` and `JsonCell`, or
    /// anything implementing `std::fmt::Display`.
    type CellValue: Into<comfy_table::Cell>;

    /// Returns the column headers of the table.
    fn table_headers(alt: Self::TableAlt) -> Vec<&'static str>;

    /// Converts this item into a tablular representation. The returned cells must be in the
    /// same order as the `table_headers`.
    fn into_table_row(self, alt: Self::TableAlt) -> Vec<Self::CellValue>;
}

pub fn print_yaml(items: impl IntoIterator<Item = impl CliOutput>) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    for item in items {
        serde_yaml::to_writer(&mut stdout, &item)?;
        stdout.write_all(b"\n")?;
    }
    Ok(())
}

pub fn print_json(items: impl IntoIterator<Item = impl CliOutput>) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    for item in items {
        serde_json::to_writer(&mut stdout, &item)?;
        stdout.write_all(b"\n")?;
    }
    Ok(())
}

pub fn print_table<T: CliOutput>(
    alt: T::TableAlt,
    items: impl IntoIterator<Item = T>,
) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();

    for line in render_table(alt, items).lines() {
        stdout.write_all(line.as_bytes())?;
        stdout.write_all(b"\n")?;
    }
    Ok(())
}

fn render_table<T: CliOutput>(
    alt: T::TableAlt,
    items: impl IntoIterator<Item = T>,
) -> comfy_table::Table {
    let mut table = crate::new_table(T::table_headers(alt));

    for item in items {
        table.add_row(item.into_table_row(alt));
    }
    table
}

/// Converts an item implementing `Serialize` into a table row by extracting values
/// using the given list of JSON `pointers`. This function is often used to implement
/// `CliOutput::into_table_row`. Missing locations produce empty cells.
pub fn to_table_row<T: Serialize>(value: T, pointers: &[&str]) -> Vec<JsonCell> {
    let mut json = match serde_json::to_value(value) {
        Ok(json) => json,
        Err(error) => {
            tracing::warn!(%error, "failed to serialize table row");
            Value::Null
        }
    };

    let mut row = Vec::with_capacity(pointers.len());
    for column in pointers {
        let val = json.pointer_mut(column).map(Value::take);
        row.push(JsonCell(val));
    }
    row
}

/// A wrapper around an `Option<Value>` to allow it to be converted into a table cell.
/// Arrays of strings are rendered one item per line.
pub struct JsonCell(pub Option<Value>);

impl From<JsonCell> for comfy_table::Cell {
    fn from(cell: JsonCell) -> Self {
        match cell.0 {
            None | Some(Value::Null) => comfy_table::Cell::new(String::new()),
            Some(Value::String(s)) => comfy_table::Cell::new(s),
            Some(Value::Array(items)) if items.iter().all(Value::is_string) => {
                let lines: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
                comfy_table::Cell::new(lines.join("\n"))
            }
            Some(other) => comfy_table::Cell::new(other),
        }
    }
}
