//! Table formatting utilities

use prettytable::{Cell, Row, Table};

/// Create a table with bold headers and no separators between rows
pub fn create_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_format(*prettytable::format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

    let header_cells: Vec<Cell> = headers
        .iter()
        .map(|h| Cell::new(h).style_spec("b"))
        .collect();
    table.set_titles(Row::new(header_cells));

    table
}

/// Add a row of displayable values to a table
pub fn add_table_row<I, T>(table: &mut Table, cells: I)
where
    I: IntoIterator<Item = T>,
    T: ToString,
{
    let row_cells: Vec<Cell> = cells
        .into_iter()
        .map(|value| Cell::new(&value.to_string()))
        .collect();
    table.add_row(Row::new(row_cells));
}
