use std::io::Write;

use childes_db::prelude::*;

use crate::args::OutputFormat;

pub(crate) enum Output {
    Table(ResultSet),
    Json(serde_json::Value),
    Text(String),
}

pub(crate) fn emit<W: Write>(
    output: &Output,
    format: OutputFormat,
    mut writer: W,
) -> Result<(), ChildesDbError> {
    match (output, format) {
        (Output::Table(table), OutputFormat::Csv) => table.write_csv(writer)?,
        (Output::Table(table), OutputFormat::Json) => {
            serde_json::to_writer_pretty(&mut writer, table)?;
            writeln!(writer)?;
        }
        (Output::Json(value), _) => {
            serde_json::to_writer_pretty(&mut writer, value)?;
            writeln!(writer)?;
        }
        (Output::Text(text), _) => writeln!(writer, "{text}")?,
    }
    Ok(())
}
