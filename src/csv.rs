// src/csv.rs
use std::io::Write;

use crate::data::{Column, LinkColumn, Record, column_layout};

/// Spreadsheet apps need the BOM to read the file as UTF-8.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Header row plus one row per record. Link columns are followed by their
/// URL column.
pub fn write_records<W: Write>(mut w: W, records: &[Record], links: &[LinkColumn]) -> Result<(), ::csv::Error> {
    w.write_all(UTF8_BOM)?;

    let columns = column_layout(records, links, true);
    let mut out = ::csv::Writer::from_writer(w);
    out.write_record(columns.iter().map(Column::header))?;
    for r in records {
        out.write_record(columns.iter().map(|c| c.render(r)))?;
    }
    out.flush()?;
    Ok(())
}

pub fn to_bytes(records: &[Record], links: &[LinkColumn]) -> Result<Vec<u8>, ::csv::Error> {
    let mut buf = Vec::new();
    write_records(&mut buf, records, links)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Cell;

    #[test]
    fn starts_with_bom_and_quotes_commas() {
        let recs = vec![record! {
            "公司名称" => Cell::link("甲, 乙", "https://example.com/x"),
            "岗位" => "后端",
        }];
        let bytes = to_bytes(&recs, &[LinkColumn::new("公司名称")]).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));

        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("公司名称,公司名称链接,岗位"));
        assert_eq!(lines.next(), Some("\"甲, 乙\",https://example.com/x,后端"));
    }
}
