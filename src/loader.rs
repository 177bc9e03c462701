use std::collections::HashMap;

use crate::record::Record;

/// Decode the CSV export of the sheet into records
///
/// The first line is the header row; its trimmed cells name the columns.
/// Only `name`, `item`, `qty`, `note` and `createdAt` are read (case-sensitive),
/// other columns are ignored and missing ones come out empty.
/// Every value is trimmed, rows with neither a name nor an item are dropped,
/// and the result is returned bottom row first since the sheet appends new
/// rows at the end.
///
/// # Arguments
/// * `text` - Raw CSV text as served by the read endpoint
///
/// # Returns
/// * `Vec<Record>` - Decoded rows, empty when there is no data row
///
/// # Examples
/// ```
/// use potluck::loader::decode;
///
/// let text = "name,item,qty,note,createdAt\nAlex,Chips,2,,2024-01-01\nSam,Cups,,,2024-01-02\n";
/// let records = decode(text);
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[0].name, "Sam");
/// ```
pub fn decode(text: &str) -> Vec<Record> {
    let lines: Vec<&str> = text.trim().lines().collect();

    if lines.len() < 2 {
        return Vec::new();
    }

    let headers: Vec<String> = parse_csv_row(lines[0])
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut records: Vec<Record> = lines[1..]
        .iter()
        .map(|line| row_to_record(&headers, &parse_csv_row(line)))
        .filter(Record::is_present)
        .collect();

    records.reverse();
    records
}

// Map one split row onto the known columns
fn row_to_record(headers: &[String], values: &[String]) -> Record {
    let mut row: HashMap<&str, &str> = HashMap::new();
    for (i, header) in headers.iter().enumerate() {
        let value = values.get(i).map(String::as_str).unwrap_or("");
        row.insert(header.as_str(), value.trim());
    }

    let field = |name: &str| row.get(name).copied().unwrap_or("").to_string();

    Record {
        name: field("name"),
        item: field("item"),
        qty: field("qty"),
        note: field("note"),
        created_at: field("createdAt"),
    }
}

/// Split one CSV line into its fields
///
/// A double quote toggles quoted mode, two double quotes inside a quoted
/// field produce one literal quote, and a comma ends a field only outside
/// quotes. The last field is emitted even without a trailing comma.
///
/// # Examples
/// ```
/// use potluck::loader::parse_csv_row;
///
/// assert_eq!(parse_csv_row(r#"Alex,"a,b""c","#), vec!["Alex", "a,b\"c", ""]);
/// ```
pub fn parse_csv_row(line: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current_field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    // Escaped quote
                    current_field.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                result.push(std::mem::take(&mut current_field));
            }
            _ => {
                current_field.push(c);
            }
        }
    }

    result.push(current_field);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HEADER: &str = "name,item,qty,note,createdAt";

    #[test]
    fn splits_plain_fields() {
        assert_eq!(parse_csv_row("a,b,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn keeps_commas_inside_quotes() {
        assert_eq!(parse_csv_row(r#""Chips, salted",2"#), vec!["Chips, salted", "2"]);
    }

    #[test]
    fn collapses_escaped_quotes() {
        assert_eq!(parse_csv_row(r#""a,b""c""#), vec![r#"a,b"c"#]);
    }

    #[test]
    fn emits_empty_fields() {
        assert_eq!(parse_csv_row(",,"), vec!["", "", ""]);
        assert_eq!(parse_csv_row(""), vec![""]);
    }

    #[test]
    fn fewer_than_two_lines_is_empty() {
        assert!(decode("").is_empty());
        assert!(decode(HEADER).is_empty());
        assert!(decode(&format!("{HEADER}\n\n")).is_empty());
    }

    #[test]
    fn decodes_rows_newest_first() {
        let text = format!(
            "{HEADER}\r\nAlex,Chips,2 bags,,2024-01-01T10:00:00Z\r\nSam,\"Cups, paper\",20,\"say \"\"hi\"\"\",2024-01-01T11:00:00Z\r\n"
        );
        let records = decode(&text);
        assert_eq!(
            records,
            vec![
                Record::new("Sam", "Cups, paper", "20", r#"say "hi""#, "2024-01-01T11:00:00Z"),
                Record::new("Alex", "Chips", "2 bags", "", "2024-01-01T10:00:00Z"),
            ]
        );
    }

    #[test]
    fn trims_headers_and_values() {
        let text = " name , item ,qty\n  Alex  ,  Chips , 2 ";
        let records = decode(text);
        assert_eq!(records, vec![Record::new("Alex", "Chips", "2", "", "")]);
    }

    #[test]
    fn ignores_unknown_and_tolerates_missing_columns() {
        let text = "Timestamp,item,name,extra\n2024,Bread,Lou,x";
        assert_eq!(decode(text), vec![Record::new("Lou", "Bread", "", "", "")]);
    }

    #[test]
    fn header_match_is_case_sensitive() {
        let text = "Name,Item\nAlex,Chips";
        assert!(decode(text).is_empty());
    }

    #[test]
    fn drops_rows_without_name_and_item() {
        let text = format!("{HEADER}\n , ,3,lonely note,2024-01-01\nAlex,,,,\n,Chips,,,");
        let records = decode(&text);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| !r.name.is_empty() || !r.item.is_empty()));
    }

    #[test]
    fn short_rows_default_to_empty() {
        let text = format!("{HEADER}\nAlex");
        assert_eq!(decode(&text), vec![Record::new("Alex", "", "", "", "")]);
    }
}
