//! JSON line I/O for the session loop
//!
//! - Input: one JSON object per line
//! - Output: one JSON object per line
//! - Blank input lines are skipped

use std::io::{BufRead, Write};

use serde_json::{json, Value};

use super::errors::{CliError, CliResult};

/// Read JSON requests line by line
pub fn read_requests<R: BufRead>(input: R) -> impl Iterator<Item = CliResult<Value>> {
    input
        .lines()
        .filter(|line| !matches!(line, Ok(l) if l.trim().is_empty()))
        .map(|line| {
            let line = line.map_err(CliError::from)?;
            serde_json::from_str(&line).map_err(CliError::from)
        })
}

/// Write a success response
pub fn write_response<W: Write>(out: &mut W, data: Value) -> CliResult<()> {
    write_line(out, &json!({ "status": "ok", "data": data }))
}

/// Write an error response
pub fn write_error<W: Write>(out: &mut W, code: &str, message: &str) -> CliResult<()> {
    write_line(
        out,
        &json!({ "status": "error", "code": code, "message": message }),
    )
}

fn write_line<W: Write>(out: &mut W, response: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *out, response).map_err(|e| CliError::Io(e.to_string()))?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_skips_blank_lines() {
        let input = b"{\"op\":\"metrics\"}\n\n  \n{\"op\":\"shutdown\"}\n";
        let requests: Vec<_> = read_requests(&input[..]).collect();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].as_ref().unwrap()["op"], "shutdown");
    }

    #[test]
    fn test_read_bad_json() {
        let mut requests = read_requests(&b"{not json\n"[..]);
        let err = requests.next().unwrap().unwrap_err();
        assert_eq!(err.code(), "DOCSTORE_INVALID_REQUEST");
    }

    #[test]
    fn test_write_lines() {
        let mut out = Vec::new();
        write_response(&mut out, json!({"id": "a"})).unwrap();
        write_error(&mut out, "E", "bad").unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines[0], json!({"status": "ok", "data": {"id": "a"}}));
        assert_eq!(lines[1]["status"], "error");
        assert_eq!(lines[1]["code"], "E");
    }
}
