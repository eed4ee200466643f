use crate::core::ExecutionStep;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

const HEADER: [&str; 4] = ["step", "line", "variables", "description"];

/// Write the state table as CSV
pub fn write_state_table<W: Write>(writer: W, steps: &[ExecutionStep]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;
    for step in steps {
        wtr.write_record([
            step.step.to_string(),
            step.line.to_string(),
            step.variables_inline(),
            step.description.clone(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_state_table(path: &Path, steps: &[ExecutionStep]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_state_table(file, steps)
        .with_context(|| format!("Failed to export state table to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::VariableEntry;

    #[test]
    fn test_state_table_layout() {
        let steps = vec![
            ExecutionStep {
                step: 1,
                line: 2,
                variables: vec![VariableEntry { name: "sum".into(), value: "0".into() }],
                description: "init, then loop".to_string(),
            },
            ExecutionStep {
                step: 2,
                line: 4,
                variables: vec![
                    VariableEntry { name: "i".into(), value: "1".into() },
                    VariableEntry { name: "sum".into(), value: "1".into() },
                ],
                description: "add".to_string(),
            },
        ];

        let mut out = Vec::new();
        write_state_table(&mut out, &steps).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "step,line,variables,description");
        assert_eq!(lines[1], "1,2,sum=0,\"init, then loop\"");
        assert_eq!(lines[2], "2,4,i=1; sum=1,add");
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.csv");
        export_state_table(&path, &[]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim(), "step,line,variables,description");
    }
}
