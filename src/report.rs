// Copyright (C) Brian G. Milnes 2025

//! CSV reports: one row per path expression

pub mod report {
    use std::io::Write;

    use crate::analyzer::analyzer::Finding;

    pub const PATH_COLUMNS: [&str; 11] = [
        "file",
        "component",
        "start_line",
        "end_line",
        "source",
        "symbolic_path",
        "target_type",
        "target_name",
        "target_relative_path",
        "category",
        "review",
    ];

    pub const AUDIT_COLUMNS: [&str; 3] = ["replacement", "explanation", "worth_investigating"];

    /// RFC 4180 field: quoted when it holds a comma, quote or line break
    pub fn csv_field(value: &str) -> String {
        if value.contains([',', '"', '\n', '\r']) {
            format!("\"{}\"", value.replace('"', "\"\""))
        } else {
            value.to_string()
        }
    }

    fn write_row<W: Write>(out: &mut W, fields: &[String]) -> std::io::Result<()> {
        let line: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
        write!(out, "{}\r\n", line.join(","))
    }

    fn path_fields(finding: &Finding) -> Vec<String> {
        let expression = &finding.expression;
        let (target_type, target_name, target_relative) = match &finding.target {
            Some(target) => (
                target.component.type_name().to_string(),
                target.component.name().unwrap_or_default().to_string(),
                target.relative_path.clone(),
            ),
            None => (String::new(), String::new(), String::new()),
        };
        vec![
            finding.file.clone(),
            finding.file_component.component.to_string(),
            expression.start_line.to_string(),
            expression.end_line.to_string(),
            expression.source.clone(),
            expression.symbolic.clone(),
            target_type,
            target_name,
            target_relative,
            finding.category.map(|c| c.to_string()).unwrap_or_default(),
            finding.needs_review().to_string(),
        ]
    }

    pub fn write_path_report<'a, W, I>(out: &mut W, findings: I) -> std::io::Result<()>
    where
        W: Write,
        I: IntoIterator<Item = &'a Finding>,
    {
        let header: Vec<String> = PATH_COLUMNS.iter().map(|c| c.to_string()).collect();
        write_row(out, &header)?;
        for finding in findings {
            write_row(out, &path_fields(finding))?;
        }
        Ok(())
    }

    pub fn write_audit_report<'a, W, I>(out: &mut W, findings: I) -> std::io::Result<()>
    where
        W: Write,
        I: IntoIterator<Item = &'a Finding>,
    {
        let header: Vec<String> = PATH_COLUMNS
            .iter()
            .chain(AUDIT_COLUMNS.iter())
            .map(|c| c.to_string())
            .collect();
        write_row(out, &header)?;
        for finding in findings {
            let mut fields = path_fields(finding);
            fields.push(finding.decision.replacement.clone().unwrap_or_default());
            fields.push(finding.decision.explanation.clone());
            fields.push(finding.decision.worth_investigating.to_string());
            write_row(out, &fields)?;
        }
        Ok(())
    }
}
