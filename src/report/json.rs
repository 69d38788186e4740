use crate::report::RunSummary;

pub fn render_summary_json(data: &RunSummary) -> Result<String, serde_json::Error> {
    let mut out = serde_json::to_string_pretty(data)?;
    out.push('\n');
    Ok(out)
}
