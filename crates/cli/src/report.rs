use sense_graph::{BuildStats, Resolution, SessionReport};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub(crate) struct ContextOutput {
    pub id: String,
    pub assignments: Vec<AssignmentOutput>,
    pub stats: BuildStats,
}

#[derive(Debug, Serialize)]
pub(crate) struct AssignmentOutput {
    pub term: String,
    pub pos: String,
    pub sense: Option<String>,
    pub degree: Option<usize>,
    pub confidence: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct NetworkStats {
    pub senses: usize,
    pub relations: usize,
    pub lexicon_entries: usize,
}

impl ContextOutput {
    pub(crate) fn from_report(id: String, report: &SessionReport) -> Self {
        let assignments = report
            .assignments
            .iter()
            .map(|assignment| {
                let (degree, confidence, reason) = match &assignment.resolution {
                    Resolution::Resolved {
                        degree, confidence, ..
                    } => (Some(*degree), Some(*confidence), None),
                    Resolution::Unresolved { reason } => (None, None, Some(reason.to_string())),
                };
                AssignmentOutput {
                    term: assignment.sod.term.clone(),
                    pos: assignment.sod.pos.to_string(),
                    sense: report.sense_key(assignment).map(str::to_string),
                    degree,
                    confidence,
                    reason,
                }
            })
            .collect();

        Self {
            id,
            assignments,
            stats: report.stats.clone(),
        }
    }
}

/// Markdown summary of a disambiguation run
pub(crate) fn render_summary(outputs: &[ContextOutput]) -> String {
    let total: usize = outputs.iter().map(|o| o.assignments.len()).sum();
    let resolved: usize = outputs
        .iter()
        .flat_map(|o| &o.assignments)
        .filter(|a| a.sense.is_some())
        .count();
    let truncated = outputs.iter().filter(|o| o.stats.truncated).count();

    let mut md = String::new();
    md.push_str("# Sense disambiguation report\n\n");
    md.push_str(&format!("- Contexts: `{}`\n", outputs.len()));
    md.push_str(&format!("- Terms: `{total}` (resolved `{resolved}`)\n"));
    md.push_str(&format!("- Truncated builds: `{truncated}`\n\n"));

    md.push_str("| context | term | pos | sense | degree |\n");
    md.push_str("|---|---|---|---|---:|\n");
    for output in outputs {
        for a in &output.assignments {
            md.push_str(&format!(
                "| `{}` | `{}` | `{}` | `{}` | `{}` |\n",
                output.id,
                a.term,
                a.pos,
                a.sense.as_deref().unwrap_or("-"),
                a.degree.map_or("-".to_string(), |d| d.to_string()),
            ));
        }
    }

    md
}
