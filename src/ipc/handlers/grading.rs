use crate::calc::{self, CalcError};
use crate::config::{GradingSettings, SettingsPatch};
use crate::facilitators;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::model::{ProcessedStudent, StudentRecord};
use crate::stats::{self, ClassStatistics};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClassParams {
    students: Vec<StudentRecord>,
    subjects: Vec<String>,
    /// Per-call override merged over the session settings.
    #[serde(default)]
    settings: Option<SettingsPatch>,
}

/// Success or a ready-made error envelope.
type Reply = Result<serde_json::Value, serde_json::Value>;

struct GradedClass {
    statistics: ClassStatistics,
    students: Vec<ProcessedStudent>,
}

fn parse_params(req: &Request) -> Result<ClassParams, serde_json::Value> {
    serde_json::from_value(req.params.clone())
        .map_err(|e| err(&req.id, "bad_params", e.to_string(), None))
}

fn effective_settings(state: &AppState, params: &ClassParams) -> GradingSettings {
    match &params.settings {
        Some(patch) => state.settings.with_patch(patch),
        None => state.settings.clone(),
    }
}

fn calc_err(req: &Request, e: CalcError) -> serde_json::Value {
    tracing::warn!(id = %req.id, error = %e, "grading failed");
    let details = match &e {
        CalcError::NonFiniteScore {
            student_id,
            subject,
        } => json!({ "studentId": student_id, "subject": subject }),
    };
    err(&req.id, e.code(), e.to_string(), Some(details))
}

fn grade_class(
    req: &Request,
    params: &ClassParams,
    settings: &GradingSettings,
) -> Result<GradedClass, serde_json::Value> {
    let statistics = stats::compute_class_statistics(&params.students, &params.subjects);
    let students =
        calc::process_students(&statistics, &params.students, &params.subjects, settings)
            .map_err(|e| calc_err(req, e))?;
    Ok(GradedClass {
        statistics,
        students,
    })
}

fn to_json<T: serde::Serialize>(req: &Request, v: &T) -> Reply {
    serde_json::to_value(v).map_err(|e| err(&req.id, "internal", e.to_string(), None))
}

fn handle_class_statistics(req: &Request) -> Reply {
    let params = parse_params(req)?;
    let statistics = stats::compute_class_statistics(&params.students, &params.subjects);
    Ok(ok(&req.id, to_json(req, &statistics)?))
}

fn handle_process_class(state: &AppState, req: &Request) -> Reply {
    let params = parse_params(req)?;
    let settings = effective_settings(state, &params);
    let graded = grade_class(req, &params, &settings)?;
    let summary = calc::summarize_class(&graded.students, &graded.statistics);
    Ok(ok(
        &req.id,
        json!({
            "statistics": to_json(req, &graded.statistics)?,
            "students": to_json(req, &graded.students)?,
            "summary": to_json(req, &summary)?,
        }),
    ))
}

fn handle_facilitator_stats(state: &AppState, req: &Request) -> Reply {
    let params = parse_params(req)?;
    let settings = effective_settings(state, &params);
    let graded = grade_class(req, &params, &settings)?;
    let facilitators = facilitators::compute_facilitator_stats(&graded.students);
    Ok(ok(&req.id, json!({ "facilitators": to_json(req, &facilitators)? })))
}

fn handle_report(state: &AppState, req: &Request) -> Reply {
    let params = parse_params(req)?;
    let settings = effective_settings(state, &params);
    let graded = grade_class(req, &params, &settings)?;
    let summary = calc::summarize_class(&graded.students, &graded.statistics);
    let facilitators = facilitators::compute_facilitator_stats(&graded.students);
    Ok(ok(
        &req.id,
        json!({
            "statistics": to_json(req, &graded.statistics)?,
            "students": to_json(req, &graded.students)?,
            "summary": to_json(req, &summary)?,
            "facilitators": to_json(req, &facilitators)?,
        }),
    ))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "grading.classStatistics" => handle_class_statistics(req),
        "grading.processClass" => handle_process_class(state, req),
        "grading.facilitatorStats" => handle_facilitator_stats(state, req),
        "grading.report" => handle_report(state, req),
        _ => return None,
    };
    Some(result.unwrap_or_else(|e| e))
}
