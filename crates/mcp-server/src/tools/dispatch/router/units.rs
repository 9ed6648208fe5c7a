use super::super::SystemdService;
use super::error::{invalid_request, unit_error};
use crate::tools::render::{change_views, json_content, json_contents, properties_view, unit_view};
use crate::tools::schemas::units::{
    EnableOrDisableUnitRequest, ListUnitFilesRequest, ListUnitsByNameRequest,
    ListUnitsByStateRequest,
};
use rmcp::model::{CallToolResult, Content};
use rmcp::ErrorData as McpError;
use systemd_mcp_units::{
    describe_changes, observed_states, validate_state, UnitError, UnitOperation,
};

pub(in crate::tools::dispatch) async fn list_units_by_state(
    service: &SystemdService,
    request: ListUnitsByStateRequest,
) -> Result<CallToolResult, McpError> {
    let state = match validate_state(request.state.as_deref().unwrap_or_default()) {
        Ok(state) => state,
        Err(err) => return Ok(unit_error(&err)),
    };
    let filter = (state != "all").then(|| vec![state.to_string()]);
    let units = match service.units.list_units(filter.as_deref()).await {
        Ok(units) => units,
        Err(err) => return Ok(unit_error(&err)),
    };
    let verbose = request.verbose.unwrap_or(false);
    let views: Vec<_> = units.iter().map(|unit| unit_view(unit, verbose)).collect();
    Ok(CallToolResult::success(json_contents(&views)?))
}

pub(in crate::tools::dispatch) async fn list_units_by_name(
    service: &SystemdService,
    request: ListUnitsByNameRequest,
) -> Result<CallToolResult, McpError> {
    let patterns: Vec<String> = request
        .names
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();
    if patterns.is_empty() {
        return Ok(invalid_request("names must contain at least one unit name or pattern"));
    }

    let units = match service.units.list_units_by_patterns(&[], &patterns).await {
        Ok(units) => units,
        Err(err) => return Ok(unit_error(&err)),
    };
    if units.is_empty() {
        return Ok(unit_error(&UnitError::NotFound(patterns)));
    }

    let verbose = request.verbose.unwrap_or(false);
    let mut contents = Vec::with_capacity(units.len());
    for unit in &units {
        let props = match service.units.get_properties(&unit.name).await {
            Ok(props) => props,
            Err(err) => return Ok(unit_error(&err)),
        };
        contents.push(json_content(&properties_view(props, verbose))?);
    }
    Ok(CallToolResult::success(contents))
}

pub(in crate::tools::dispatch) async fn list_unit_states(
    service: &SystemdService,
) -> Result<CallToolResult, McpError> {
    match service.units.list_units(None).await {
        Ok(units) => Ok(CallToolResult::success(vec![json_content(
            &observed_states(&units),
        )?])),
        Err(err) => Ok(unit_error(&err)),
    }
}

pub(in crate::tools::dispatch) async fn enable_or_disable_unit(
    service: &SystemdService,
    request: EnableOrDisableUnitRequest,
) -> Result<CallToolResult, McpError> {
    let operation = if request.disable.unwrap_or(false) {
        UnitOperation::Disable
    } else {
        UnitOperation::Enable
    };
    let files = vec![request.file.trim().to_string()];
    let changes = match service.jobs.change_unit_files(operation, &files).await {
        Ok(changes) => changes,
        Err(err) => return Ok(unit_error(&err)),
    };
    log::info!("{operation} {}: {} change(s)", files[0], changes.len());
    if changes.is_empty() {
        return Ok(CallToolResult::success(vec![Content::text(
            describe_changes(&files, &changes),
        )]));
    }
    Ok(CallToolResult::success(json_contents(&change_views(
        &changes,
    ))?))
}

pub(in crate::tools::dispatch) async fn list_unit_files(
    service: &SystemdService,
    request: ListUnitFilesRequest,
) -> Result<CallToolResult, McpError> {
    let files = match service.units.list_unit_files().await {
        Ok(files) => files,
        Err(err) => return Ok(unit_error(&err)),
    };
    let state = request
        .state
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let files: Vec<_> = files
        .into_iter()
        .filter(|file| state.map_or(true, |s| file.state == s))
        .collect();
    Ok(CallToolResult::success(json_contents(&files)?))
}
