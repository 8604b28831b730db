use std::collections::HashMap;
use std::io::Write;
use std::time::Instant;

use extoast_core::{Element, ElementId, PlacementParams, SurfaceError, SurfaceHost};
use parking_lot::Mutex;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SurfaceEvent<'a> {
    event: &'static str,
    element: u64,
    text: String,
    elapsed_ms: u64,
    gravity: String,
    x: i32,
    y: i32,
    window_type: &'a str,
}

/// Surface host that reports attach/detach as JSON lines on stdout.
pub struct TerminalSurface {
    started: Instant,
    attached: Mutex<HashMap<ElementId, PlacementParams>>,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            attached: Mutex::new(HashMap::new()),
        }
    }

    fn emit(
        &self,
        event: &'static str,
        element: &Element,
        params: &PlacementParams,
    ) -> Result<(), SurfaceError> {
        let line = SurfaceEvent {
            event,
            element: element.id().get(),
            text: element
                .message()
                .unwrap_or_else(|| element.label().to_string()),
            elapsed_ms: self.started.elapsed().as_millis() as u64,
            gravity: params.gravity.to_string(),
            x: params.x,
            y: params.y,
            window_type: params.window_type.as_str(),
        };
        let json = serde_json::to_string(&line).map_err(|e| SurfaceError::Rejected(e.to_string()))?;
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", json)
            .and_then(|_| stdout.flush())
            .map_err(|e| SurfaceError::Rejected(e.to_string()))
    }
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceHost for TerminalSurface {
    fn add_element(&self, element: &Element, params: &PlacementParams) -> Result<(), SurfaceError> {
        self.emit("attach", element, params)?;
        self.attached.lock().insert(element.id(), params.clone());
        Ok(())
    }

    fn remove_element(&self, element: &Element) -> Result<(), SurfaceError> {
        let params = self
            .attached
            .lock()
            .remove(&element.id())
            .ok_or(SurfaceError::NotAttached)?;
        self.emit("detach", element, &params)
    }
}
