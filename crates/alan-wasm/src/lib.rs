use alan_core::{DecodedResult, Machine, MachineConfig, NullSink, RuntimeFault};
use alan_lang::{
    compile, run_source_traced, Diagnostic, Diagnostics, RunOptions, RunReport, TraceRenderer,
};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// JS-compatible version of Diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WasmDiagnostic {
    pub severity: String,
    pub location: String,
    pub message: String,
    pub formatted: String,
}

impl From<&Diagnostic> for WasmDiagnostic {
    fn from(diagnostic: &Diagnostic) -> Self {
        Self {
            severity: diagnostic.severity.to_string(),
            location: diagnostic.location.to_string(),
            message: diagnostic.message(),
            formatted: diagnostic.format_for_stderr(),
        }
    }
}

/// JS-compatible version of RunReport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WasmRunReport {
    pub diagnostics: Vec<WasmDiagnostic>,
    pub overflowed: bool,
    pub steps: usize,
    pub final_configuration: Option<String>,
    pub raw: Option<String>,
    pub text: Option<String>,
    pub numeric: Option<f64>,
    pub trace: Option<String>,
    pub fault: Option<RuntimeFault>,
}

impl WasmRunReport {
    fn new(report: RunReport, trace: Option<String>) -> Self {
        let RunReport {
            diagnostics,
            steps,
            final_configuration,
            result,
            fault,
        } = report;
        let (raw, text, numeric) = match result {
            Some(DecodedResult { raw, text, numeric }) => (Some(raw), Some(text), Some(numeric)),
            None => (None, None, None),
        };

        Self {
            diagnostics: convert_diagnostics(&diagnostics),
            overflowed: diagnostics.overflowed(),
            steps,
            final_configuration,
            raw,
            text,
            numeric,
            trace,
            fault,
        }
    }
}

fn convert_diagnostics(diagnostics: &Diagnostics) -> Vec<WasmDiagnostic> {
    diagnostics.iter().map(WasmDiagnostic::from).collect()
}

/// Compiles and runs `source`, optionally rendering the step trace.
#[must_use]
pub fn build_report(source: &str, iterations: usize, verbose: bool) -> WasmRunReport {
    let mut options = RunOptions::new(iterations);
    options.machine.tracing_enabled = verbose;

    if !verbose {
        let report = run_source_traced(source, &options, &mut NullSink);
        return WasmRunReport::new(report, None);
    }

    let mut renderer = TraceRenderer::new(Vec::new());
    let report = run_source_traced(source, &options, &mut renderer);
    let trace = renderer
        .finish()
        .ok()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned());
    WasmRunReport::new(report, trace)
}

/// Runs a machine description and returns the report as a JSON object.
///
/// # Errors
///
/// Returns the serialization error when the report cannot be converted.
#[wasm_bindgen]
pub fn run(source: &str, iterations: usize, verbose: bool) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();
    let report = build_report(source, iterations, verbose);
    web_sys::console::debug_1(&JsValue::from_str(&format!(
        "alan: {} steps, {} diagnostics",
        report.steps,
        report.diagnostics.len()
    )));
    Ok(serde_wasm_bindgen::to_value(&report)?)
}

#[wasm_bindgen]
pub struct WasmMachine {
    machine: Machine,
}

#[wasm_bindgen]
impl WasmMachine {
    /// Compiles `source` for stepwise execution.
    ///
    /// # Errors
    ///
    /// Throws the diagnostics array when the source has errors, or a message
    /// for an empty tape.
    #[wasm_bindgen(constructor)]
    pub fn new(source: &str, tape_capacity: usize) -> Result<Self, JsValue> {
        console_error_panic_hook::set_once();
        if tape_capacity == 0 {
            return Err(JsValue::from_str("tape must have at least one cell"));
        }

        let mut diagnostics = Diagnostics::new();
        let Some(program) = compile(source, &mut diagnostics) else {
            return Err(serde_wasm_bindgen::to_value(&convert_diagnostics(
                &diagnostics,
            ))?);
        };

        let config = MachineConfig {
            tape_capacity,
            ..MachineConfig::default()
        };
        Ok(Self {
            machine: Machine::new(program, &config),
        })
    }

    /// Executes a single transition.
    /// Returns the step outcome as a JSON object.
    ///
    /// # Errors
    ///
    /// Returns the serialization error when the outcome cannot be converted.
    pub fn step(&mut self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(&self.machine.step())?)
    }

    /// Runs up to `iterations` transitions.
    /// Returns the run outcome as a JSON object.
    ///
    /// # Errors
    ///
    /// Returns the serialization error when the outcome cannot be converted.
    pub fn run(&mut self, iterations: usize) -> Result<JsValue, JsValue> {
        let outcome = self.machine.run(iterations, &mut NullSink);
        Ok(serde_wasm_bindgen::to_value(&outcome)?)
    }

    /// Returns the tape contents as a string, one character per cell.
    #[must_use]
    pub fn tape(&self) -> js_sys::JsString {
        let cells: String = self.machine.tape().cells().iter().collect();
        cells.into()
    }

    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn pointer(&self) -> usize {
        self.machine.pointer()
    }

    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.machine.current_name().map(str::to_string)
    }

    /// Returns the decoded result of the current tape as a JSON object.
    ///
    /// # Errors
    ///
    /// Returns the serialization error when the result cannot be converted.
    pub fn result(&self) -> Result<JsValue, JsValue> {
        let result = DecodedResult::from_tape(self.machine.tape().cells(), self.machine.highest());
        Ok(serde_wasm_bindgen::to_value(&result)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNTER: &str = "begin: none|P0,R,P0,R,P1,N|done\ndone: else|N|done\n";

    #[test]
    fn report_carries_decoded_views() {
        let report = build_report(COUNTER, 4, false);
        assert!(report.diagnostics.is_empty());
        assert_eq!(report.steps, 4);
        assert_eq!(report.final_configuration.as_deref(), Some("done"));
        assert_eq!(report.raw.as_deref(), Some("01"));
        assert_eq!(report.text.as_deref(), Some("@"));
        assert!(report.trace.is_none());
    }

    #[test]
    fn verbose_report_includes_trace() {
        let report = build_report(COUNTER, 1, true);
        let trace = report.trace.expect("verbose trace");
        assert!(trace.starts_with("> begin: none | P0,R,P0,R,P1,N | done\n"));
    }

    #[test]
    fn errors_serialize_with_location() {
        let report = build_report("begin: 0|R|nowhere\n", 4, false);
        assert!(report.raw.is_none());

        let json = serde_json::to_value(&report).expect("serializable");
        assert_eq!(json["diagnostics"][0]["severity"], "error");
        assert_eq!(json["diagnostics"][0]["location"], "line 1");
        assert_eq!(json["overflowed"], false);
        assert!(json["numeric"].is_null());
    }
}
